use trip_planner::app::{MyTrips, SharedInbox};
use trip_planner::config::ClientConfig;
use trip_planner::domain::WizardSession;
use trip_planner::infra::{catalog, ApiError, TripApiClient};
use trip_planner::util::persistence::FileDraftStore;
use trip_planner::util::version::{version_label, APP_NAME};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ClientConfig::from_env();
    println!("{APP_NAME} {}", version_label());
    println!("   API: {}", config.api_url);

    let catalog = catalog::load(config.catalog_dir.as_deref())?;
    println!(
        "   Catalog: {} transport, {} flights, {} transfers, {} stays",
        catalog.transport.len(),
        catalog.flights.len(),
        catalog.airport_transfers.len(),
        catalog.accommodation.len()
    );

    let store = match &config.session_dir {
        Some(dir) => FileDraftStore::open_in(dir)?,
        None => FileDraftStore::open_default()?,
    };
    let store_path = store.path().to_path_buf();
    match WizardSession::resume(store)? {
        Some(session) => {
            tracing::warn!(
                session_id = %session.id(),
                step = %session.step(),
                path = %store_path.display(),
                "unfinished trip draft found; starting a new trip will replace it"
            );
        }
        None => tracing::info!(path = %store_path.display(), "no unfinished trip draft"),
    }

    let api = TripApiClient::new(&config)?;
    if !api.is_authenticated() {
        eprintln!("Not signed in. Set TRIP_PLANNER_ACCESS_TOKEN to see your trips.");
        return Ok(());
    }

    let mut mine = MyTrips::new(api.clone());
    match mine.load().await {
        Ok(trips) => {
            println!("\nMy trips ({}):", trips.len());
            for overview in trips {
                let trip = &overview.trip;
                println!(
                    "  #{} {} ({} to {}, {}) ${:.2}, shared with {}, {} feedback",
                    trip.id,
                    trip.name,
                    trip.start_date,
                    trip.end_date,
                    trip.transport_type,
                    trip.total_cost,
                    overview.shared_with.len(),
                    overview.feedback.len()
                );
            }
        }
        Err(ApiError::AuthenticationMissing) => {
            eprintln!("Session expired. Sign in again and update TRIP_PLANNER_ACCESS_TOKEN.");
            return Ok(());
        }
        Err(err) => eprintln!("Could not load trips: {}", err.user_message()),
    }

    let mut inbox = SharedInbox::connect(api).await?;
    let shared = inbox.load().await?.to_vec();
    println!("\nShared with {} ({}):", inbox.me().username, shared.len());
    for item in &shared {
        let status = match item.shared_trip_id {
            Some(link_id) if inbox.state(link_id).is_submitted() => "feedback left",
            Some(_) => "awaiting your feedback",
            None => "feedback unavailable",
        };
        println!(
            "  #{} {} from {}: {}",
            item.trip.id, item.trip.name, item.shared_by.username, status
        );
    }

    Ok(())
}
