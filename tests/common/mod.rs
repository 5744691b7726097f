#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trip_planner::domain::{Step, TransportType, TripDraft, Wizard, WizardSession};
use trip_planner::infra::{catalog, TripApiClient};
use trip_planner::util::persistence::{DraftKey, DraftStore, MemoryDraftStore};

pub const ACCESS_TOKEN: &str = "secret-access";
pub const CSRF_TOKEN: &str = "csrf-123";

pub fn api(server: &MockServer) -> TripApiClient {
    TripApiClient::with_base_url(&server.uri())
        .unwrap()
        .with_access_token(ACCESS_TOKEN)
}

pub async fn mount_csrf(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/csrf-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("fastapi-csrf-token={CSRF_TOKEN}; Path=/"))
                .set_body_json(json!({ "csrf_token": CSRF_TOKEN })),
        )
        .mount(server)
        .await;
}

pub async fn mount_me(server: &MockServer, user_id: i64, username: &str) {
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": username,
            "role": "user",
            "user_id": user_id,
        })))
        .mount(server)
        .await;
}

pub fn trip_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "start_date": "2025-03-01",
        "end_date": "2025-03-03",
        "transport_type": "road",
        "transport_option": {"id": "t1", "name": "Bus", "price": 20.0},
        "accommodation": {"id": "h1", "name": "Hotel Esplanade", "price": 80.0},
        "flight": null,
        "total_cost": 100.0,
    })
}

pub fn feedback_json(id: i64, user_id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "rating": 4,
        "comment": "Great trip",
        "user": {"id": user_id, "username": username},
    })
}

pub fn road_draft() -> TripDraft {
    TripDraft {
        name: "Weekend in Zagreb".into(),
        start_date: "2025-03-01".into(),
        end_date: "2025-03-03".into(),
        current_location: String::new(),
        departure: "Split".into(),
        destination: "Zagreb".into(),
        transport_type: Some(TransportType::Road),
    }
}

/// Walk a road trip Split to Zagreb with bus t1 ($20) and hotel h1 ($80)
/// up to the summary.
pub fn session_at_summary() -> WizardSession<MemoryDraftStore> {
    let catalog = catalog::load_embedded().unwrap();
    let mut session = WizardSession::start(MemoryDraftStore::new()).unwrap();
    {
        let mut wizard = Wizard::activate(&mut session, &catalog).unwrap();
        wizard.submit_details(road_draft()).unwrap();
        assert_eq!(wizard.advance().unwrap(), Some(Step::RoadTransport));
        assert!(wizard.select("t1"));
        assert_eq!(wizard.advance().unwrap(), Some(Step::Accommodation));
        assert!(wizard.select("h1"));
        assert_eq!(wizard.advance().unwrap(), Some(Step::Summary));
    }
    session
}

pub fn snapshot<S: DraftStore>(store: &S) -> Vec<Option<Value>> {
    DraftKey::ALL.iter().map(|key| store.get(*key)).collect()
}
