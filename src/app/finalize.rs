//! Turning a finished wizard session into a persisted trip.

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::domain::{
    FinalizedTrip, FlightSelection, Selections, Step, TripDraft, TripPayload, WizardSession,
};
use crate::infra::{ApiError, TripApiClient};
use crate::util::persistence::{DraftStore, DraftStoreError};

pub const DEFAULT_TRIP_NAME: &str = "My Trip";

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("wizard is on {0}, not on the summary")]
    NotAtSummary(Step),
    #[error("trip details are incomplete")]
    IncompleteDraft,
    #[error("failed to encode selection: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] DraftStoreError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Drop null members from every object, at any depth. Arrays pass through
/// untouched, including any nulls or objects inside them.
pub fn compact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, compact(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// Submission body for the draft and current selections.
pub fn build_payload(
    draft: &TripDraft,
    selections: &Selections,
) -> Result<TripPayload, FinalizeError> {
    let transport_type = draft.transport_type.ok_or(FinalizeError::IncompleteDraft)?;

    let name = match draft.name.trim() {
        "" => DEFAULT_TRIP_NAME.to_string(),
        name => name.to_string(),
    };
    let transport_option = match selections.transport() {
        Some(selection) => compact(selection.to_payload()?),
        None => json!({}),
    };
    let accommodation = selections
        .accommodation()
        .map(|selection| selection.to_payload().map(compact))
        .transpose()?;
    // Not compacted: `return` stays null when there is no return flight.
    let flight = selections
        .flight()
        .map(FlightSelection::to_payload)
        .transpose()?;

    Ok(TripPayload {
        name,
        start_date: draft.start_date.clone(),
        end_date: draft.end_date.clone(),
        transport_type,
        transport_option,
        accommodation,
        flight,
        total_cost: selections.cost().total,
    })
}

pub struct Finalizer<'a> {
    api: &'a TripApiClient,
    idempotent: bool,
}

impl<'a> Finalizer<'a> {
    pub fn new(api: &'a TripApiClient) -> Self {
        Self {
            api,
            idempotent: false,
        }
    }

    /// Idempotency follows `TRIP_PLANNER_IDEMPOTENT_FINALIZE` via the config.
    pub fn from_config(api: &'a TripApiClient, config: &ClientConfig) -> Self {
        Self::new(api).idempotent(config.idempotent_finalize)
    }

    /// Send the session id as `Idempotency-Key` so a backend that honours it
    /// can collapse repeated submissions.
    pub fn idempotent(mut self, enabled: bool) -> Self {
        self.idempotent = enabled;
        self
    }

    /// Submit the session's trip. The draft is cleared only after the server
    /// accepts it; any failure leaves every key as it was so the user can retry.
    ///
    /// Calling this twice for the same draft creates two trips unless
    /// idempotency is enabled and the backend deduplicates.
    pub async fn finalize<S: DraftStore>(
        &self,
        session: &mut WizardSession<S>,
    ) -> Result<FinalizedTrip, FinalizeError> {
        if session.step() != Step::Summary {
            return Err(FinalizeError::NotAtSummary(session.step()));
        }
        let draft = session.draft().ok_or(FinalizeError::IncompleteDraft)?;
        if !draft.is_complete() {
            return Err(FinalizeError::IncompleteDraft);
        }
        let payload = build_payload(draft, session.selections())?;
        let key = self.idempotent.then(|| session.id());

        let trip = match self.api.create_trip(&payload, key).await {
            Ok(trip) => trip,
            Err(err) => {
                warn!(session_id = %session.id(), error = %err, "finalize failed, draft kept");
                return Err(err.into());
            }
        };

        session.commit()?;
        info!(trip_id = trip.id, total = trip.total_cost, "trip finalized");
        Ok(trip)
    }
}
