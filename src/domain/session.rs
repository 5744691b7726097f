//! Typed wizard session backed by the draft store.
//!
//! The session is the only thing that reads or writes wizard keys. Each
//! mutation is written through immediately, so a session rebuilt with
//! [`WizardSession::resume`] sees exactly what the previous step left.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::catalog::{AccommodationOption, FlightOption};
use super::cost::CostBreakdown;
use super::draft::TripDraft;
use super::selection::{
    AccommodationSelection, FlightSelection, Selections, TransportSelection, NONE_OPTION_ID,
};
use super::wizard::Step;
use crate::util::persistence::{DraftKey, DraftStore, DraftStoreError};

#[derive(Debug)]
pub struct WizardSession<S: DraftStore> {
    store: S,
    id: Uuid,
    step: Step,
    draft: Option<TripDraft>,
    selections: Selections,
}

impl<S: DraftStore> WizardSession<S> {
    /// Begin a new pass. Any unfinished draft in the store is replaced
    /// without asking; it is only logged.
    pub fn start(mut store: S) -> Result<Self, DraftStoreError> {
        if store.contains(DraftKey::TripDetails) {
            warn!("replacing an unfinished trip draft left in the draft store");
        }
        store.remove(&DraftKey::ALL)?;

        let id = Uuid::new_v4();
        store.put_json(DraftKey::SessionId, &id)?;
        store.put_json(DraftKey::WizardStep, &Step::Details)?;
        info!(session_id = %id, "started trip wizard");

        Ok(Self {
            store,
            id,
            step: Step::Details,
            draft: None,
            selections: Selections::default(),
        })
    }

    /// Pick up the pass recorded in the store, if there is one.
    pub fn resume(store: S) -> Result<Option<Self>, DraftStoreError> {
        let Some(id) = store.get_json::<Uuid>(DraftKey::SessionId) else {
            return Ok(None);
        };
        let mut session = Self {
            store,
            id,
            step: Step::Details,
            draft: None,
            selections: Selections::default(),
        };
        session.reload();
        debug!(session_id = %id, step = %session.step, "resumed trip wizard");
        Ok(Some(session))
    }

    /// Re-read every wizard key from the store and recompute the cost.
    pub fn reload(&mut self) {
        self.step = self
            .store
            .get_json(DraftKey::WizardStep)
            .unwrap_or(Step::Details);
        self.draft = self.store.get_json(DraftKey::TripDetails);

        let transport = self.store.get_json::<TransportSelection>(DraftKey::TransportOption);
        let accommodation = self
            .store
            .get_json::<String>(DraftKey::SelectedAccommodation)
            .and_then(|id| self.resolve_accommodation(&id));
        let flight = if self.draft.as_ref().map(TripDraft::is_air).unwrap_or(false) {
            self.store
                .get_json::<String>(DraftKey::SelectedFlight)
                .and_then(|id| self.resolve_flight(&id))
        } else {
            None
        };

        self.selections = Selections::new(transport, accommodation, flight);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> Option<&TripDraft> {
        self.draft.as_ref()
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn cost(&self) -> &CostBreakdown {
        self.selections.cost()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn set_draft(&mut self, draft: TripDraft) -> Result<(), DraftStoreError> {
        self.store.put_json(DraftKey::TripDetails, &draft)?;
        self.draft = Some(draft);
        Ok(())
    }

    pub fn set_step(&mut self, step: Step) -> Result<(), DraftStoreError> {
        self.store.put_json(DraftKey::WizardStep, &step)?;
        debug!(session_id = %self.id, from = %self.step, to = %step, "wizard step changed");
        self.step = step;
        Ok(())
    }

    /// Keep a copy of the catalog a step showed so later steps can turn a
    /// stored id back into the full option.
    pub fn cache_catalog<T: Serialize>(
        &mut self,
        key: DraftKey,
        options: &[T],
    ) -> Result<(), DraftStoreError> {
        self.store.put_json(key, &options)
    }

    pub fn choose_transport(&mut self, selection: TransportSelection) -> Result<(), DraftStoreError> {
        self.store.put_json(DraftKey::TransportOption, &selection)?;
        self.selections.set_transport(Some(selection));
        Ok(())
    }

    pub fn choose_accommodation(
        &mut self,
        selection: AccommodationSelection,
    ) -> Result<(), DraftStoreError> {
        self.store
            .put_json(DraftKey::SelectedAccommodation, &selection.id())?;
        self.selections.set_accommodation(Some(selection));
        Ok(())
    }

    pub fn choose_flight(&mut self, selection: FlightSelection) -> Result<(), DraftStoreError> {
        self.store.put_json(DraftKey::SelectedFlight, &selection.id())?;
        self.selections.set_flight(Some(selection));
        Ok(())
    }

    /// Successful finalize: drop every wizard key and park on `Done`.
    pub fn commit(&mut self) -> Result<(), DraftStoreError> {
        self.store.remove(&DraftKey::ALL)?;
        self.step = Step::Done;
        self.draft = None;
        self.selections.clear();
        info!(session_id = %self.id, "trip wizard committed");
        Ok(())
    }

    /// Explicit discard. Dropping a session without calling this leaves the
    /// draft in the store for the next pass to find.
    pub fn abandon(mut self) -> Result<S, DraftStoreError> {
        self.store.remove(&DraftKey::ALL)?;
        info!(session_id = %self.id, "trip wizard abandoned");
        Ok(self.store)
    }

    fn resolve_accommodation(&self, id: &str) -> Option<AccommodationSelection> {
        if id == NONE_OPTION_ID {
            return Some(AccommodationSelection::OwnAccommodation);
        }
        let snapshot: Vec<AccommodationOption> =
            self.store.get_json(DraftKey::AccommodationData)?;
        snapshot
            .into_iter()
            .find(|option| option.id == id)
            .map(AccommodationSelection::Booked)
    }

    fn resolve_flight(&self, id: &str) -> Option<FlightSelection> {
        let snapshot: Vec<FlightOption> = self.store.get_json(DraftKey::FlightsData)?;
        let departure = snapshot.iter().find(|flight| flight.id == id)?.clone();
        let return_flight = snapshot
            .iter()
            .find(|flight| {
                flight.departure == departure.destination
                    && flight.destination == departure.departure
            })
            .cloned();
        Some(FlightSelection {
            departure,
            return_flight,
        })
    }
}
