//! Step machine of the trip wizard.
//!
//! `Details → RoadTransport | Flights → [AirportTransfer] → Accommodation →
//! Summary → Done`. Advancing is silently withheld while the current step is
//! incomplete; nothing here raises a validation error.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{AccommodationFilter, Catalog, PricedOption};
use super::draft::{TransportType, TripDraft};
use super::selection::{
    AccommodationSelection, FlightSelection, TransportSelection, NONE_OPTION_ID,
};
use super::session::WizardSession;
use crate::util::persistence::{DraftKey, DraftStore, DraftStoreError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Details,
    RoadTransport,
    Flights,
    AirportTransfer,
    Accommodation,
    Summary,
    Done,
}

impl Step {
    /// Step that follows `self` for the given transport type.
    pub fn next(self, transport: TransportType) -> Option<Step> {
        use Step::*;
        match (self, transport) {
            (Details, TransportType::Road) => Some(RoadTransport),
            (Details, TransportType::Air) => Some(Flights),
            (Flights, _) => Some(AirportTransfer),
            (RoadTransport, _) | (AirportTransfer, _) => Some(Accommodation),
            (Accommodation, _) => Some(Summary),
            (Summary, _) => Some(Done),
            (Done, _) => None,
        }
    }

    /// Catalog steps need exactly one chosen option before advancing.
    pub fn requires_selection(self) -> bool {
        matches!(
            self,
            Step::RoadTransport | Step::Flights | Step::AirportTransfer | Step::Accommodation
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Step::Done)
    }

    fn catalog_key(self) -> Option<DraftKey> {
        match self {
            Step::RoadTransport => Some(DraftKey::TransportData),
            Step::Flights => Some(DraftKey::FlightsData),
            Step::AirportTransfer => Some(DraftKey::TransportFlightData),
            Step::Accommodation => Some(DraftKey::AccommodationData),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Details => "details",
            Step::RoadTransport => "road_transport",
            Step::Flights => "flights",
            Step::AirportTransfer => "airport_transfer",
            Step::Accommodation => "accommodation",
            Step::Summary => "summary",
            Step::Done => "done",
        };
        f.write_str(s)
    }
}

/// One selectable card on a catalog step.
#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
    pub id: String,
    pub label: String,
    pub price: f64,
    pub selected: bool,
}

/// Drives one page activation of the wizard over a session.
pub struct Wizard<'a, S: DraftStore> {
    session: &'a mut WizardSession<S>,
    catalog: &'a Catalog,
    pending: Option<String>,
    accommodation_filter: AccommodationFilter,
}

impl<'a, S: DraftStore> Wizard<'a, S> {
    /// Activate the page for the session's current step.
    pub fn activate(
        session: &'a mut WizardSession<S>,
        catalog: &'a Catalog,
    ) -> Result<Self, DraftStoreError> {
        let mut wizard = Self {
            session,
            catalog,
            pending: None,
            accommodation_filter: AccommodationFilter::default(),
        };
        wizard.cache_current_catalog()?;
        Ok(wizard)
    }

    pub fn step(&self) -> Step {
        self.session.step()
    }

    pub fn session(&self) -> &WizardSession<S> {
        &*self.session
    }

    pub fn selected(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Options offered on the current step, already filtered by the draft.
    pub fn choices(&self) -> Vec<Choice> {
        let Some(draft) = self.session.draft() else {
            return Vec::new();
        };
        let choices: Vec<(String, String, f64)> = match self.step() {
            Step::RoadTransport => self
                .catalog
                .road_transport(&draft.departure, &draft.destination)
                .into_iter()
                .map(|o| (o.id.clone(), o.name.clone(), o.price()))
                .collect(),
            Step::Flights => self
                .catalog
                .flights(&draft.departure, &draft.destination)
                .into_iter()
                .map(|f| (f.id.clone(), f.airline.clone(), f.price()))
                .collect(),
            Step::AirportTransfer => {
                let none = TransportSelection::NoTransfer;
                std::iter::once((none.id().to_string(), none.label().to_string(), 0.0))
                    .chain(
                        self.catalog
                            .airport_transfers(&draft.current_location, &draft.departure)
                            .into_iter()
                            .map(|o| (o.id.clone(), o.name.clone(), o.price())),
                    )
                    .collect()
            }
            Step::Accommodation => {
                let own = AccommodationSelection::OwnAccommodation;
                self.catalog
                    .accommodation(&draft.destination, &self.accommodation_filter)
                    .into_iter()
                    .map(|o| (o.id.clone(), o.name.clone(), o.price()))
                    .chain(std::iter::once((own.id().to_string(), own.label().to_string(), 0.0)))
                    .collect()
            }
            Step::Details | Step::Summary | Step::Done => Vec::new(),
        };

        choices
            .into_iter()
            .map(|(id, label, price)| Choice {
                selected: self.pending.as_deref() == Some(id.as_str()),
                id,
                label,
                price,
            })
            .collect()
    }

    /// Mark an offered option as chosen. Nothing is written until advance.
    pub fn select(&mut self, id: &str) -> bool {
        if self.choices().iter().any(|choice| choice.id == id) {
            self.pending = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn set_accommodation_filter(&mut self, filter: AccommodationFilter) {
        self.accommodation_filter = filter;
        if let Some(id) = self.pending.clone() {
            if !self.choices().iter().any(|choice| choice.id == id) {
                self.pending = None;
            }
        }
    }

    /// Record the details form. Only meaningful on the details step.
    pub fn submit_details(&mut self, draft: TripDraft) -> Result<(), DraftStoreError> {
        if self.step() != Step::Details {
            return Ok(());
        }
        self.session.set_draft(draft)
    }

    pub fn can_advance(&self) -> bool {
        let step = self.step();
        if step == Step::Details {
            return self
                .session
                .draft()
                .map(TripDraft::is_complete)
                .unwrap_or(false);
        }
        step.requires_selection() && self.pending.is_some()
    }

    /// Store the current step's choice and move on. `Ok(None)` means the
    /// gate held and nothing changed.
    pub fn advance(&mut self) -> Result<Option<Step>, DraftStoreError> {
        if !self.can_advance() {
            return Ok(None);
        }
        let Some(transport_type) = self.session.draft().and_then(|d| d.transport_type) else {
            return Ok(None);
        };
        let step = self.step();
        let pending = self.pending.clone().unwrap_or_default();

        let written = match step {
            Step::Details => true,
            Step::RoadTransport => self.write_road(&pending)?,
            Step::Flights => self.write_flight(&pending)?,
            Step::AirportTransfer => self.write_transfer(&pending)?,
            Step::Accommodation => self.write_accommodation(&pending)?,
            Step::Summary | Step::Done => false,
        };
        if !written {
            return Ok(None);
        }

        let Some(next) = step.next(transport_type) else {
            return Ok(None);
        };
        self.session.set_step(next)?;
        self.pending = None;
        self.accommodation_filter = AccommodationFilter::default();
        self.cache_current_catalog()?;
        if next == Step::Summary {
            self.session.reload();
        }
        debug!(step = %next, total = self.session.cost().total, "wizard advanced");
        Ok(Some(next))
    }

    fn cache_current_catalog(&mut self) -> Result<(), DraftStoreError> {
        let catalog = self.catalog;
        match self.step().catalog_key() {
            Some(key @ DraftKey::TransportData) => self.session.cache_catalog(key, &catalog.transport),
            Some(key @ DraftKey::FlightsData) => self.session.cache_catalog(key, &catalog.flights),
            Some(key @ DraftKey::TransportFlightData) => {
                self.session.cache_catalog(key, &catalog.airport_transfers)
            }
            Some(key @ DraftKey::AccommodationData) => {
                self.session.cache_catalog(key, &catalog.accommodation)
            }
            _ => Ok(()),
        }
    }

    fn write_road(&mut self, id: &str) -> Result<bool, DraftStoreError> {
        let Some(option) = self.catalog.find_transport(id).cloned() else {
            return Ok(false);
        };
        self.session.choose_transport(TransportSelection::Road(option))?;
        Ok(true)
    }

    fn write_flight(&mut self, id: &str) -> Result<bool, DraftStoreError> {
        let Some(departure) = self.catalog.find_flight(id).cloned() else {
            return Ok(false);
        };
        let return_flight = self.catalog.return_flight(&departure).cloned();
        self.session.choose_flight(FlightSelection {
            departure,
            return_flight,
        })?;
        Ok(true)
    }

    fn write_transfer(&mut self, id: &str) -> Result<bool, DraftStoreError> {
        let selection = if id == NONE_OPTION_ID {
            TransportSelection::NoTransfer
        } else {
            match self.catalog.find_transfer(id).cloned() {
                Some(option) => TransportSelection::AirportTransfer(option),
                None => return Ok(false),
            }
        };
        self.session.choose_transport(selection)?;
        Ok(true)
    }

    fn write_accommodation(&mut self, id: &str) -> Result<bool, DraftStoreError> {
        let selection = if id == NONE_OPTION_ID {
            AccommodationSelection::OwnAccommodation
        } else {
            match self.catalog.find_accommodation(id).cloned() {
                Some(option) => AccommodationSelection::Booked(option),
                None => return Ok(false),
            }
        };
        self.session.choose_accommodation(selection)?;
        Ok(true)
    }
}
