//! The three independent trip legs and what fills them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::catalog::{AccommodationOption, FlightOption, PricedOption, TransferOption, TransportOption};
use super::cost::CostBreakdown;

/// Id the stored draft and the backend use for "nothing booked" entries.
pub const NONE_OPTION_ID: &str = "default";

const NO_TRANSFER_LABEL: &str = "Already have a ride to airport";
const OWN_ACCOMMODATION_LABEL: &str = "Already have accommodation";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportSelection {
    /// Traveler declined a ride to the airport.
    NoTransfer,
    Road(TransportOption),
    AirportTransfer(TransferOption),
}

impl TransportSelection {
    pub fn id(&self) -> &str {
        match self {
            Self::NoTransfer => NONE_OPTION_ID,
            Self::Road(option) => option.id(),
            Self::AirportTransfer(option) => option.id(),
        }
    }

    pub fn price(&self) -> f64 {
        match self {
            Self::NoTransfer => 0.0,
            Self::Road(option) => option.price(),
            Self::AirportTransfer(option) => option.price(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::NoTransfer => NO_TRANSFER_LABEL,
            Self::Road(option) => &option.name,
            Self::AirportTransfer(option) => &option.name,
        }
    }

    /// Body sent as `transport_option`. The no-transfer entry carries no
    /// route or time fields.
    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::NoTransfer => Ok(json!({
                "id": NONE_OPTION_ID,
                "name": NO_TRANSFER_LABEL,
                "price": 0.0,
            })),
            Self::Road(option) => serde_json::to_value(option),
            Self::AirportTransfer(option) => serde_json::to_value(option),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccommodationSelection {
    OwnAccommodation,
    Booked(AccommodationOption),
}

impl AccommodationSelection {
    pub fn id(&self) -> &str {
        match self {
            Self::OwnAccommodation => NONE_OPTION_ID,
            Self::Booked(option) => option.id(),
        }
    }

    pub fn price(&self) -> f64 {
        match self {
            Self::OwnAccommodation => 0.0,
            Self::Booked(option) => option.price(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::OwnAccommodation => OWN_ACCOMMODATION_LABEL,
            Self::Booked(option) => &option.name,
        }
    }

    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::OwnAccommodation => Ok(json!({
                "id": NONE_OPTION_ID,
                "name": OWN_ACCOMMODATION_LABEL,
                "type": "other",
                "price": 0.0,
                "description": "You already have your own accommodation for this trip.",
            })),
            Self::Booked(option) => serde_json::to_value(option),
        }
    }
}

/// Outbound flight plus the reverse-route flight when the catalog has one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightSelection {
    pub departure: FlightOption,
    #[serde(rename = "return")]
    pub return_flight: Option<FlightOption>,
}

impl FlightSelection {
    pub fn id(&self) -> &str {
        self.departure.id()
    }

    pub fn price(&self) -> f64 {
        self.departure.price() + self.return_flight.as_ref().map(|f| f.price()).unwrap_or(0.0)
    }

    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        let return_flight = match &self.return_flight {
            Some(flight) => serde_json::to_value(flight)?,
            None => Value::Null,
        };
        Ok(json!({
            "departure": serde_json::to_value(&self.departure)?,
            "return": return_flight,
        }))
    }
}

/// Current choice for each leg. Every write refreshes the cost breakdown.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selections {
    transport: Option<TransportSelection>,
    accommodation: Option<AccommodationSelection>,
    flight: Option<FlightSelection>,
    cost: CostBreakdown,
}

impl Selections {
    pub fn new(
        transport: Option<TransportSelection>,
        accommodation: Option<AccommodationSelection>,
        flight: Option<FlightSelection>,
    ) -> Self {
        let mut selections = Self {
            transport,
            accommodation,
            flight,
            cost: CostBreakdown::default(),
        };
        selections.recompute();
        selections
    }

    pub fn transport(&self) -> Option<&TransportSelection> {
        self.transport.as_ref()
    }

    pub fn accommodation(&self) -> Option<&AccommodationSelection> {
        self.accommodation.as_ref()
    }

    pub fn flight(&self) -> Option<&FlightSelection> {
        self.flight.as_ref()
    }

    pub fn cost(&self) -> &CostBreakdown {
        &self.cost
    }

    pub fn set_transport(&mut self, selection: Option<TransportSelection>) {
        self.transport = selection;
        self.recompute();
    }

    pub fn set_accommodation(&mut self, selection: Option<AccommodationSelection>) {
        self.accommodation = selection;
        self.recompute();
    }

    pub fn set_flight(&mut self, selection: Option<FlightSelection>) {
        self.flight = selection;
        self.recompute();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn recompute(&mut self) {
        self.cost = CostBreakdown::of(
            self.transport.as_ref(),
            self.accommodation.as_ref(),
            self.flight.as_ref(),
        );
    }
}
