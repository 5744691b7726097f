//! Trip price derived from whichever legs are currently chosen.

use serde::{Deserialize, Serialize};

use super::selection::{AccommodationSelection, FlightSelection, TransportSelection};

/// Per-leg prices and their sum. Absent legs count as zero; no currency
/// conversion or rounding happens here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub transport: f64,
    pub accommodation: f64,
    pub flight: f64,
    pub total: f64,
}

impl CostBreakdown {
    pub fn of(
        transport: Option<&TransportSelection>,
        accommodation: Option<&AccommodationSelection>,
        flight: Option<&FlightSelection>,
    ) -> Self {
        let transport = transport.map(TransportSelection::price).unwrap_or(0.0);
        let accommodation = accommodation
            .map(AccommodationSelection::price)
            .unwrap_or(0.0);
        let flight = flight.map(FlightSelection::price).unwrap_or(0.0);

        Self {
            transport,
            accommodation,
            flight,
            total: transport + accommodation + flight,
        }
    }
}
