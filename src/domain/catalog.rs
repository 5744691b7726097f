//! Reference catalogs the wizard chooses from.
//!
//! The catalogs are read-only and supplied whole; every lookup here is a pure
//! filter over the loaded lists.

use serde::{Deserialize, Serialize};

/// Anything with an id and a price can fill a trip leg.
pub trait PricedOption {
    fn id(&self) -> &str;
    fn price(&self) -> f64;
}

/// Bus, train or rent-a-car leg between departure and destination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransportOption {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub departure: String,
    pub destination: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, rename = "bookingLink", skip_serializing_if = "Option::is_none")]
    pub booking_link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightOption {
    pub id: String,
    pub airline: String,
    pub departure: String,
    pub destination: String,
    pub price: f64,
    pub departure_time: String,
    pub arrival_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, rename = "bookingLink", skip_serializing_if = "Option::is_none")]
    pub booking_link: Option<String>,
}

/// Ride from where the traveler currently is to the departure airport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferOption {
    pub id: String,
    pub name: String,
    #[serde(rename = "currLocation")]
    pub current_location: String,
    pub departure: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user: String,
    pub comment: String,
    pub rating: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccommodationOption {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: f64,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
    #[serde(default, rename = "bookingLink", skip_serializing_if = "Option::is_none")]
    pub booking_link: Option<String>,
}

macro_rules! priced {
    ($($ty:ty),+) => {
        $(impl PricedOption for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn price(&self) -> f64 {
                self.price
            }
        })+
    };
}

priced!(TransportOption, FlightOption, TransferOption, AccommodationOption);

/// Client-side narrowing of the accommodation list. Does not change the route.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccommodationFilter {
    pub kind: Option<String>,
    /// `None` or a non-positive value means no limit.
    pub max_price: Option<f64>,
}

impl AccommodationFilter {
    pub fn matches(&self, option: &AccommodationOption) -> bool {
        let kind_ok = self
            .kind
            .as_deref()
            .filter(|kind| !kind.is_empty())
            .map(|kind| option.kind.eq_ignore_ascii_case(kind))
            .unwrap_or(true);
        let price_ok = self
            .max_price
            .filter(|max| *max > 0.0)
            .map(|max| option.price <= max)
            .unwrap_or(true);
        kind_ok && price_ok
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub transport: Vec<TransportOption>,
    #[serde(default)]
    pub flights: Vec<FlightOption>,
    #[serde(default)]
    pub airport_transfers: Vec<TransferOption>,
    #[serde(default)]
    pub accommodation: Vec<AccommodationOption>,
}

impl Catalog {
    pub fn road_transport(&self, departure: &str, destination: &str) -> Vec<&TransportOption> {
        self.transport
            .iter()
            .filter(|option| option.departure == departure && option.destination == destination)
            .collect()
    }

    pub fn flights(&self, departure: &str, destination: &str) -> Vec<&FlightOption> {
        self.flights
            .iter()
            .filter(|flight| flight.departure == departure && flight.destination == destination)
            .collect()
    }

    /// Transfers to the departure airport. The caller prepends the
    /// "no transfer" choice; this returns only real catalog rides.
    pub fn airport_transfers(
        &self,
        current_location: &str,
        departure: &str,
    ) -> Vec<&TransferOption> {
        self.airport_transfers
            .iter()
            .filter(|option| {
                option.current_location == current_location && option.departure == departure
            })
            .collect()
    }

    pub fn accommodation(
        &self,
        destination: &str,
        filter: &AccommodationFilter,
    ) -> Vec<&AccommodationOption> {
        self.accommodation
            .iter()
            .filter(|option| option.destination == destination)
            .filter(|option| filter.matches(option))
            .collect()
    }

    /// First flight flying the reverse route of `outbound`.
    pub fn return_flight(&self, outbound: &FlightOption) -> Option<&FlightOption> {
        self.flights.iter().find(|flight| {
            flight.departure == outbound.destination && flight.destination == outbound.departure
        })
    }

    pub fn find_transport(&self, id: &str) -> Option<&TransportOption> {
        self.transport.iter().find(|option| option.id == id)
    }

    pub fn find_flight(&self, id: &str) -> Option<&FlightOption> {
        self.flights.iter().find(|flight| flight.id == id)
    }

    pub fn find_transfer(&self, id: &str) -> Option<&TransferOption> {
        self.airport_transfers.iter().find(|option| option.id == id)
    }

    pub fn find_accommodation(&self, id: &str) -> Option<&AccommodationOption> {
        self.accommodation.iter().find(|option| option.id == id)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn road_transport_matches_departure_and_destination() {
        let catalog = sample();
        let ids: Vec<_> = catalog
            .road_transport("split", "zagreb")
            .into_iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn transfers_filter_on_current_location_and_departure() {
        let catalog = sample();
        let ids: Vec<_> = catalog
            .airport_transfers("dubrovnik", "split")
            .into_iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a2"]);
    }

    #[test]
    fn accommodation_filters_by_destination_then_type_and_price() {
        let catalog = sample();
        let all = catalog.accommodation("zagreb", &AccommodationFilter::default());
        assert_eq!(all.len(), 2);

        let hostels = catalog.accommodation(
            "zagreb",
            &AccommodationFilter {
                kind: Some("hostel".into()),
                max_price: None,
            },
        );
        assert_eq!(hostels.len(), 1);
        assert_eq!(hostels[0].id, "h2");

        let cheap = catalog.accommodation(
            "zagreb",
            &AccommodationFilter {
                kind: None,
                max_price: Some(50.0),
            },
        );
        assert_eq!(cheap.len(), 1);

        let unlimited = catalog.accommodation(
            "zagreb",
            &AccommodationFilter {
                kind: Some(String::new()),
                max_price: Some(0.0),
            },
        );
        assert_eq!(unlimited.len(), 2);
    }

    #[test]
    fn return_flight_is_reverse_route() {
        let mut catalog = sample();
        let outbound = catalog.flights[0].clone();
        assert!(catalog.return_flight(&outbound).is_none());

        catalog.flights.push(flight("f9", "paris", "split", 140.0));
        assert_eq!(catalog.return_flight(&outbound).map(|f| f.id.as_str()), Some("f9"));
    }

    #[test]
    fn catalog_json_uses_frontend_field_names() {
        let raw = r#"{
            "airport_transfers": [
                {"id": "x", "name": "Taxi", "currLocation": "split", "departure": "split", "price": 12}
            ],
            "accommodation": [
                {"id": "h", "name": "Hotel", "type": "hotel", "price": 70, "destination": "paris",
                 "bookingLink": "https://example.com"}
            ]
        }"#;
        let catalog: Catalog = serde_json::from_str(raw).unwrap();
        assert_eq!(catalog.airport_transfers[0].current_location, "split");
        assert_eq!(catalog.accommodation[0].kind, "hotel");
        assert!(catalog.transport.is_empty());
    }
}
