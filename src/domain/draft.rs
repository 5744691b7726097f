//! The in-progress trip details collected on the first wizard step.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use time::{format_description::well_known::Iso8601, Date};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Road,
    Air,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Road => "road",
            TransportType::Air => "air",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trip details as the first step stores them. Field names follow the
/// stored draft format so an older draft still loads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default, rename = "currLocation")]
    pub current_location: String,
    #[serde(default)]
    pub departure: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default, deserialize_with = "transport_type_or_empty")]
    pub transport_type: Option<TransportType>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftField {
    Name,
    StartDate,
    EndDate,
    CurrentLocation,
    Departure,
    Destination,
    TransportType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftIssue {
    Missing(DraftField),
    InvalidDate(DraftField),
    EndsBeforeStart,
}

impl TripDraft {
    /// Everything that keeps the details step from advancing.
    pub fn issues(&self) -> Vec<DraftIssue> {
        let mut issues = Vec::new();
        let required = [
            (DraftField::Name, &self.name),
            (DraftField::StartDate, &self.start_date),
            (DraftField::EndDate, &self.end_date),
            (DraftField::Departure, &self.departure),
            (DraftField::Destination, &self.destination),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                issues.push(DraftIssue::Missing(field));
            }
        }

        match self.transport_type {
            None => issues.push(DraftIssue::Missing(DraftField::TransportType)),
            Some(TransportType::Air) if self.current_location.trim().is_empty() => {
                issues.push(DraftIssue::Missing(DraftField::CurrentLocation));
            }
            Some(_) => {}
        }

        let start = parse_date(&self.start_date);
        let end = parse_date(&self.end_date);
        if !self.start_date.trim().is_empty() && start.is_none() {
            issues.push(DraftIssue::InvalidDate(DraftField::StartDate));
        }
        if !self.end_date.trim().is_empty() && end.is_none() {
            issues.push(DraftIssue::InvalidDate(DraftField::EndDate));
        }
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                issues.push(DraftIssue::EndsBeforeStart);
            }
        }

        issues
    }

    pub fn is_complete(&self) -> bool {
        self.issues().is_empty()
    }

    pub fn is_air(&self) -> bool {
        self.transport_type == Some(TransportType::Air)
    }
}

fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), &Iso8601::DATE).ok()
}

fn transport_type_or_empty<'de, D>(deserializer: D) -> Result<Option<TransportType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("road") => Ok(Some(TransportType::Road)),
        Some("air") => Ok(Some(TransportType::Air)),
        Some(other) => Err(serde::de::Error::unknown_variant(other, &["road", "air"])),
    }
}
