//! Server-owned records: finalized trips, shares, feedback and people.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::draft::TransportType;

pub type TripId = i64;
pub type SharedTripId = i64;
pub type UserId = i64;

/// Body of the create-trip call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripPayload {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub transport_type: TransportType,
    pub transport_option: Value,
    pub accommodation: Option<Value>,
    pub flight: Option<Value>,
    pub total_cost: f64,
}

/// A persisted trip. Selection bodies are kept as the server returned them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalizedTrip {
    pub id: TripId,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub transport_type: TransportType,
    #[serde(default)]
    pub transport_option: Value,
    #[serde(default)]
    pub accommodation: Option<Value>,
    #[serde(default)]
    pub flight: Option<Value>,
    pub total_cost: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A trip someone else shared with the current user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SharedTrip {
    pub trip: FinalizedTrip,
    pub shared_by: UserSummary,
    #[serde(default)]
    pub shared_trip_id: Option<SharedTripId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackAuthor {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub rating: u8,
    pub comment: String,
    pub user: FeedbackAuthor,
}

/// Who the bearer token belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "id")]
    pub user_id: Option<UserId>,
}

impl CurrentUser {
    /// Matches by id when the backend reported one, otherwise by username.
    pub fn authored(&self, feedback: &Feedback) -> bool {
        match self.user_id {
            Some(id) => feedback.user.id == id,
            None => feedback.user.username == self.username,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: i64,
    pub user_id: UserId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestAction {
    Accept,
    Reject,
}
