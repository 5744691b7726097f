//! Flows that combine the wizard state with the API.

pub mod collaboration;
pub mod finalize;
pub mod overview;

pub use collaboration::{share, FeedbackError, SharedInbox};
pub use finalize::{build_payload, compact, FinalizeError, Finalizer};
pub use overview::{MyTrips, TripOverview};
