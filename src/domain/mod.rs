//! Trip composition and collaboration logic. Nothing in here touches the network.

pub mod catalog;
pub mod cost;
pub mod draft;
pub mod feedback;
pub mod selection;
pub mod session;
pub mod trip;
pub mod wizard;

pub use catalog::{
    AccommodationFilter, AccommodationOption, Catalog, FlightOption, PricedOption, TransferOption,
    TransportOption,
};
pub use cost::CostBreakdown;
pub use draft::{DraftField, DraftIssue, TransportType, TripDraft};
pub use feedback::{FeedbackBoard, FeedbackForm, FeedbackState, FormIssue, Rejection};
pub use selection::{
    AccommodationSelection, FlightSelection, Selections, TransportSelection, NONE_OPTION_ID,
};
pub use session::WizardSession;
pub use trip::{
    CurrentUser, Feedback, FeedbackAuthor, FinalizedTrip, FriendRequest, FriendRequestAction,
    SharedTrip, SharedTripId, TripId, TripPayload, UserId, UserSummary,
};
pub use wizard::{Choice, Step, Wizard};
