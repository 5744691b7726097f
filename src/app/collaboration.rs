//! Sharing trips and leaving feedback on trips shared with me.

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::domain::feedback::{FeedbackBoard, FeedbackForm, FeedbackState, FormIssue, Rejection};
use crate::domain::{CurrentUser, Feedback, SharedTrip, SharedTripId, TripId, UserId};
use crate::infra::{ApiError, ConflictReason, TripApiClient};

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback needs both a rating and a comment ({0:?})")]
    ValidationIncomplete(FormIssue),
    #[error("rating {0} is outside 1..=5")]
    RatingOutOfRange(u8),
    /// An earlier submission for this link never settled, e.g. its future
    /// was dropped mid-request. `SharedInbox::load` settles it.
    #[error("a submission for shared trip {0} is still in flight")]
    InProgress(SharedTripId),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<FormIssue> for FeedbackError {
    fn from(issue: FormIssue) -> Self {
        match issue {
            FormIssue::RatingOutOfRange(rating) => FeedbackError::RatingOutOfRange(rating),
            other => FeedbackError::ValidationIncomplete(other),
        }
    }
}

/// Share `trip_id` with `friend_id`. Sharing again with the same friend
/// issues another request; the backend decides what that means.
pub async fn share(
    api: &TripApiClient,
    trip_id: TripId,
    friend_id: UserId,
) -> Result<(), ApiError> {
    api.share_trip(trip_id, friend_id).await?;
    info!(trip_id, friend_id, "trip shared");
    Ok(())
}

/// Trips shared with the current user together with their feedback.
pub struct SharedInbox {
    api: TripApiClient,
    me: CurrentUser,
    trips: Vec<SharedTrip>,
    board: FeedbackBoard,
}

impl SharedInbox {
    pub fn new(api: TripApiClient, me: CurrentUser) -> Self {
        Self {
            api,
            me,
            trips: Vec::new(),
            board: FeedbackBoard::new(),
        }
    }

    /// Resolve the current identity first, then build the inbox.
    pub async fn connect(api: TripApiClient) -> Result<Self, ApiError> {
        let me = api.current_user().await?;
        Ok(Self::new(api, me))
    }

    pub fn me(&self) -> &CurrentUser {
        &self.me
    }

    pub fn trips(&self) -> &[SharedTrip] {
        &self.trips
    }

    pub fn state(&self, shared_trip_id: SharedTripId) -> FeedbackState {
        self.board.state(shared_trip_id)
    }

    pub fn feedback(&self, shared_trip_id: SharedTripId) -> &[Feedback] {
        self.board.feedback(shared_trip_id)
    }

    /// Fetch the shared trips, then every link's feedback concurrently. Each
    /// result is keyed by its link id, so completion order does not matter.
    /// A failed feedback fetch leaves that link without a hint.
    pub async fn load(&mut self) -> Result<&[SharedTrip], ApiError> {
        let trips = self.api.shared_trips().await?;

        let mut tasks = JoinSet::new();
        for shared in &trips {
            let Some(link_id) = shared.shared_trip_id else {
                warn!(trip_id = shared.trip.id, "shared trip has no link id, feedback disabled");
                continue;
            };
            let api = self.api.clone();
            tasks.spawn(async move { (link_id, api.shared_feedbacks(link_id).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((link_id, Ok(list))) => self.board.load(link_id, list, &self.me),
                Ok((link_id, Err(err))) => {
                    warn!(shared_trip_id = link_id, error = %err, "failed to load feedback");
                }
                Err(err) => warn!(error = %err, "feedback fetch task failed"),
            }
        }

        self.trips = trips;
        Ok(&self.trips)
    }

    /// Submit one feedback entry for a link.
    ///
    /// The form is checked before anything is sent. On success the list is
    /// fetched again instead of appending locally. A `Submitted` hint does not
    /// block the request; the server decides. A duplicate-feedback conflict is
    /// not an error: the link ends up `Submitted`.
    pub async fn submit_feedback(
        &mut self,
        shared_trip_id: SharedTripId,
        form: &FeedbackForm,
    ) -> Result<FeedbackState, FeedbackError> {
        let (rating, comment) = form.check()?;
        if !self.board.begin(shared_trip_id) {
            return Err(FeedbackError::InProgress(shared_trip_id));
        }

        match self.api.submit_feedback(shared_trip_id, rating, comment).await {
            Ok(()) => {
                self.board.succeeded(shared_trip_id);
                info!(shared_trip_id, rating, "feedback submitted");
                self.refresh(shared_trip_id).await;
                Ok(self.board.state(shared_trip_id))
            }
            Err(ApiError::Conflict(ConflictReason::AlreadyExists)) => {
                self.board.rejected(shared_trip_id, &Rejection::AlreadyExists);
                info!(shared_trip_id, "feedback already on record");
                self.refresh(shared_trip_id).await;
                Ok(self.board.state(shared_trip_id))
            }
            Err(err) => {
                self.board
                    .rejected(shared_trip_id, &Rejection::Other(err.user_message()));
                Err(err.into())
            }
        }
    }

    async fn refresh(&mut self, shared_trip_id: SharedTripId) {
        match self.api.shared_feedbacks(shared_trip_id).await {
            Ok(list) => self.board.load(shared_trip_id, list, &self.me),
            Err(err) => {
                warn!(shared_trip_id, error = %err, "failed to refresh feedback");
            }
        }
    }
}
