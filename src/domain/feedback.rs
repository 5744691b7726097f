//! Per-share feedback state.
//!
//! The server is the authority on "one feedback per author per shared trip".
//! The board below is a read-through cache of that answer: list loads may
//! raise a share to `Submitted` as a hint, and a conflict rejection always
//! forces `Submitted` no matter what the cache believed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::trip::{CurrentUser, Feedback, SharedTripId};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackState {
    #[default]
    NotSubmitted,
    Submitting,
    Submitted,
}

/// Why the server refused a feedback submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    AlreadyExists,
    Other(String),
}

impl FeedbackState {
    /// `None` while a submission is already in flight. A link marked
    /// `Submitted` may still submit: only the server can say it is a duplicate.
    pub fn begin(self) -> Option<FeedbackState> {
        match self {
            FeedbackState::NotSubmitted | FeedbackState::Submitted => {
                Some(FeedbackState::Submitting)
            }
            FeedbackState::Submitting => None,
        }
    }

    pub fn succeed(self) -> FeedbackState {
        FeedbackState::Submitted
    }

    /// `self` is the state the rejected submission started from.
    pub fn reject(self, rejection: &Rejection) -> FeedbackState {
        match rejection {
            Rejection::AlreadyExists => FeedbackState::Submitted,
            Rejection::Other(_) => match self {
                FeedbackState::Submitted => FeedbackState::Submitted,
                _ => FeedbackState::NotSubmitted,
            },
        }
    }

    pub fn is_submitted(self) -> bool {
        matches!(self, FeedbackState::Submitted)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormIssue {
    MissingRating,
    MissingComment,
    RatingOutOfRange(u8),
}

/// What the user typed into the feedback form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedbackForm {
    pub rating: Option<u8>,
    pub comment: String,
}

impl FeedbackForm {
    pub fn new(rating: u8, comment: impl Into<String>) -> Self {
        Self {
            rating: Some(rating),
            comment: comment.into(),
        }
    }

    pub fn check(&self) -> Result<(u8, &str), FormIssue> {
        let rating = self.rating.ok_or(FormIssue::MissingRating)?;
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(FormIssue::RatingOutOfRange(rating));
        }
        let comment = self.comment.trim();
        if comment.is_empty() {
            return Err(FormIssue::MissingComment);
        }
        Ok((rating, comment))
    }
}

#[derive(Debug, Default)]
pub struct FeedbackBoard {
    states: HashMap<SharedTripId, FeedbackState>,
    started_from: HashMap<SharedTripId, FeedbackState>,
    lists: HashMap<SharedTripId, Vec<Feedback>>,
}

impl FeedbackBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, shared_trip_id: SharedTripId) -> FeedbackState {
        self.states
            .get(&shared_trip_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn feedback(&self, shared_trip_id: SharedTripId) -> &[Feedback] {
        self.lists
            .get(&shared_trip_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Store a freshly fetched list and derive the "already left" hint.
    ///
    /// A `Submitting` left behind by a submission that never got its answer
    /// is settled here: the list shows whether it landed.
    pub fn load(&mut self, shared_trip_id: SharedTripId, list: Vec<Feedback>, me: &CurrentUser) {
        let mine = list.iter().any(|feedback| me.authored(feedback));
        self.lists.insert(shared_trip_id, list);
        let state = self.states.entry(shared_trip_id).or_default();
        if mine {
            *state = FeedbackState::Submitted;
        } else if *state == FeedbackState::Submitting {
            *state = FeedbackState::NotSubmitted;
        }
        self.started_from.remove(&shared_trip_id);
    }

    /// Move to `Submitting`. `false` while another submission is in flight.
    pub fn begin(&mut self, shared_trip_id: SharedTripId) -> bool {
        let current = self.state(shared_trip_id);
        match current.begin() {
            Some(next) => {
                self.started_from.insert(shared_trip_id, current);
                self.states.insert(shared_trip_id, next);
                true
            }
            None => false,
        }
    }

    pub fn succeeded(&mut self, shared_trip_id: SharedTripId) {
        self.started_from.remove(&shared_trip_id);
        let state = self.states.entry(shared_trip_id).or_default();
        *state = state.succeed();
    }

    pub fn rejected(&mut self, shared_trip_id: SharedTripId, rejection: &Rejection) {
        let from = self
            .started_from
            .remove(&shared_trip_id)
            .unwrap_or_else(|| self.state(shared_trip_id));
        self.states.insert(shared_trip_id, from.reject(rejection));
    }
}
