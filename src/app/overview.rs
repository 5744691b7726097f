//! The owner's view of their finalized trips.

use std::collections::HashMap;

use tokio::task::JoinSet;
use tracing::{info, warn};

use super::collaboration;
use crate::domain::{Feedback, FinalizedTrip, TripId, UserId, UserSummary};
use crate::infra::{ApiError, TripApiClient};

#[derive(Clone, Debug, PartialEq)]
pub struct TripOverview {
    pub trip: FinalizedTrip,
    pub shared_with: Vec<UserSummary>,
    pub feedback: Vec<Feedback>,
}

enum SideData {
    SharedWith(Result<Vec<UserSummary>, ApiError>),
    Feedback(Result<Vec<Feedback>, ApiError>),
}

pub struct MyTrips {
    api: TripApiClient,
    trips: Vec<TripOverview>,
}

impl MyTrips {
    pub fn new(api: TripApiClient) -> Self {
        Self {
            api,
            trips: Vec::new(),
        }
    }

    pub fn trips(&self) -> &[TripOverview] {
        &self.trips
    }

    pub fn get(&self, trip_id: TripId) -> Option<&TripOverview> {
        self.trips.iter().find(|overview| overview.trip.id == trip_id)
    }

    /// List the trips, then fetch each trip's shared-with and feedback lists
    /// concurrently. Side data that fails to load stays empty.
    pub async fn load(&mut self) -> Result<&[TripOverview], ApiError> {
        let trips = self.api.list_trips().await?;

        let mut tasks = JoinSet::new();
        for trip in &trips {
            let trip_id = trip.id;
            let api = self.api.clone();
            tasks.spawn(async move { (trip_id, SideData::SharedWith(api.shared_with(trip_id).await)) });
            let api = self.api.clone();
            tasks.spawn(async move { (trip_id, SideData::Feedback(api.trip_feedbacks(trip_id).await)) });
        }

        let mut overviews: Vec<TripOverview> = trips
            .into_iter()
            .map(|trip| TripOverview {
                trip,
                shared_with: Vec::new(),
                feedback: Vec::new(),
            })
            .collect();
        let index: HashMap<TripId, usize> = overviews
            .iter()
            .enumerate()
            .map(|(i, overview)| (overview.trip.id, i))
            .collect();

        while let Some(joined) = tasks.join_next().await {
            let (trip_id, data) = match joined {
                Ok(result) => result,
                Err(err) => {
                    warn!(error = %err, "trip side data task failed");
                    continue;
                }
            };
            let Some(overview) = index.get(&trip_id).and_then(|i| overviews.get_mut(*i)) else {
                continue;
            };
            match data {
                SideData::SharedWith(Ok(users)) => overview.shared_with = users,
                SideData::Feedback(Ok(list)) => overview.feedback = list,
                SideData::SharedWith(Err(err)) | SideData::Feedback(Err(err)) => {
                    warn!(trip_id, error = %err, "failed to load trip side data");
                }
            }
        }

        self.trips = overviews;
        Ok(&self.trips)
    }

    /// Share a trip and refresh who it is shared with.
    pub async fn share(&mut self, trip_id: TripId, friend_id: UserId) -> Result<(), ApiError> {
        collaboration::share(&self.api, trip_id, friend_id).await?;
        let users = self.api.shared_with(trip_id).await?;
        if let Some(overview) = self.trips.iter_mut().find(|o| o.trip.id == trip_id) {
            overview.shared_with = users;
        }
        Ok(())
    }

    /// Delete on the server, then drop the trip locally. A rejected delete
    /// leaves the list unchanged.
    pub async fn delete(&mut self, trip_id: TripId) -> Result<(), ApiError> {
        self.api.delete_trip(trip_id).await?;
        self.trips.retain(|overview| overview.trip.id != trip_id);
        info!(trip_id, "trip deleted");
        Ok(())
    }
}
