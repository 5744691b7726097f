//! Asynchronous client for the trip planner REST API.
//!
//! - Every call carries the bearer token; none is sent without one.
//! - Every mutating call fetches a fresh anti-forgery token first and sends it
//!   back in `X-CSRF-Token`. The token's cookie rides in the client's cookie store.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{ClientConfig, DEFAULT_API_URL};
use crate::domain::{
    CurrentUser, Feedback, FinalizedTrip, FriendRequest, FriendRequestAction, SharedTrip,
    SharedTripId, TripId, TripPayload, UserId, UserSummary,
};
use crate::util::version::user_agent;

pub const CSRF_HEADER: &str = "X-CSRF-Token";
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Detail string the backend answers with when feedback already exists.
pub const FEEDBACK_CONFLICT_DETAIL: &str = "Feedback already left.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictReason {
    AlreadyExists,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not signed in")]
    AuthenticationMissing,
    #[error("anti-forgery token unavailable: {0}")]
    TokenUnavailable(String),
    #[error("server rejected request ({status}): {detail}")]
    ServerRejection { status: u16, detail: Value },
    #[error("conflict: {0:?}")]
    Conflict(ConflictReason),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text to show the user. Server rejections are passed through as sent.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ServerRejection { detail, .. } => match detail.get("detail") {
                Some(Value::String(text)) => text.clone(),
                _ => detail.to_string(),
            },
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsrfTokenDto {
    csrf_token: String,
}

#[derive(Debug, Deserialize)]
struct FriendsEnvelope {
    #[serde(default)]
    friends: Vec<UserSummary>,
}

#[derive(Debug, Deserialize)]
struct FriendRequestsEnvelope {
    #[serde(default)]
    friend_requests: Vec<FriendRequest>,
}

#[derive(Clone)]
pub struct TripApiClient {
    http: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl TripApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Self::with_base_url(&config.api_url)?;
        Ok(match &config.access_token {
            Some(token) => client.with_access_token(token.clone()),
            None => client,
        })
    }

    pub fn with_base_url(base: &str) -> Result<Self, ApiError> {
        let base = if base.trim().is_empty() {
            DEFAULT_API_URL
        } else {
            base
        };
        // Url::join drops the last segment unless the base ends in '/'.
        let base_url = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{base}/"))?
        };
        let http = Client::builder()
            .user_agent(user_agent())
            .cookie_store(true)
            .build()?;
        Ok(Self {
            http,
            base_url,
            access_token: None,
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Fresh anti-forgery token. Never cached: it is tied to the cookie the
    /// same response sets.
    pub async fn csrf_token(&self) -> Result<String, ApiError> {
        let url = self.url("api/csrf-token")?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| ApiError::TokenUnavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ApiError::TokenUnavailable(format!(
                "status {}",
                response.status()
            )));
        }
        let dto: CsrfTokenDto = response
            .json()
            .await
            .map_err(|err| ApiError::TokenUnavailable(err.to_string()))?;
        if dto.csrf_token.is_empty() {
            return Err(ApiError::TokenUnavailable("empty token".into()));
        }
        Ok(dto.csrf_token)
    }

    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.get_json("api/auth/me").await
    }

    pub async fn list_trips(&self) -> Result<Vec<FinalizedTrip>, ApiError> {
        self.get_json("api/trips/").await
    }

    /// Not idempotent unless `idempotency_key` is given and the backend
    /// deduplicates on it.
    pub async fn create_trip(
        &self,
        payload: &TripPayload,
        idempotency_key: Option<Uuid>,
    ) -> Result<FinalizedTrip, ApiError> {
        let mut request = self.mutating(Method::POST, "api/trips/").await?.json(payload);
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key.to_string());
        }
        self.send(request).await
    }

    pub async fn delete_trip(&self, trip_id: TripId) -> Result<(), ApiError> {
        let request = self
            .mutating(Method::DELETE, &format!("api/trips/{trip_id}"))
            .await?;
        self.send_discarding(request).await
    }

    pub async fn shared_with(&self, trip_id: TripId) -> Result<Vec<UserSummary>, ApiError> {
        self.get_json(&format!("api/trips/shared-with/{trip_id}"))
            .await
    }

    /// No duplicate check: sharing twice with the same friend sends twice.
    pub async fn share_trip(&self, trip_id: TripId, friend_id: UserId) -> Result<(), ApiError> {
        let request = self
            .mutating(Method::POST, "api/trips/share/")
            .await?
            .json(&json!({ "trip_id": trip_id, "friend_id": friend_id }));
        self.send_discarding(request).await
    }

    pub async fn shared_trips(&self) -> Result<Vec<SharedTrip>, ApiError> {
        self.get_json("api/trips/shared/").await
    }

    pub async fn trip_feedbacks(&self, trip_id: TripId) -> Result<Vec<Feedback>, ApiError> {
        self.get_json(&format!("api/trips/{trip_id}/feedbacks"))
            .await
    }

    pub async fn shared_feedbacks(
        &self,
        shared_trip_id: SharedTripId,
    ) -> Result<Vec<Feedback>, ApiError> {
        self.get_json(&format!("api/trips/shared-feedbacks/{shared_trip_id}"))
            .await
    }

    pub async fn submit_feedback(
        &self,
        shared_trip_id: SharedTripId,
        rating: u8,
        comment: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .mutating(Method::POST, "api/trips/feedback/")
            .await?
            .json(&json!({
                "shared_trip_id": shared_trip_id,
                "rating": rating,
                "comment": comment,
            }));
        self.send_discarding(request).await
    }

    pub async fn friends(&self, user_id: UserId) -> Result<Vec<UserSummary>, ApiError> {
        let envelope: FriendsEnvelope = self.get_json(&format!("api/friends/{user_id}")).await?;
        Ok(envelope.friends)
    }

    pub async fn friend_requests(&self, user_id: UserId) -> Result<Vec<FriendRequest>, ApiError> {
        let envelope: FriendRequestsEnvelope = self
            .get_json(&format!("api/friends/friend-requests/{user_id}"))
            .await?;
        Ok(envelope.friend_requests)
    }

    pub async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> Result<(), ApiError> {
        let request = self
            .mutating(Method::POST, "api/friends/add-friend")
            .await?
            .json(&json!({ "user_id": user_id, "friend_id": friend_id }));
        self.send_discarding(request).await
    }

    pub async fn respond_friend_request(
        &self,
        request_id: i64,
        action: FriendRequestAction,
    ) -> Result<(), ApiError> {
        let request = self
            .mutating(Method::POST, "api/friends/respond-friend-request")
            .await?
            .json(&json!({ "request_id": request_id, "action": action }));
        self.send_discarding(request).await
    }

    pub async fn remove_friend(&self, friend_id: UserId) -> Result<(), ApiError> {
        let request = self
            .mutating(Method::DELETE, &format!("api/friends/remove-friend/{friend_id}"))
            .await?;
        self.send_discarding(request).await
    }

    fn bearer(&self) -> Result<&str, ApiError> {
        self.access_token
            .as_deref()
            .ok_or(ApiError::AuthenticationMissing)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let token = self.bearer()?;
        let url = self.url(path)?;
        self.send(self.http.get(url).bearer_auth(token)).await
    }

    /// Authenticated request with a freshly fetched anti-forgery token. The
    /// token fetch completes before the request is built.
    async fn mutating(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.bearer()?.to_string();
        let url = self.url(path)?;
        let csrf = self.csrf_token().await?;
        debug!(%method, path, "sending mutating request");
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(CSRF_HEADER, csrf))
    }

    async fn send<T>(&self, builder: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = check_status(builder.send().await?).await?;
        response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn send_discarding(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        check_status(builder.send().await?).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
    warn!(status = status.as_u16(), path = %url, "request rejected");

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::AuthenticationMissing);
    }
    let is_duplicate_feedback = detail
        .get("detail")
        .and_then(Value::as_str)
        .map(|text| text == FEEDBACK_CONFLICT_DETAIL)
        .unwrap_or(false);
    if status == StatusCode::CONFLICT || is_duplicate_feedback {
        return Err(ApiError::Conflict(ConflictReason::AlreadyExists));
    }

    Err(ApiError::ServerRejection {
        status: status.as_u16(),
        detail,
    })
}
