mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use trip_planner::app::{share, FeedbackError, MyTrips, SharedInbox};
use trip_planner::domain::{FeedbackForm, FeedbackState, FriendRequestAction};
use trip_planner::infra::ApiError;

fn shared_json(trip_id: i64, link_id: Option<i64>) -> serde_json::Value {
    let mut shared = json!({
        "trip": trip_json(trip_id, "Zagreb"),
        "shared_by": {"id": 2, "username": "ivo", "email": "ivo@example.com"},
    });
    if let Some(link_id) = link_id {
        shared["shared_trip_id"] = json!(link_id);
    }
    shared
}

async fn mount_shared(server: &MockServer, trips: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/trips/shared/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(trips))
        .mount(server)
        .await;
}

#[tokio::test]
async fn second_submission_is_sent_and_conflict_keeps_submitted() {
    let server = MockServer::start().await;
    mount_csrf(&server).await;
    mount_me(&server, 1, "ana").await;
    mount_shared(&server, json!([shared_json(4, Some(10))])).await;

    // Empty before the submission, the server's copy after it.
    Mock::given(method("GET"))
        .and(path("/api/trips/shared-feedbacks/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trips/shared-feedbacks/10"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([feedback_json(77, 1, "ana")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/trips/feedback/"))
        .and(header("x-csrf-token", CSRF_TOKEN))
        .and(body_json(json!({
            "shared_trip_id": 10,
            "rating": 4,
            "comment": "Great trip",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/trips/feedback/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Feedback already left."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut inbox = SharedInbox::connect(api(&server)).await.unwrap();
    assert_eq!(inbox.load().await.unwrap().len(), 1);
    assert_eq!(inbox.state(10), FeedbackState::NotSubmitted);

    let state = inbox
        .submit_feedback(10, &FeedbackForm::new(4, "Great trip"))
        .await
        .unwrap();
    assert_eq!(state, FeedbackState::Submitted);
    let list = inbox.feedback(10);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, 77);
    assert_eq!(list[0].user.username, "ana");

    // The Submitted hint does not short-circuit; the server answers.
    let again = inbox
        .submit_feedback(10, &FeedbackForm::new(5, "Even better"))
        .await
        .unwrap();
    assert_eq!(again, FeedbackState::Submitted);
    assert_eq!(inbox.feedback(10).len(), 1);

    let posts = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.method.as_str() == "POST" && request.url.path() == "/api/trips/feedback/")
        .count();
    assert_eq!(posts, 2);
}

#[tokio::test]
async fn cancelled_submission_blocks_until_reload() {
    let server = MockServer::start().await;
    mount_csrf(&server).await;
    mount_me(&server, 1, "ana").await;
    mount_shared(&server, json!([shared_json(4, Some(10))])).await;
    Mock::given(method("GET"))
        .and(path("/api/trips/shared-feedbacks/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/trips/feedback/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "ok"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut inbox = SharedInbox::connect(api(&server)).await.unwrap();
    inbox.load().await.unwrap();

    let form = FeedbackForm::new(4, "Great trip");
    let cancelled =
        tokio::time::timeout(Duration::from_millis(200), inbox.submit_feedback(10, &form)).await;
    assert!(cancelled.is_err());
    assert_eq!(inbox.state(10), FeedbackState::Submitting);

    let err = inbox.submit_feedback(10, &form).await.unwrap_err();
    assert!(matches!(err, FeedbackError::InProgress(10)));

    inbox.load().await.unwrap();
    assert_eq!(inbox.state(10), FeedbackState::NotSubmitted);
}

#[tokio::test]
async fn conflict_snaps_to_submitted_despite_stale_hint() {
    let server = MockServer::start().await;
    mount_csrf(&server).await;
    mount_me(&server, 1, "ana").await;
    mount_shared(&server, json!([shared_json(4, Some(10))])).await;
    Mock::given(method("GET"))
        .and(path("/api/trips/shared-feedbacks/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/trips/feedback/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Feedback already left."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut inbox = SharedInbox::connect(api(&server)).await.unwrap();
    inbox.load().await.unwrap();
    assert_eq!(inbox.state(10), FeedbackState::NotSubmitted);

    let state = inbox
        .submit_feedback(10, &FeedbackForm::new(4, "Great trip"))
        .await
        .unwrap();
    assert_eq!(state, FeedbackState::Submitted);
}

#[tokio::test]
async fn other_rejections_stay_retryable() {
    let server = MockServer::start().await;
    mount_csrf(&server).await;
    mount_me(&server, 1, "ana").await;
    mount_shared(&server, json!([shared_json(4, Some(10))])).await;
    Mock::given(method("GET"))
        .and(path("/api/trips/shared-feedbacks/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/trips/feedback/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db down"})))
        .mount(&server)
        .await;

    let mut inbox = SharedInbox::connect(api(&server)).await.unwrap();
    inbox.load().await.unwrap();

    let err = inbox
        .submit_feedback(10, &FeedbackForm::new(4, "Great trip"))
        .await
        .unwrap_err();
    match err {
        FeedbackError::Api(api_err @ ApiError::ServerRejection { status: 500, .. }) => {
            assert_eq!(api_err.user_message(), "db down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(inbox.state(10), FeedbackState::NotSubmitted);
}

#[tokio::test]
async fn load_keys_feedback_by_link_and_derives_hint() {
    let server = MockServer::start().await;
    mount_me(&server, 1, "ana").await;
    mount_shared(
        &server,
        json!([
            shared_json(4, Some(10)),
            shared_json(5, Some(11)),
            shared_json(6, None),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/trips/shared-feedbacks/10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([feedback_json(1, 3, "maja"), feedback_json(2, 1, "ana")]))
                .set_delay(std::time::Duration::from_millis(50)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trips/shared-feedbacks/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([feedback_json(3, 3, "maja")])))
        .mount(&server)
        .await;

    let mut inbox = SharedInbox::connect(api(&server)).await.unwrap();
    assert_eq!(inbox.load().await.unwrap().len(), 3);

    assert_eq!(inbox.feedback(10).len(), 2);
    assert_eq!(inbox.feedback(11).len(), 1);
    assert_eq!(inbox.feedback(11)[0].id, 3);
    assert!(inbox.state(10).is_submitted());
    assert!(!inbox.state(11).is_submitted());
}

#[tokio::test]
async fn sharing_twice_sends_two_requests() {
    let server = MockServer::start().await;
    mount_csrf(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/trips/share/"))
        .and(body_json(json!({"trip_id": 4, "friend_id": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "shared"})))
        .expect(2)
        .mount(&server)
        .await;

    let api = api(&server);
    share(&api, 4, 2).await.unwrap();
    share(&api, 4, 2).await.unwrap();
}

#[tokio::test]
async fn overview_loads_side_data_and_deletes() {
    let server = MockServer::start().await;
    mount_csrf(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/trips/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([trip_json(1, "Zagreb"), trip_json(2, "Paris")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trips/shared-with/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 2, "username": "ivo"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trips/shared-with/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trips/1/feedbacks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/trips/2/feedbacks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([feedback_json(9, 2, "ivo")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/trips/1"))
        .and(header("x-csrf-token", CSRF_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/trips/2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Trip not found"})))
        .mount(&server)
        .await;

    let mut trips = MyTrips::new(api(&server));
    assert_eq!(trips.load().await.unwrap().len(), 2);
    let zagreb = trips.get(1).unwrap();
    assert_eq!(zagreb.shared_with[0].username, "ivo");
    assert!(zagreb.feedback.is_empty());
    let paris = trips.get(2).unwrap();
    assert!(paris.shared_with.is_empty());
    assert_eq!(paris.feedback[0].id, 9);

    trips.delete(1).await.unwrap();
    assert!(trips.get(1).is_none());

    assert!(trips.delete(2).await.is_err());
    assert!(trips.get(2).is_some());
}

#[tokio::test]
async fn friends_round() {
    let server = MockServer::start().await;
    mount_csrf(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/friends/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "friends": [{"id": 2, "username": "ivo", "email": "ivo@example.com"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/friends/friend-requests/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "friend_requests": [{"id": 5, "user_id": 3}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/friends/respond-friend-request"))
        .and(body_json(json!({"request_id": 5, "action": "accept"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/friends/remove-friend/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let friends = api.friends(1).await.unwrap();
    assert_eq!(friends[0].username, "ivo");
    let requests = api.friend_requests(1).await.unwrap();
    assert_eq!(requests[0].user_id, 3);
    api.respond_friend_request(requests[0].id, FriendRequestAction::Accept)
        .await
        .unwrap();
    api.remove_friend(2).await.unwrap();
}

#[tokio::test]
async fn expired_session_maps_to_authentication_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trips/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})))
        .mount(&server)
        .await;

    let err = api(&server).list_trips().await.unwrap_err();
    assert!(matches!(err, ApiError::AuthenticationMissing));
}
