mod common;

use chrono::{Duration, Utc};
use serde_json::json;
use signs_proto::fetch::FetchError;
use signs_proto::store::{FetchOutcome, ScheduleStore};

use common::fixtures::schedule_json;
use common::mock_server::{client_for, current_routes, legacy_routes, serve, MockState};

#[tokio::test]
async fn falls_back_to_legacy_paths_on_404() {
    let state = MockState::new(
        schedule_json("h1", &["Opening"]),
        json!(["acme.png", "globex.svg"]),
    );
    let base = serve(legacy_routes(state.clone())).await;
    let client = client_for(&base);

    let data = client.fetch_schedule().await.unwrap();
    assert_eq!(data.content_hash, "h1");
    assert_eq!(data.presentations[0].name, "Opening");

    let sponsors = client.fetch_sponsors().await.unwrap();
    assert_eq!(sponsors, vec!["acme.png", "globex.svg"]);
}

#[tokio::test]
async fn unchanged_hash_is_not_adopted_twice() {
    let state = MockState::new(schedule_json("same", &["A", "B"]), json!([]));
    let base = serve(current_routes(state.clone())).await;
    let client = client_for(&base);
    let mut store = ScheduleStore::default();
    let t0 = Utc::now();

    assert!(store.begin_fetch());
    let first = store.apply(client.fetch_schedule().await, t0);
    assert_eq!(first, FetchOutcome::Adopted { sessions: 2 });
    let snapshot = store.snapshot().cloned();

    // same hash, different body: still ignored
    state.set_schedule(schedule_json("same", &["A", "B", "C"]));
    assert!(store.begin_fetch());
    let second = store.apply(client.fetch_schedule().await, t0 + Duration::minutes(1));
    assert_eq!(second, FetchOutcome::Unchanged);
    assert_eq!(store.snapshot().cloned(), snapshot);
    assert_eq!(store.last_refresh(), Some(t0 + Duration::minutes(1)));
    assert_eq!(state.hits(), 2);

    state.set_schedule(schedule_json("next", &["A", "B", "C"]));
    store.begin_fetch();
    let third = store.apply(client.fetch_schedule().await, t0 + Duration::minutes(2));
    assert_eq!(third, FetchOutcome::Adopted { sessions: 3 });
}

#[tokio::test]
async fn first_load_failure_is_reported_later_failures_are_not() {
    let state = MockState::new(schedule_json("h1", &["A"]), json!([]));
    state.set_failing(true);
    let base = serve(current_routes(state.clone())).await;
    let client = client_for(&base);
    let mut store = ScheduleStore::default();
    let t0 = Utc::now();

    store.begin_fetch();
    let result = client.fetch_schedule().await;
    assert!(matches!(result, Err(FetchError::Status { .. })));
    assert!(matches!(store.apply(result, t0), FetchOutcome::Failed { .. }));
    assert!(store.error().is_some());

    state.set_failing(false);
    store.begin_fetch();
    store.apply(client.fetch_schedule().await, t0);
    assert!(store.error().is_none());

    state.set_failing(true);
    store.begin_fetch();
    let outcome = store.apply(client.fetch_schedule().await, t0 + Duration::minutes(1));
    assert!(matches!(outcome, FetchOutcome::KeptStale { .. }));
    assert!(store.error().is_none());
    assert_eq!(store.presentations().len(), 1);
    assert!(store.is_stale(t0 + Duration::minutes(6)));
}

#[tokio::test]
async fn sponsor_payload_must_be_an_array_of_strings() {
    let state = MockState::new(json!({}), json!(["a.png", 42, null, "b.png", {"x": 1}]));
    let base = serve(current_routes(state.clone())).await;
    let client = client_for(&base);
    assert_eq!(client.fetch_sponsors().await.unwrap(), vec!["a.png", "b.png"]);

    let state = MockState::new(json!({}), json!({"sponsors": ["a.png"]}));
    let base = serve(current_routes(state)).await;
    let client = client_for(&base);
    assert!(matches!(
        client.fetch_sponsors().await,
        Err(FetchError::NotAnArray { .. })
    ));
}

#[tokio::test]
async fn malformed_schedule_is_a_decode_error() {
    let state = MockState::new(json!({"Presentations": [{"Name": 7}]}), json!([]));
    let base = serve(current_routes(state)).await;
    let client = client_for(&base);
    assert!(matches!(
        client.fetch_schedule().await,
        Err(FetchError::Decode { .. })
    ));
}

#[tokio::test]
async fn image_probe_reports_availability() {
    let state = MockState::new(json!({}), json!([]));
    let base = serve(current_routes(state)).await;
    let client = client_for(&base);
    assert!(client.probe_image("present.png").await);
    assert!(!client.probe_image("missing.png").await);
}

#[tokio::test]
async fn unreachable_server_is_an_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client_for(&format!("http://{addr}"));
    assert!(matches!(
        client.fetch_schedule().await,
        Err(FetchError::Http { .. })
    ));
}
