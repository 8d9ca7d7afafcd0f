//! Integration tests for the paginating client against a mock intra API

use intraboard_core::logtime::day_log_from_locations;
use intraboard_core::models::LocationRecord;
use intraboard_core::{ApiClient, ApiConfig, FetchError, MalformedSession, RateLimitConfig, RateLimiter};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let config = ApiConfig::new(server.uri())
        .with_token("test-token")
        .with_rate_limit(RateLimitConfig::new(100, Duration::from_secs(1)));
    ApiClient::with_own_limiter(config).expect("client build")
}

fn items(range: std::ops::Range<u64>) -> Value {
    Value::Array(range.map(|id| json!({ "id": id, "user_id": id })).collect())
}

fn page(total: usize, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("X-Total", total.to_string().as_str())
        .insert_header("X-Per-Page", "100")
        .set_body_json(body)
}

async fn mount_page(server: &MockServer, endpoint: &str, number: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("page[size]", "100"))
        .and(query_param("page[number]", number))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_all_250_items_three_requests() {
    let server = MockServer::start().await;
    let endpoint = "/v2/coalitions/vela/coalitions_users";

    mount_page(&server, endpoint, "1", page(250, items(0..100))).await;
    mount_page(&server, endpoint, "2", page(250, items(100..200))).await;
    mount_page(&server, endpoint, "3", page(250, items(200..250))).await;

    let client = client_for(&server);
    let result = client.fetch_all::<Value>(endpoint, &[]).await.unwrap();

    assert_eq!(result.len(), 250);
    assert_eq!(result.total, 250);
    assert_eq!(result.requests, 3);

    let ids: Vec<u64> = result
        .items
        .iter()
        .map(|item| item["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, (0..250).collect::<Vec<_>>());

    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    server.verify().await;
}

#[tokio::test]
async fn test_single_page_makes_one_request() {
    let server = MockServer::start().await;
    let endpoint = "/v2/cursus/42cursus/projects";

    mount_page(
        &server,
        endpoint,
        "1",
        page(2, json!([{ "slug": "libft" }, { "slug": "ft_printf" }])),
    )
    .await;

    let client = client_for(&server);
    let projects = client.cursus_projects("42cursus").await.unwrap();

    assert_eq!(projects.len(), 2);
    assert_eq!(projects[1].slug, "ft_printf");
    server.verify().await;
}

#[tokio::test]
async fn test_exact_multiple_of_page_size() {
    let server = MockServer::start().await;
    let endpoint = "/v2/x";

    mount_page(&server, endpoint, "1", page(200, items(0..100))).await;
    mount_page(&server, endpoint, "2", page(200, items(100..200))).await;

    let client = client_for(&server);
    let result = client.fetch_all::<Value>(endpoint, &[]).await.unwrap();

    assert_eq!(result.len(), 200);
    assert_eq!(result.requests, 2);
    server.verify().await;
}

#[tokio::test]
async fn test_filters_and_bearer_token_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/projects/42cursus-libft/projects_users"))
        .and(query_param("filter[campus]", "14"))
        .and(query_param("filter[marked]", "true"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(page(
            1,
            json!([{
                "final_mark": 100,
                "user": { "id": 1, "login": "jdoe" },
                "project": { "slug": "42cursus-libft" }
            }]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let users = client.project_users("42cursus-libft", 14).await.unwrap();

    assert_eq!(users.len(), 1);
    assert!(users[0].passed());
    server.verify().await;
}

#[tokio::test]
async fn test_non_success_status_fails_fast() {
    let server = MockServer::start().await;
    let endpoint = "/v2/users/ghost/locations";

    mount_page(&server, endpoint, "1", page(300, items(0..100))).await;
    mount_page(&server, endpoint, "2", ResponseTemplate::new(500)).await;

    let client = client_for(&server);
    let err = client.fetch_all::<Value>(endpoint, &[]).await.unwrap_err();

    match err {
        FetchError::Status {
            endpoint: failed,
            status,
        } => {
            assert_eq!(failed, endpoint);
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // No third page after the failure
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unauthorized_on_first_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.coalition_users("vela").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.endpoint(), Some("/v2/coalitions/vela/coalitions_users"));
}

#[tokio::test]
async fn test_empty_page_before_declared_end_is_incomplete() {
    let server = MockServer::start().await;
    let endpoint = "/v2/x";

    mount_page(&server, endpoint, "1", page(300, items(0..100))).await;
    mount_page(&server, endpoint, "2", page(300, json!([]))).await;

    let client = client_for(&server);
    let err = client.fetch_all::<Value>(endpoint, &[]).await.unwrap_err();

    assert!(matches!(
        err,
        FetchError::Incomplete {
            expected: 300,
            received: 100,
            ..
        }
    ));
    // Page 3 never requested
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_pagination_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_all::<Value>("/v2/x", &[]).await.unwrap_err();

    assert!(matches!(err, FetchError::MissingHeader { .. }));
}

#[tokio::test]
async fn test_undecodable_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Total", "1")
                .insert_header("X-Per-Page", "100")
                .set_body_string("<html>maintenance</html>"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_all::<Value>("/v2/x", &[]).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode { page: 1, .. }));
}

#[tokio::test]
async fn test_locations_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/users/jdoe/locations"))
        .and(query_param("sort", "-begin_at"))
        .respond_with(page(
            3,
            json!([
                { "id": 3, "begin_at": "2024-01-02T09:00:00.000Z", "end_at": "2024-01-02T10:00:00.000Z" },
                { "id": 2, "begin_at": "2024-01-01T23:00:00.000Z", "end_at": "2024-01-02T01:00:00.000Z" },
                { "id": 1, "begin_at": null, "end_at": null }
            ]),
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let records = client.user_locations("jdoe").await.unwrap();
    let (log, report) = day_log_from_locations(&records, chrono::Utc::now());

    assert_eq!(report.accepted, 2);
    assert_eq!(report.dropped_count(), 1);
    assert_eq!(log.total(), chrono::Duration::hours(3));

    let week = log.week_total().unwrap();
    assert_eq!(week.total, chrono::Duration::hours(3));
}

#[tokio::test]
async fn test_mistyped_location_dropped_rest_of_page_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/users/jdoe/locations"))
        .respond_with(page(
            2,
            json!([
                { "id": 1, "begin_at": "2024-01-02T09:00:00.000Z", "end_at": "2024-01-02T10:00:00.000Z" },
                { "id": 2, "begin_at": 12345 }
            ]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let records = client.user_locations("jdoe").await.unwrap();

    assert_eq!(records.len(), 2);
    assert!(matches!(records[0], LocationRecord::Parsed(_)));

    let (log, report) = day_log_from_locations(&records, chrono::Utc::now());
    assert_eq!(report.accepted, 1);
    assert_eq!(report.dropped_count(), 1);
    assert!(matches!(
        report.dropped[0],
        MalformedSession::InvalidRecord { id: Some(2), .. }
    ));
    assert_eq!(log.total(), chrono::Duration::hours(1));
}

#[tokio::test]
async fn test_concurrent_queries_share_limiter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(page(1, items(0..1)))
        .mount(&server)
        .await;

    let limiter = Arc::new(RateLimiter::new(2, Duration::from_millis(200)));
    let config = ApiConfig::new(server.uri());
    let client = Arc::new(ApiClient::new(config, Arc::clone(&limiter)).unwrap());

    let start = std::time::Instant::now();
    let mut tasks = tokio::task::JoinSet::new();
    for n in 0..5 {
        let client = Arc::clone(&client);
        tasks.spawn(async move {
            client
                .fetch_all::<Value>(&format!("/v2/coalitions/{n}/coalitions_users"), &[])
                .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        assert_eq!(result.unwrap().unwrap().len(), 1);
    }

    // 5 calls at 2 per 200ms need at least two full windows
    assert!(start.elapsed() >= Duration::from_millis(400));
    assert_eq!(server.received_requests().await.unwrap().len(), 5);
}
