// 🌐 HTTP transport - ApiFetcher against a local mock of the reporting API

use campaign_finance::{ApiFetcher, FetchConfig};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AGGREGATE_PATH: &str = "/Reporting/GetNEWTableData/";
const DETAIL_PATH: &str = "/Reporting/GetNEWDetailedTableData/";

fn config(server: &MockServer) -> FetchConfig {
    FetchConfig {
        base_url: server.uri(),
        max_retries: 2,
        backoff_ms: 1,
        max_backoff_ms: 2,
        request_timeout_secs: 5,
        ..FetchConfig::default()
    }
}

#[tokio::test]
async fn test_aggregate_pages_until_short_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AGGREGATE_PATH))
        .and(query_param("Page", "1"))
        .and(query_param("TablePage", "1"))
        .and(body_string_contains("start=0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"EntityID": 1, "EntityLastName": "SMITH"}, {"EntityID": 2, "EntityLastName": "JONES"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(AGGREGATE_PATH))
        .and(query_param("TablePage", "2"))
        .and(body_string_contains("start=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"EntityID": 3, "EntityLastName": "LEE"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.page_length = 2;
    let fetcher = ApiFetcher::http(config).unwrap();
    let batch = fetcher.fetch_aggregate(1, 2020, 2022).await.unwrap();

    assert_eq!(batch.len(), 3);
    assert!(batch.failures.is_empty());
    assert_eq!(batch.entity_ids(), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_empty_data_is_an_empty_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AGGREGATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ApiFetcher::http(config(&server)).unwrap();
    let batch = fetcher.fetch_aggregate(2, 2021, 2021).await.unwrap();

    assert!(batch.is_empty());
    assert!(batch.failures.is_empty());
}

#[tokio::test]
async fn test_server_errors_are_retried_then_recorded() {
    let server = MockServer::start().await;

    // initial attempt + 2 retries
    Mock::given(method("POST"))
        .and(path(AGGREGATE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.max_page_failures = 1;
    let fetcher = ApiFetcher::http(config).unwrap();
    let batch = fetcher.fetch_aggregate(1, 2020, 2020).await.unwrap();

    assert!(batch.is_empty());
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].attempts, 3);
    assert_eq!(batch.failures[0].entity_id, None);
}

#[tokio::test]
async fn test_detail_rows_are_stamped_and_failures_isolated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DETAIL_PATH))
        .and(query_param("entityId", "7"))
        .and(query_param("Name", "1~7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"TransactionId": 100, "Amount": 25.0},
                {"TransactionId": 101, "Amount": 50.0}
            ],
            "recordsTotal": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(DETAIL_PATH))
        .and(query_param("entityId", "8"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ApiFetcher::http(config(&server)).unwrap();
    let ids = vec!["7".to_string(), "8".to_string()];
    let batch = fetcher.fetch_detail(20, &ids, 2020, 2022).await.unwrap();

    assert_eq!(batch.len(), 2);
    for row in &batch.rows {
        assert_eq!(row["retrieved_id"], json!("7"));
    }
    assert_eq!(batch.failed_entities(), vec!["8"]);
    assert_eq!(batch.failures[0].attempts, 1);
}
