use finconsole_core::Environment;
use finconsole_core::environment::BaseUrls;
use finconsole_core::execution::{ExecutionPort, ExecutionRequest, ExecutionStatus, HttpExecutor};
use finconsole_core::form::HttpMethod;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(method: HttpMethod, endpoint: &str, environment: Environment) -> ExecutionRequest {
    ExecutionRequest {
        endpoint: endpoint.to_string(),
        method,
        payload: json!({"referenceId": "R-77", "actionCode": "SIGN"}),
        environment,
    }
}

#[tokio::test]
async fn test_post_success_records_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/data/sign"))
        .and(body_json(json!({"referenceId": "R-77", "actionCode": "SIGN"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 200, "signed": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let executor = HttpExecutor::new(BaseUrls::uniform(format!("{}/v1", server.uri()))).unwrap();
    let record = executor
        .execute(request(HttpMethod::Post, "/data/sign", Environment::Dev))
        .await;

    assert_eq!(record.status, ExecutionStatus::Success);
    assert_eq!(record.summary, "Transaction Completed");
    assert_eq!(record.response_payload, json!({"code": 200, "signed": true}));
    assert_eq!(record.request_payload["referenceId"], json!("R-77"));
}

#[tokio::test]
async fn test_get_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/query"))
        .and(query_param("referenceId", "R-77"))
        .and(query_param("actionCode", "SIGN"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .expect(1)
        .mount(&server)
        .await;

    let executor = HttpExecutor::new(BaseUrls::uniform(server.uri())).unwrap();
    let record = executor
        .execute(request(HttpMethod::Get, "/data/query", Environment::Test))
        .await;

    assert_eq!(record.status, ExecutionStatus::Success);
    assert_eq!(record.response_payload, json!({"raw": "plain text"}));
    assert_eq!(record.environment, Environment::Test);
}

#[tokio::test]
async fn test_environment_selects_base_url() {
    let prod = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/transaction/repay"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&prod)
        .await;

    let mut urls = BaseUrls::uniform("http://127.0.0.1:9");
    urls.set(Environment::Prod, prod.uri());
    let executor = HttpExecutor::new(urls).unwrap();

    let record = executor
        .execute(request(HttpMethod::Put, "/transaction/repay", Environment::Prod))
        .await;
    assert!(record.is_success());
}

#[tokio::test]
async fn test_server_error_becomes_error_record() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/process/approve"))
        .respond_with(ResponseTemplate::new(504).set_body_json(json!({"detail": "upstream"})))
        .mount(&server)
        .await;

    let executor = HttpExecutor::new(BaseUrls::uniform(server.uri())).unwrap();
    let record = executor
        .execute(request(HttpMethod::Delete, "/process/approve", Environment::Dev))
        .await;

    assert_eq!(record.status, ExecutionStatus::Error);
    assert_eq!(record.summary, "Transaction Failed");
    assert_eq!(record.response_payload["code"], json!(504));
    assert_eq!(record.response_payload["body"], json!({"detail": "upstream"}));
}

#[tokio::test]
async fn test_transport_failure_becomes_error_record() {
    let executor = HttpExecutor::new(BaseUrls::uniform("http://127.0.0.1:9")).unwrap();
    let record = executor
        .execute(request(HttpMethod::Post, "/data/sign", Environment::Dev))
        .await;

    assert_eq!(record.status, ExecutionStatus::Error);
    assert_eq!(record.response_payload["code"], json!(500));
    assert!(
        record.response_payload["message"]
            .as_str()
            .unwrap()
            .starts_with("Request Failed")
    );
}
