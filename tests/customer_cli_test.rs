use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::process::Command;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn league_billing(server: &MockServer) -> Command {
    let mut cmd = Command::new(cargo_bin!("league-billing"));
    cmd.env_remove("RUST_LOG")
        .env_remove("SQUARE_ENVIRONMENT")
        .env("SQUARE_ACCESS_TOKEN", "test-token")
        .env("SQUARE_BASE_URL", server.uri())
        .args(["--users", "tests/fixtures/users.csv"]);
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ensure_customer_uses_cached_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    league_billing(&server)
        .args(["ensure-customer", "alice", "--email", "alice@example.com"])
        .assert()
        .success()
        .stdout("SQ_ALICE\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ensure_customer_creates_when_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/customers"))
        .and(body_partial_json(json!({
            "email_address": "bob@example.com",
            "family_name": "Ross",
            "reference_id": "bob"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customer": { "id": "SQ_BOB" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    league_billing(&server)
        .args(["ensure-customer", "bob", "--email", "bob@example.com"])
        .args(["--family-name", "Ross"])
        .assert()
        .success()
        .stdout("SQ_BOB\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ensure_customer_without_id_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    league_billing(&server)
        .args(["ensure-customer", "bob", "--email", "bob@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("customer creation failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_customer_prints_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/customers/SQ_ALICE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customer": { "id": "SQ_ALICE", "email_address": "alice@example.com" }
        })))
        .mount(&server)
        .await;

    league_billing(&server)
        .args(["get-customer", "SQ_ALICE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"SQ_ALICE\""))
        .stdout(predicate::str::contains("\"email_address\": \"alice@example.com\""));
}
