//! End-to-end chain against a local mock quiz service

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quiz_core::{ChainRequest, ChainStatus, HopResult, TaskCategory};
use quiz_net::FetchConfig;
use quiz_runtime::{solve_quiz_chain, ChainConfig};

async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

async fn mount_reply(server: &MockServer, quiz_url: &str, status: u16, reply: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(body_partial_json(json!({ "url": quiz_url })))
        .respond_with(ResponseTemplate::new(status).set_body_json(reply))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_three_hop_chain() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let q1 = format!("{uri}/quiz-1");
    let q2 = format!("{uri}/quiz-2");
    let q3 = format!("{uri}/demo-scrape?email=me@example.com");

    // "<p>Sum these: 3, 4, and 5</p>" rendered by script
    mount_page(
        &server,
        "/quiz-1",
        r##"<html><body><div id="result"></div>
            <script>document.querySelector("#result").innerHTML = atob("PHA+U3VtIHRoZXNlOiAzLCA0LCBhbmQgNTwvcD4=");</script>
        </body></html>"##,
    )
    .await;
    mount_page(
        &server,
        "/quiz-2",
        r#"<html><body><p>Cutoff: 10</p><p>Download <a href="/files/values.csv">the data</a>.</p></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/values.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("value\n5\n12\n20\n"))
        .mount(&server)
        .await;

    // Scrape <a href="/demo-scrape-data?email=$EMAIL">this page</a> to get the secret code.
    mount_page(
        &server,
        "/demo-scrape",
        r##"<html><body><div id="q"></div><script>
            const el = document.querySelector("#q");
            el.innerHTML = atob(`U2NyYXBlIDxhIGhyZWY9Ii9kZW1vLXNjcmFwZS1kYXRhP2VtYWlsPSRFTUFJTCI+dGhpcyBwYWdlPC9hPiB0byBnZXQgdGhlIHNlY3JldCBjb2RlLg==`);
        </script></body></html>"##,
    )
    .await;
    mount_page(
        &server,
        "/demo-scrape-data",
        "<html><body>Secret code is 60431 and not 12345.</body></html>",
    )
    .await;

    mount_reply(&server, &q1, 200, json!({"correct": true, "url": q2})).await;
    mount_reply(&server, &q2, 200, json!({"correct": true, "url": q3, "delay": 0.05})).await;
    mount_reply(&server, &q3, 400, json!({"correct": false, "reason": "done"})).await;

    let outcome = solve_quiz_chain(
        ChainRequest::new("me@example.com", "s3cret", &q1),
        &FetchConfig::default(),
        ChainConfig::default().with_budget(Duration::from_secs(60)),
    )
    .await;

    assert_eq!(outcome.status, ChainStatus::Completed);
    assert_eq!(outcome.total_hops, 3);

    let summary: Vec<(TaskCategory, &str)> = outcome
        .hops
        .iter()
        .map(|hop| match hop {
            HopResult::Solved {
                category, answer, ..
            } => (*category, answer.as_str()),
            HopResult::Failed { error, .. } => panic!("unexpected failed hop: {error}"),
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (TaskCategory::ArithmeticAggregation, "12"),
            (TaskCategory::TabularAggregation, "32"),
            (TaskCategory::EncodedRedirect, "60431"),
        ]
    );
    assert_eq!(outcome.hops[2].server_response().unwrap()["reason"], "done");
}

#[tokio::test]
async fn test_unreachable_start_is_recorded() {
    let outcome = solve_quiz_chain(
        ChainRequest::new("me@example.com", "s3cret", "http://127.0.0.1:9/quiz"),
        &FetchConfig::default().with_timeout(2),
        ChainConfig::default(),
    )
    .await;

    assert_eq!(outcome.status, ChainStatus::Completed);
    assert_eq!(outcome.total_hops, 1);
    assert!(outcome.hops[0].error().is_some());
}
