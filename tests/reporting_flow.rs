use std::path::PathBuf;
use std::sync::Arc;

use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;
use vansah_binding::metrics::Metrics;
use vansah_binding::{ClientConfig, RunSession, VansahClient};

const TEST_CASE: &str = "TF-C72";

fn write_screenshots(dir: &std::path::Path) -> (PathBuf, PathBuf) {
    let passed = dir.join("passed.png");
    let failed = dir.join("failed.png");
    std::fs::write(&passed, b"passed-bytes").expect("write passed.png");
    std::fs::write(&failed, b"failed-bytes").expect("write failed.png");
    (passed, failed)
}

#[test]
fn suite_reports_run_and_step_logs() {
    let server = MockServer::start();
    let run = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/run")
            .header("Authorization", "suite-token")
            .json_body(json!({
                "case": {"key": TEST_CASE},
                "asset": {"type": "issue", "key": "TF-4"},
                "properties": {
                    "sprint": {"name": "TF Sprint 1"},
                    "release": {"name": "TestingTRUNK"},
                    "environment": {"name": "UAT"}
                }
            }));
        then.status(200)
            .json_body(json!({"data": {"run": {"identifier": "RUN-1"}}}));
    });
    let step_one = server.mock(|when, then| {
        when.method(POST).path("/api/v1/logs").json_body(json!({
            "run": {"identifier": "RUN-1"},
            "step": {"number": 1},
            "result": {"id": 2},
            "actualResult": "Homepage title is correct",
            "attachments": [{"name": "screenshot", "extension": "png", "file": "cGFzc2VkLWJ5dGVz"}]
        }));
        then.status(200)
            .json_body(json!({"data": {"log": {"identifier": "LOG-1"}}}));
    });
    let step_two = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/logs")
            .json_body_partial(r#"{"run": {"identifier": "RUN-1"}, "step": {"number": 2}, "result": {"id": 1}}"#);
        then.status(200)
            .json_body(json!({"data": {"log": {"identifier": "LOG-2"}}}));
    });

    let dir = tempfile::tempdir().expect("tempdir");
    let (passed, failed) = write_screenshots(dir.path());

    let mut cfg = ClientConfig::new("suite-token");
    cfg.set_vansah_url(server.base_url())
        .set_sprint_name("TF Sprint 1")
        .set_environment_name("UAT")
        .set_release_name("TestingTRUNK")
        .set_jira_issue_key("TF-4");
    let metrics = Arc::new(Metrics::new());
    let client = VansahClient::new_with_metrics(cfg, Arc::clone(&metrics)).expect("client");

    let mut session = client
        .add_test_run_from_jira_issue(TEST_CASE)
        .expect("run is created before the tests");

    client
        .add_test_log(
            &mut session,
            "PASSED",
            "Homepage title is correct",
            1,
            Some(&passed),
        )
        .expect("step 1 logged");
    let last = client
        .add_test_log(
            &mut session,
            "FAILED",
            "Link navigation failed: heading not visible",
            2,
            Some(&failed),
        )
        .expect("step 2 logged");

    run.assert();
    step_one.assert();
    step_two.assert();
    assert_eq!(last, "LOG-2");
    assert_eq!(session.last_log_identifier(), Some("LOG-2"));

    let snap = metrics.snapshot();
    assert_eq!(snap.api_requests, 3);
    assert_eq!(snap.runs_created, 1);
    assert_eq!(snap.logs_added, 2);
    assert_eq!(snap.request_failures, 0);
}

#[test]
fn parallel_runs_keep_separate_sessions() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/run")
            .json_body_partial(r#"{"case": {"key": "TF-C1"}}"#);
        then.status(200)
            .json_body(json!({"data": {"run": {"identifier": "RUN-A"}}}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/run")
            .json_body_partial(r#"{"case": {"key": "TF-C2"}}"#);
        then.status(200)
            .json_body(json!({"data": {"run": {"identifier": "RUN-B"}}}));
    });
    let log_a = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/logs")
            .json_body_partial(r#"{"run": {"identifier": "RUN-A"}}"#);
        then.status(200)
            .json_body(json!({"data": {"log": {"identifier": "LOG-A"}}}));
    });
    let log_b = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/logs")
            .json_body_partial(r#"{"run": {"identifier": "RUN-B"}}"#);
        then.status(200)
            .json_body(json!({"data": {"log": {"identifier": "LOG-B"}}}));
    });

    let mut cfg = ClientConfig::new("suite-token");
    cfg.set_vansah_url(server.base_url()).set_jira_issue_key("TF-4");
    let client = VansahClient::new(cfg).expect("client");

    let handles: Vec<_> = ["TF-C1", "TF-C2"]
        .into_iter()
        .map(|case_key| {
            let client = client.clone();
            std::thread::spawn(move || {
                let mut session = client.add_test_run_from_jira_issue(case_key)?;
                client.add_test_log(&mut session, "passed", "ok", 1, None)?;
                Ok::<RunSession, vansah_binding::VansahError>(session)
            })
        })
        .collect();

    let sessions: Vec<RunSession> = handles
        .into_iter()
        .map(|h| h.join().expect("thread").expect("reporting"))
        .collect();

    assert_eq!(sessions[0].run_identifier(), Some("RUN-A"));
    assert_eq!(sessions[0].last_log_identifier(), Some("LOG-A"));
    assert_eq!(sessions[1].run_identifier(), Some("RUN-B"));
    assert_eq!(sessions[1].last_log_identifier(), Some("LOG-B"));
    log_a.assert();
    log_b.assert();
}
