use std::path::Path;
use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::logging;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::payload::{self, Attachment, RunTarget};
use crate::session::RunSession;
use crate::status::ResultStatus;

pub const API_VERSION: &str = "v1";

const RUN_ENDPOINT: &str = "run";
const LOGS_ENDPOINT: &str = "logs";

#[derive(Debug, thiserror::Error)]
pub enum VansahError {
    #[error("vansah auth token is empty; set VANSAH_TOKEN or call set_vansah_token")]
    MissingCredential,
    #[error("vansah auth token contains characters not allowed in an HTTP header")]
    InvalidCredential,
    #[error("{field} must be set before creating a run against a {target}")]
    MissingTarget {
        target: &'static str,
        field: &'static str,
    },
    #[error("vansah request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("vansah returned HTTP {status}: {message}")]
    Remote {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("failed to decode vansah response: {source}; body: {body}")]
    Decode {
        source: serde_json::Error,
        body: String,
    },
    #[error("vansah response did not contain {0}")]
    MissingIdentifier(&'static str),
    #[error("invalid Vansah URL '{0}'")]
    InvalidBaseUrl(String),
}

/// Reports runs and step logs to Vansah.
///
/// The client carries configuration only; run state lives in the
/// [`RunSession`] returned by run creation, so one client can serve several
/// runs at once.
#[derive(Debug, Clone)]
pub struct VansahClient {
    config: ClientConfig,
    http: Client,
    metrics: Arc<Metrics>,
}

impl VansahClient {
    pub fn new(config: ClientConfig) -> Result<Self, VansahError> {
        Self::new_with_metrics(config, Arc::new(Metrics::new()))
    }

    pub fn new_with_metrics(
        mut config: ClientConfig,
        metrics: Arc<Metrics>,
    ) -> Result<Self, VansahError> {
        if !config.has_token() {
            logging::error("vansah auth token is empty; refusing to build client");
            return Err(VansahError::MissingCredential);
        }
        config.base_url = normalize_base_url(&config.base_url)?;
        let mut default_headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&config.auth_token)
            .map_err(|_| VansahError::InvalidCredential)?;
        auth.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, auth);
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()?;
        logging::debug(format!(
            "vansah client ready base_url={} timeout={:?}",
            config.base_url, config.timeout
        ));
        Ok(Self {
            config,
            http,
            metrics,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.config.base_url,
            API_VERSION,
            endpoint.trim_start_matches('/')
        )
    }

    /// Sends one request and returns the decoded JSON body. Non-2xx responses
    /// become [`VansahError::Remote`] carrying the server's `message` when the
    /// body has one.
    pub fn request<P>(
        &self,
        endpoint: &str,
        method: Method,
        payload: Option<&P>,
    ) -> Result<Value, VansahError>
    where
        P: Serialize + ?Sized,
    {
        let url = self.endpoint_url(endpoint);
        self.metrics.inc_api_request();
        logging::debug(format!("vansah {} {}", method, url));

        let mut builder = self.http.request(method.clone(), &url);
        if let Some(payload) = payload {
            builder = builder.json(payload);
        }

        let response = match builder.send() {
            Ok(resp) => resp,
            Err(err) => {
                self.metrics.inc_request_failure();
                if err.is_connect() {
                    logging::error(format!(
                        "could not reach {}; provide the correct Vansah URL: {}",
                        self.config.base_url, err
                    ));
                } else {
                    logging::error(format!("vansah {} {} failed: {}", method, url, err));
                }
                return Err(VansahError::Request(err));
            }
        };

        let status = response.status();
        let body = response.text().map_err(|err| {
            self.metrics.inc_request_failure();
            VansahError::Request(err)
        })?;

        if !status.is_success() {
            self.metrics.inc_request_failure();
            let message = remote_message(&body);
            logging::error(format!(
                "error connecting to Vansah API ({} {}): {}",
                status, endpoint, message
            ));
            return Err(VansahError::Remote { status, message });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|source| {
            self.metrics.inc_request_failure();
            VansahError::Decode {
                source,
                body: truncate(&body),
            }
        })
    }

    fn post<P, T>(&self, endpoint: &str, payload: &P) -> Result<T, VansahError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = match self.request(endpoint, Method::POST, Some(payload))? {
            // An empty 2xx body decodes like `{}` so it surfaces as a missing identifier.
            Value::Null => Value::Object(serde_json::Map::new()),
            value => value,
        };
        serde_json::from_value::<T>(value.clone()).map_err(|source| {
            self.metrics.inc_request_failure();
            VansahError::Decode {
                source,
                body: truncate(&value.to_string()),
            }
        })
    }

    /// Creates a run for `case_key` linked to the configured Jira issue.
    pub fn add_test_run_from_jira_issue(&self, case_key: &str) -> Result<RunSession, VansahError> {
        self.create_run(case_key, RunTarget::JiraIssue, None)
    }

    /// Creates a run for `case_key` linked to the configured test folder.
    pub fn add_test_run_from_test_folder(
        &self,
        case_key: &str,
    ) -> Result<RunSession, VansahError> {
        self.create_run(case_key, RunTarget::TestFolder, None)
    }

    /// Creates a run against the Jira issue with its final result already set.
    pub fn add_quick_test_from_jira_issue(
        &self,
        case_key: &str,
        result: impl Into<ResultStatus>,
    ) -> Result<RunSession, VansahError> {
        self.create_run(case_key, RunTarget::JiraIssue, Some(result.into()))
    }

    pub fn add_quick_test_from_test_folder(
        &self,
        case_key: &str,
        result: impl Into<ResultStatus>,
    ) -> Result<RunSession, VansahError> {
        self.create_run(case_key, RunTarget::TestFolder, Some(result.into()))
    }

    pub fn create_run(
        &self,
        case_key: &str,
        target: RunTarget,
        result: Option<ResultStatus>,
    ) -> Result<RunSession, VansahError> {
        let target_ref = self.target_ref(target)?;
        let body = payload::run_payload(&self.config, case_key, target, target_ref, result);

        let response: RunResponse = self.post(RUN_ENDPOINT, &body)?;
        let identifier = response
            .data
            .and_then(|data| data.run)
            .and_then(|run| run.identifier)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                self.metrics.inc_request_failure();
                logging::warn(format!(
                    "vansah run response for case {} had no run identifier",
                    case_key
                ));
                VansahError::MissingIdentifier("data.run.identifier")
            })?;

        self.metrics.inc_run_created();
        match result {
            Some(status) => logging::info(format!(
                "Quick Test Run Identifier: {} case={} result={}",
                identifier, case_key, status
            )),
            None => logging::info(format!(
                "Test Run Identifier: {} case={}",
                identifier, case_key
            )),
        }
        Ok(RunSession::started(identifier, case_key))
    }

    fn target_ref(&self, target: RunTarget) -> Result<&str, VansahError> {
        let (value, field) = match target {
            RunTarget::JiraIssue => (&self.config.jira_issue_key, "jira issue key"),
            RunTarget::TestFolder => (&self.config.test_folder_id, "test folder id"),
        };
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(VansahError::MissingTarget {
                target: target.as_str(),
                field,
            })
    }

    /// Logs the outcome of one step of the session's run and records the new
    /// log identifier on the session.
    ///
    /// A session without a run identifier is reported with a warning and the
    /// request is still sent; the server's rejection comes back as
    /// [`VansahError::Remote`]. An unreadable `image_path` only drops the
    /// attachment.
    pub fn add_test_log(
        &self,
        session: &mut RunSession,
        result: impl Into<ResultStatus>,
        comment: &str,
        step_number: u32,
        image_path: Option<&Path>,
    ) -> Result<String, VansahError> {
        if !session.has_run() {
            logging::error("no test run identifier is set; create a test run first");
        }

        let attachment = image_path.and_then(|path| self.read_attachment(path));
        let body = payload::log_payload(
            session.run_identifier(),
            step_number,
            result.into(),
            comment,
            attachment,
        );

        let response: LogResponse = self.post(LOGS_ENDPOINT, &body)?;
        let identifier = response
            .data
            .and_then(|data| data.log)
            .and_then(|log| log.identifier)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                self.metrics.inc_request_failure();
                logging::warn(format!(
                    "vansah log response for step {} had no log identifier",
                    step_number
                ));
                VansahError::MissingIdentifier("data.log.identifier")
            })?;

        self.metrics.inc_log_added();
        logging::info(format!(
            "Test Log Identifier: {} step={}",
            identifier, step_number
        ));
        session.last_log_identifier = Some(identifier.clone());
        Ok(identifier)
    }

    fn read_attachment(&self, path: &Path) -> Option<Attachment> {
        match Attachment::from_path(path) {
            Ok(attachment) => Some(attachment),
            Err(err) => {
                self.metrics.inc_attachment_failure();
                logging::warn(format!(
                    "please provide the correct image path {}: {}; sending log without attachment",
                    path.display(),
                    err
                ));
                None
            }
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<String, VansahError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(VansahError::InvalidBaseUrl(raw.to_string()));
    }

    let candidate = if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed =
        reqwest::Url::parse(&candidate).map_err(|_| VansahError::InvalidBaseUrl(raw.to_string()))?;
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn remote_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|err| err.message)
        .unwrap_or_else(|| truncate(body))
}

fn truncate(body: &str) -> String {
    if body.len() > 1000 {
        let mut end = 1000;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    data: Option<RunData>,
}

#[derive(Debug, Deserialize)]
struct RunData {
    run: Option<Identified>,
}

#[derive(Debug, Deserialize)]
struct LogResponse {
    data: Option<LogData>,
}

#[derive(Debug, Deserialize)]
struct LogData {
    log: Option<Identified>,
}

#[derive(Debug, Deserialize)]
struct Identified {
    identifier: Option<String>,
}
