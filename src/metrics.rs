use std::sync::atomic::{AtomicU64, Ordering};

/// Per-client counters for what was reported and what went wrong.
#[derive(Debug, Default)]
pub struct Metrics {
    api_requests: AtomicU64,
    request_failures: AtomicU64,
    runs_created: AtomicU64,
    logs_added: AtomicU64,
    attachment_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub api_requests: u64,
    pub request_failures: u64,
    pub runs_created: u64,
    pub logs_added: u64,
    pub attachment_failures: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_api_request(&self) {
        self.api_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_request_failure(&self) {
        self.request_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_run_created(&self) {
        self.runs_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_log_added(&self) {
        self.logs_added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_attachment_failure(&self) {
        self.attachment_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            api_requests: self.api_requests.load(Ordering::Relaxed),
            request_failures: self.request_failures.load(Ordering::Relaxed),
            runs_created: self.runs_created.load(Ordering::Relaxed),
            logs_added: self.logs_added.load(Ordering::Relaxed),
            attachment_failures: self.attachment_failures.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "api_requests={} request_failures={} runs_created={} logs_added={} attachment_failures={}",
            self.api_requests,
            self.request_failures,
            self.runs_created,
            self.logs_added,
            self.attachment_failures
        )
    }
}
