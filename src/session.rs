/// State of one logical test run: the identifiers handed back by the server.
///
/// A session is produced by run creation and passed to every log call for
/// that run. Parallel runs each hold their own session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSession {
    pub(crate) run_identifier: Option<String>,
    pub(crate) last_log_identifier: Option<String>,
    pub(crate) case_key: Option<String>,
}

impl RunSession {
    /// Resumes a run created elsewhere, e.g. by another process.
    pub fn resume(run_identifier: impl Into<String>) -> Self {
        Self {
            run_identifier: Some(run_identifier.into()),
            ..Self::default()
        }
    }

    pub(crate) fn started(run_identifier: String, case_key: &str) -> Self {
        Self {
            run_identifier: Some(run_identifier),
            last_log_identifier: None,
            case_key: Some(case_key.to_string()),
        }
    }

    pub fn run_identifier(&self) -> Option<&str> {
        self.run_identifier.as_deref()
    }

    pub fn last_log_identifier(&self) -> Option<&str> {
        self.last_log_identifier.as_deref()
    }

    pub fn case_key(&self) -> Option<&str> {
        self.case_key.as_deref()
    }

    pub fn has_run(&self) -> bool {
        self.run_identifier.is_some()
    }
}
