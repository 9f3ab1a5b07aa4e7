use std::fmt;

use serde::Serialize;

/// Outcome of a test case or step as understood by Vansah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResultStatus {
    #[default]
    NotApplicable,
    Failed,
    Passed,
    Untested,
}

impl ResultStatus {
    /// Looks up a label case-insensitively. Anything outside the known set
    /// (typos and the empty string included) maps to `NotApplicable`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "FAILED" => Self::Failed,
            "PASSED" => Self::Passed,
            "UNTESTED" => Self::Untested,
            _ => Self::NotApplicable,
        }
    }

    /// Numeric code expected by the API.
    pub const fn id(self) -> u8 {
        match self {
            Self::NotApplicable => 0,
            Self::Failed => 1,
            Self::Passed => 2,
            Self::Untested => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotApplicable => "NA",
            Self::Failed => "FAILED",
            Self::Passed => "PASSED",
            Self::Untested => "UNTESTED",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for ResultStatus {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl From<&String> for ResultStatus {
    fn from(label: &String) -> Self {
        Self::from_label(label)
    }
}

impl From<String> for ResultStatus {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<bool> for ResultStatus {
    fn from(passed: bool) -> Self {
        if passed {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

/// Serializes as the `{"id": n}` object used in run and log payloads.
impl Serialize for ResultStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Result", 1)?;
        state.serialize_field("id", &self.id())?;
        state.end()
    }
}

pub fn result_to_id(label: &str) -> u8 {
    ResultStatus::from_label(label).id()
}
