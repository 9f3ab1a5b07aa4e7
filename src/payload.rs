use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::status::ResultStatus;

const ATTACHMENT_NAME: &str = "screenshot";
const FALLBACK_EXTENSION: &str = "png";

/// What a new run is associated with on the Vansah side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTarget {
    JiraIssue,
    TestFolder,
}

impl RunTarget {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JiraIssue => "issue",
            Self::TestFolder => "folder",
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RunPayload<'a> {
    pub case: CaseRef<'a>,
    pub asset: Asset<'a>,
    pub properties: Properties<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultStatus>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CaseRef<'a> {
    pub key: &'a str,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Asset<'a> {
    Issue { key: &'a str },
    Folder { identifier: &'a str },
}

/// Sprint, release and environment context. Unset fields are left out of the
/// JSON entirely rather than sent as `null`.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct Properties<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint: Option<Named<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<Named<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Named<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Named<'a> {
    pub name: &'a str,
}

impl<'a> Properties<'a> {
    pub fn from_config(config: &'a ClientConfig) -> Self {
        let named = |value: &'a Option<String>| {
            value
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(|name| Named { name })
        };
        Self {
            sprint: named(&config.sprint_name),
            release: named(&config.release_name),
            environment: named(&config.environment_name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sprint.is_none() && self.release.is_none() && self.environment.is_none()
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LogPayload<'a> {
    pub run: RunRef<'a>,
    pub step: Step,
    pub result: ResultStatus,
    #[serde(rename = "actualResult")]
    pub actual_result: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RunRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<&'a str>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Step {
    pub number: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub extension: String,
    pub file: String,
}

impl Attachment {
    /// Reads and base64-encodes a file. The extension comes from the path,
    /// falling back to `png` for extensionless files.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(&bytes, extension_of(path)))
    }

    pub fn from_bytes(bytes: &[u8], extension: impl Into<String>) -> Self {
        Self {
            name: ATTACHMENT_NAME.to_string(),
            extension: extension.into(),
            file: STANDARD.encode(bytes),
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Builds a run payload. `target_ref` is the Jira issue key or the folder
/// identifier depending on `target`.
pub fn run_payload<'a>(
    config: &'a ClientConfig,
    case_key: &'a str,
    target: RunTarget,
    target_ref: &'a str,
    result: Option<ResultStatus>,
) -> RunPayload<'a> {
    let asset = match target {
        RunTarget::JiraIssue => Asset::Issue { key: target_ref },
        RunTarget::TestFolder => Asset::Folder {
            identifier: target_ref,
        },
    };
    RunPayload {
        case: CaseRef { key: case_key },
        asset,
        properties: Properties::from_config(config),
        result,
    }
}

pub fn log_payload<'a>(
    run_identifier: Option<&'a str>,
    step_number: u32,
    result: ResultStatus,
    comment: &'a str,
    attachment: Option<Attachment>,
) -> LogPayload<'a> {
    LogPayload {
        run: RunRef {
            identifier: run_identifier,
        },
        step: Step {
            number: step_number,
        },
        result,
        actual_result: comment,
        attachments: attachment.into_iter().collect(),
    }
}
