use serde::{Deserialize, Serialize};

/// Title shown when the service does not name the video
pub const UNTITLED: &str = "Untitled";

/// Represents the current phase of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Metadata request in flight
    Busy,
    /// Formats received and rendered
    Ready,
    /// The last request failed
    Error,
}

impl SubmissionState {
    /// Text for the primary state indicator
    pub fn label(self) -> &'static str {
        match self {
            SubmissionState::Idle => "Paste a link to begin",
            SubmissionState::Busy => "Analyzing video…",
            SubmissionState::Ready => "Done",
            SubmissionState::Error => "Error",
        }
    }

    /// True while a metadata request is in flight
    pub fn is_busy(self) -> bool {
        matches!(self, SubmissionState::Busy)
    }
}

/// Body of `POST /api/info`
#[derive(Debug, Clone, Serialize)]
pub struct InfoRequest<'a> {
    pub url: &'a str,
}

/// Successful body of `POST /api/info`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetadataResponse {
    pub id: Option<String>,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub thumbnail: Option<String>,
    /// Length in seconds
    pub duration: Option<f64>,
    #[serde(default)]
    pub formats: Vec<FormatDescriptor>,
}

/// One downloadable variant as described by the service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    pub quality: String,
    pub kind: String,
    pub ext: Option<String>,
    /// Pre-formatted size, preferred over `filesize`
    pub size_hint: Option<String>,
    /// Size in bytes
    pub filesize: Option<f64>,
}

/// Failure body of `POST /api/info`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

/// A rendered download option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLinkEntry {
    /// Relative download endpoint reference
    pub href: String,
    /// Top line, e.g. `360p • video+audio • mp4`
    pub label: String,
    /// Sub line, possibly empty
    pub size_label: String,
}

/// Display fields of the content head
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoDetails {
    pub title: String,
    pub uploader: String,
    pub thumbnail: Option<String>,
    pub duration: Option<String>,
}

impl MetadataResponse {
    /// Display fields with the fallbacks applied
    pub fn details(&self) -> VideoDetails {
        VideoDetails {
            title: non_empty(&self.title).unwrap_or(UNTITLED).to_owned(),
            uploader: non_empty(&self.uploader).unwrap_or_default().to_owned(),
            thumbnail: non_empty(&self.thumbnail).map(str::to_owned),
            duration: self.duration.and_then(format_duration),
        }
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Formats seconds as `m:ss` or `h:mm:ss`
pub fn format_duration(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let total = seconds.round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    Some(if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    })
}
