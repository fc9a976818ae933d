/// Page outcome definitions for the run summary
///
/// Every page handed to the pipeline ends in exactly one of these states.
use std::fmt;

/// Outcome of one page of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Success States =====
    /// Page was rendered into an artifact (document mode)
    Rendered,

    /// Page was summarized into a record (details mode)
    Summarized,

    // ===== Skip States =====
    /// Extraction found no content; nothing was rendered
    Empty,

    /// The run was cancelled before the page finished
    Cancelled,

    // ===== Error States =====
    /// Network error, timeout or non-2xx response
    FetchFailed,

    /// The renderer failed or timed out for this page
    RenderFailed,
}

impl PageState {
    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Rendered | Self::Summarized)
    }

    /// Returns true if the page was left out without an error
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Empty | Self::Cancelled)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::RenderFailed)
    }

    /// Label used in logs and the run summary
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rendered => "rendered",
            Self::Summarized => "summarized",
            Self::Empty => "empty",
            Self::Cancelled => "cancelled",
            Self::FetchFailed => "fetch_failed",
            Self::RenderFailed => "render_failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
