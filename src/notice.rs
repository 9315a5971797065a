//! User-facing notices produced by commits, soft-delete fallbacks and
//! validation failures.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    /// The operation went through in a downgraded form (soft delete).
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// How a `remove` call resolved.
///
/// A referenced record is never physically deleted; it is deactivated
/// instead and stays visible in the inactive listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    Deleted,
    Deactivated,
}

impl RemoveOutcome {
    /// Notice for removing a record of the given kind (`"Customer"`,
    /// `"Product"`).
    pub fn notice(self, kind: &str) -> Notice {
        match self {
            RemoveOutcome::Deleted => Notice::success(format!("{} deleted successfully.", kind)),
            RemoveOutcome::Deactivated => Notice::warning(format!(
                "{} marked as inactive because it has sales on record.",
                kind
            )),
        }
    }
}
