use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityLabel {
    Normal,
    Medium,
    High,
}

/// Labels indexed by classifier class.
pub const SEVERITY_LABELS: [SeverityLabel; 3] = [
    SeverityLabel::Normal,
    SeverityLabel::Medium,
    SeverityLabel::High,
];

impl SeverityLabel {
    /// Map a classifier class to its label.
    ///
    /// A class outside the table means the classifier and the label table disagree; that is an
    /// error, never a default label.
    pub fn from_class(class: i64) -> TriageResult<Self> {
        usize::try_from(class)
            .ok()
            .and_then(|i| SEVERITY_LABELS.get(i))
            .copied()
            .ok_or(TriageError::UnknownSeverityClass(class))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLabel::Normal => "Normal",
            SeverityLabel::Medium => "Medium",
            SeverityLabel::High => "High",
        }
    }
}

impl fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
