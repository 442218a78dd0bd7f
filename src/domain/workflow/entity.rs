use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Named orchestration strategy, selected per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowKind {
    /// One free-text model call, no tools
    SingleCall,
    /// Classification gate, then detail extraction, then confirmation
    Chained,
    /// Classification picks one of a fixed set of branches
    Routed,
    /// Independent validation calls joined concurrently
    Parallel,
    /// Bounded tool-execution loop over the full catalog
    ToolCalling,
}

impl WorkflowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleCall => "single-call",
            Self::Chained => "chained",
            Self::Routed => "routed",
            Self::Parallel => "parallel",
            Self::ToolCalling => "tool-calling",
        }
    }

    pub fn all() -> &'static [WorkflowKind] {
        &[
            Self::SingleCall,
            Self::Chained,
            Self::Routed,
            Self::Parallel,
            Self::ToolCalling,
        ]
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-call" => Ok(Self::SingleCall),
            "chained" => Ok(Self::Chained),
            "routed" => Ok(Self::Routed),
            "parallel" => Ok(Self::Parallel),
            "tool-calling" => Ok(Self::ToolCalling),
            other => Err(DomainError::invalid_input(format!(
                "unknown workflow '{}'; expected one of: single-call, chained, routed, parallel, tool-calling",
                other
            ))),
        }
    }
}
