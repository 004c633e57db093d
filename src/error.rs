use thiserror::Error;

/// Failures raised by planner operations
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Empty or malformed input, rejected before touching the store
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no {kind} matches '{reference}'")]
    NotFound { kind: &'static str, reference: String },

    #[error("{count} {kind}s match '{reference}'; use the id instead (run `list -i`)")]
    Ambiguous {
        kind: &'static str,
        reference: String,
        count: usize,
    },

    /// Workspace and project disagree
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl PlannerError {
    pub fn not_found(kind: &'static str, reference: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            reference: reference.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short stable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Ambiguous { .. } => "ambiguous",
            Self::Conflict(_) => "conflict",
            Self::Store(_) => "store",
        }
    }

    /// Process exit status used by the command line for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::NotFound { .. } => 3,
            Self::Ambiguous { .. } => 4,
            Self::Conflict(_) => 5,
            Self::Store(_) => 6,
        }
    }
}

pub type PlannerResult<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            PlannerError::validation("empty title"),
            PlannerError::not_found("item", "x"),
            PlannerError::Ambiguous {
                kind: "item",
                reference: "x".to_string(),
                count: 2,
            },
            PlannerError::Conflict("x".to_string()),
            PlannerError::Store(rusqlite::Error::QueryReturnedNoRows),
        ];

        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn test_ambiguous_message_points_to_ids() {
        let err = PlannerError::Ambiguous {
            kind: "item",
            reference: "Standup".to_string(),
            count: 2,
        };
        let message = err.to_string();
        assert!(message.contains("2 items"));
        assert!(message.contains("list -i"));
    }
}
