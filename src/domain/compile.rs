use crate::domain::de::null_as_empty;
use crate::domain::error::{DomainError, require_non_empty};
use serde::{Deserialize, Serialize};

/// Source code submitted for execution by the external compiler service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code: String,
}

impl CompileRequest {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(&[("language", &self.language), ("code", &self.code)])
    }
}

/// Normalized result of a compile run, independent of whether the code compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutcome {
    pub succeeded: bool,
    pub output: String,
}

impl CompileOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            output: output.into(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            output: error.into(),
        }
    }
}
