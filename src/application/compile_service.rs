use crate::domain::compile::{CompileOutcome, CompileRequest};
use crate::domain::repository::Compiler;
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Validate, relay once, translate. Holds no per-request state.
pub struct CompileProxy {
    compiler: Arc<dyn Compiler>,
}

impl CompileProxy {
    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        Self { compiler }
    }

    #[instrument(skip(self, request), fields(language = %request.language, code_len = request.code.len()))]
    pub async fn run(&self, request: CompileRequest) -> Result<CompileOutcome> {
        request.validate().inspect_err(|e| {
            warn!(error = %e, "Invalid compile request");
        })?;

        let outcome = self.compiler.forward(&request).await.inspect_err(|e| {
            error!(error = %e, "Compiler call failed");
        })?;

        info!(
            succeeded = outcome.succeeded,
            output_len = outcome.output.len(),
            "Compiler call completed"
        );
        Ok(outcome)
    }
}
