//! Bounded external tool invocation

use std::ffi::OsStr;
use std::process::Output;
use std::time::Duration;

use tokio::process::Command;

use crate::domain::extraction::ExtractionError;

/// Run a tool to completion, killing it if the deadline passes.
///
/// Non-zero exit, spawn failure and timeout all become `EngineFailure`.
pub(super) async fn run_tool<I, S>(
    program: &str,
    args: I,
    timeout: Duration,
) -> Result<Output, ExtractionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let child = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(result) => result
            .map_err(|e| ExtractionError::engine(format!("failed to run {}: {}", program, e)))?,
        Err(_) => {
            return Err(ExtractionError::engine(format!(
                "{} timed out after {}s",
                program,
                timeout.as_secs()
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::engine(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_engine_failure() {
        let err = run_tool(
            "claim-intake-no-such-tool",
            ["--version"],
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExtractionError::EngineFailure { .. }));
        assert!(err.to_string().contains("failed to run claim-intake-no-such-tool"));
    }
}
