//! Blocking external-process invocation.
//!
//! The external toolkit (sph2pipe, Kaldi scripts) is driven through plain
//! subprocess calls; this module captures their output and elapsed time as
//! a structured result instead of inlining shell strings at call sites.

use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{PrepError, PrepResult};

/// Outcome of one external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Run an external command to completion, capturing stdout and stderr.
///
/// A non-zero exit status is an `ExternalTool` error carrying the rendered
/// command line and the captured stderr.
pub fn run_command(program: &str, args: &[String], cwd: Option<&Path>) -> PrepResult<CommandResult> {
    let rendered = format!("{} {}", program, args.join(" "));
    debug!("running `{}`", rendered);

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let started_at = Instant::now();
    let output = command.output().map_err(|err| {
        PrepError::config(format!("cannot run `{rendered}`: {err}"))
    })?;
    let elapsed = started_at.elapsed();

    let status = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(PrepError::external_tool(rendered, status, &stderr));
    }

    Ok(CommandResult {
        status,
        stdout,
        stderr,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_command_captures_stdout() {
        let result = run_command("echo", &["hello".to_owned()], None).unwrap();
        assert_eq!(result.status, 0);
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn test_failing_command_is_external_tool_error() {
        let args = vec!["-c".to_owned(), "echo oops >&2; exit 3".to_owned()];
        let err = run_command("sh", &args, None).unwrap_err();
        match err {
            PrepError::ExternalTool { status, stderr_suffix, .. } => {
                assert_eq!(status, 3);
                assert!(stderr_suffix.contains("oops"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program_is_config_error() {
        let err = run_command("definitely-not-a-real-binary", &[], None).unwrap_err();
        assert!(matches!(err, PrepError::Config(_)));
    }
}
