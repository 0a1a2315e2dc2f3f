use std::path::PathBuf;

use thiserror::Error;

pub type PrepResult<T> = Result<T, PrepError>;

/// Error kinds produced by the preparation and alignment pipelines.
///
/// `Config` and `Parse` abort the pipeline immediately; `ExternalTool`
/// aborts only the alignment step it occurred in; `Validation` is carried
/// inside a report and never raised during preparation itself.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error in {path:?}: {message} (line: `{line}`)")]
    Parse {
        path: PathBuf,
        message: String,
        line: String,
    },

    #[error("external tool failed: `{command}` (status: {status}){stderr_suffix}")]
    ExternalTool {
        command: String,
        status: i32,
        stderr_suffix: String,
    },

    #[error("missing expected artifact at {0:?}")]
    MissingArtifact(PathBuf),

    #[error("validation failed with {0} violation(s)")]
    Validation(usize),
}

impl PrepError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>, line: &str) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: line.trim_end().to_owned(),
        }
    }

    pub fn external_tool(command: String, status: i32, stderr: &str) -> Self {
        let trimmed = stderr.trim();
        let stderr_suffix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("; stderr: {trimmed}")
        };
        Self::ExternalTool {
            command,
            status,
            stderr_suffix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_context() {
        let err = PrepError::parse("/corpus/4k0/4k0c0301.dot", "missing utterance id", "BAD LINE\n");
        let msg = err.to_string();
        assert!(msg.contains("4k0c0301.dot"));
        assert!(msg.contains("BAD LINE"));
        assert!(!msg.ends_with('\n'));
    }

    #[test]
    fn test_external_tool_omits_empty_stderr() {
        let err = PrepError::external_tool("sph2pipe -f wav a b".to_owned(), 1, "  ");
        assert!(!err.to_string().contains("stderr"));
    }
}
