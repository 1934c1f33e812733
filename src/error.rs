// Error kinds for rule loading, expression compilation and input parsing.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad rule document: missing section, empty counter set, bad expression.
    #[error("config error: {0}")]
    Config(String),

    /// Expression rejected by the evaluator.
    #[error("invalid expression `{expression}`: {message}")]
    Compile { expression: String, message: String },

    /// Malformed input record. `line` is the raw text of the offending line.
    #[error("line {line_number}: {message}: {line}")]
    Format {
        line_number: usize,
        line: String,
        message: String,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn compile(expression: &str, message: impl Into<String>) -> Self {
        Error::Compile {
            expression: expression.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn format(line_number: usize, line: &str, message: impl Into<String>) -> Self {
        Error::Format {
            line_number,
            line: line.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
