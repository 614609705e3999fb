//! Error types for quarto-template-docs

use std::path::PathBuf;

use axum::http::StatusCode;
use quarto_gotemplate::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {unit}: {source}")]
    Parse {
        unit: String,
        #[source]
        source: ParseError,
    },

    #[error("Failed to discover template sources in {}: {message}", .path.display())]
    Discovery { path: PathBuf, message: String },

    #[error("Failed to read template source {}: {source}", .path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// HTTP status for a failed page request. Rendering and server faults are
    /// ours; everything else stems from the templates being documented.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Render(_) | Error::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        Error::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let parse = Error::Parse {
            unit: "bad.gohtml".into(),
            source: ParseError::new("bad.gohtml", 1, "unclosed action"),
        };
        assert_eq!(parse.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::Discovery {
                path: "missing".into(),
                message: "not a directory".into(),
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Render("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Server("bind".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_parse_error_message_names_unit() {
        let err = Error::Parse {
            unit: "bad.gohtml".into(),
            source: ParseError::new("bad.gohtml", 3, "unclosed action"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse bad.gohtml: template: bad.gohtml:3: unclosed action"
        );
    }
}
