//! Server configuration

use std::path::PathBuf;

use crate::source::DEFAULT_EXTENSIONS;

/// Configuration for the documentation server.
#[derive(Debug, Clone)]
pub struct DocsConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Directory holding the template sources
    pub directory: PathBuf,

    /// File extensions treated as template sources, without the dot
    pub extensions: Vec<String>,
}

impl DocsConfig {
    /// `host:port`, as passed to the listener.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            directory: PathBuf::from("."),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}
