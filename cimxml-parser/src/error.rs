//! Error types and the diagnostics handler for CIMXML parsing

/// Error type for CIMXML parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// RDF/XML grammar violation
    #[error("parse error at byte {position}: {message}")]
    Syntax {
        /// Byte offset into the input
        position: u64,
        /// What went wrong
        message: String,
    },

    /// XML well-formedness or tokenizer failure
    #[error("XML error at byte {position}: {message}")]
    Xml {
        /// Byte offset into the input
        position: u64,
        /// The tokenizer's message
        message: String,
    },

    /// Dataset or graph failure surfaced through the parse API
    #[error(transparent)]
    Graph(#[from] cimxml_graph::GraphError),

    /// Profile wrapping or registration failure
    #[error(transparent)]
    Profile(#[from] cimxml_profile::ProfileError),
}

/// Result type for CIMXML parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Diagnostics consumer for the parser.
///
/// Warnings are recoverable and never abort a parse. Errors abort: the
/// parser calls [`ErrorHandler::error`] and then returns the corresponding
/// [`ParseError`] to the caller.
pub trait ErrorHandler {
    /// A recoverable diagnostic.
    fn warning(&mut self, message: &str, position: u64);

    /// An unrecoverable diagnostic; the parse stops after this call.
    fn error(&mut self, message: &str, position: u64) {
        let _ = (message, position);
    }
}

/// Default handler: routes diagnostics to `tracing`.
#[derive(Debug, Default)]
pub struct TracingErrorHandler;

impl ErrorHandler for TracingErrorHandler {
    fn warning(&mut self, message: &str, position: u64) {
        tracing::warn!(position, "{message}");
    }

    fn error(&mut self, message: &str, position: u64) {
        tracing::error!(position, "{message}");
    }
}

/// Handler that collects warnings, for tests and callers that want to
/// inspect diagnostics after a parse.
#[derive(Debug, Default)]
pub struct CollectingErrorHandler {
    /// Collected warning messages with their byte offsets.
    pub warnings: Vec<(String, u64)>,
}

impl ErrorHandler for CollectingErrorHandler {
    fn warning(&mut self, message: &str, position: u64) {
        self.warnings.push((message.to_string(), position));
    }
}
