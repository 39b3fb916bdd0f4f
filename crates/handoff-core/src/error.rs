use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("invalid continuation method '{0}': expected ask, compact, or handoff")]
    InvalidMethod(String),

    #[error("invalid handoff mode '{0}': expected clipboard or auto-paste")]
    InvalidMode(String),

    #[error("invalid config scope '{0}': expected project or global")]
    InvalidScope(String),

    #[error("unknown flag '{0}': expected --clipboard, --auto, or --auto-paste")]
    UnknownFlag(String),

    #[error("invalid confidence level '{0}': expected HIGH, MEDIUM, or LOW")]
    InvalidConfidence(String),

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("invalid config file {path}: {message}")]
    InvalidConfig { path: String, message: String },

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("failed to persist continuation document {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no continuation documents found in {0}")]
    NoDocuments(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("no clipboard tool found: install pbcopy, wl-copy, xclip, or xsel, or set clipboardCommand")]
    ClipboardUnavailable,

    #[error("clipboard command failed: {0}")]
    ClipboardFailed(String),

    #[error("session command failed: {0}")]
    SessionFailed(String),

    #[error("invalid session snapshot: {0}")]
    InvalidSession(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HandoffError>;
