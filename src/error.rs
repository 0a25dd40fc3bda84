// Error types shared by the library modules. The binary wraps these in
// `anyhow` at the boundary; inside the crate every fallible call returns
// `crate::error::Result`.

use std::io;
use std::path::PathBuf;

/// Errors raised while resolving the runtime context or talking to the
/// theme service.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("zcli configuration file was malformed at path: \"{}\"", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not read zcli configuration file at path: \"{}\"", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("prompt failed: {0}")]
    Prompt(#[source] io::Error),

    #[error("Invalid username and password")]
    InvalidCredentials,

    #[error("{code} - {title}")]
    Api { code: String, title: String },

    #[error("{0}")]
    UnexpectedStatus(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("could not read preview bundle at path: \"{}\"", .path.display())]
    BundleRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("preview bundle was malformed at path: \"{}\"", .path.display())]
    BundleParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ThemeError>;
