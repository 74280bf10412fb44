use snafu::Snafu;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Environment variable '{key}' is required but not found"))]
    MissingEnvVar { key: String },

    #[snafu(display("Unsupported storage provider: {provider}"))]
    UnsupportedProvider { provider: String },

    #[snafu(display("Path does not exist: {}", path.display()))]
    PathNotFound { path: PathBuf },

    #[snafu(display("Invalid base64 content md5 '{value}': {source}"))]
    InvalidContentMd5 {
        value: String,
        source: base64::DecodeError,
    },

    #[snafu(display("Failed to {op} '{path}': {source}"))]
    Backend {
        op: &'static str,
        path: String,
        source: opendal::Error,
    },

    #[snafu(display("Operation {op} on '{path}' was cancelled"))]
    Cancelled { op: &'static str, path: String },

    #[snafu(display("Failed to close response stream of '{path}': {source}"))]
    CloseStream {
        path: String,
        source: std::io::Error,
    },

    #[snafu(display("Failed to copy data of '{path}': {source}"))]
    CopyData {
        path: String,
        source: std::io::Error,
    },

    #[snafu(display("Listing of '{prefix}' was interrupted during a page fetch"))]
    ListingInterrupted { prefix: String },

    #[snafu(display("Failed to read '{path}': {source}"))]
    ReadFailed { path: String, source: Box<Error> },

    #[snafu(display("Failed to write '{local_path}' to '{remote_path}': {source}"))]
    WriteFailed {
        local_path: String,
        remote_path: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to list directory '{path}': {source}"))]
    ListDirectoryFailed { path: String, source: Box<Error> },

    #[snafu(display("OpenDAL error: {source}"))]
    OpenDal { source: opendal::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },
}

impl Error {
    /// Whether the backend reported that the target resource does not exist.
    ///
    /// Looks through the CLI wrapping variants so callers can test the root cause.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend { source, .. } | Error::OpenDal { source } => {
                source.kind() == opendal::ErrorKind::NotFound
            }
            Error::ReadFailed { source, .. }
            | Error::WriteFailed { source, .. }
            | Error::ListDirectoryFailed { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

impl From<opendal::Error> for Error {
    fn from(error: opendal::Error) -> Self {
        Error::OpenDal { source: error }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { source: error }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json { source: error }
    }
}

/// Wrap the error of a `Result` into a context variant carrying `source: Box<Error>`.
///
/// Any error convertible into [`Error`] is accepted:
/// `wrap_err!(get(..).await, ReadFailed { path: remote.clone() })`
#[macro_export]
macro_rules! wrap_err {
    ($expr:expr, $variant:ident { $($field:ident : $value:expr),* $(,)? }) => {{
        $expr.map_err(|e| $crate::error::Error::$variant {
            $($field: $value,)*
            source: Box::new($crate::error::Error::from(e)),
        })
    }};
}
