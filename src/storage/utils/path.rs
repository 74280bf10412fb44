// Path helper utilities shared across storage operations
use crate::storage::constants::DEFAULT_WORK_DIR;

/// Maps caller-relative paths onto absolute backend paths under a fixed working directory.
///
/// The working directory is normalized to start and end with `/`. Absolute backend
/// paths never carry the leading `/`, so `/data/` + `a.txt` resolves to `data/a.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    work_dir: String,
}

impl PathResolver {
    pub fn new(work_dir: &str) -> Self {
        let trimmed = work_dir.trim_matches('/');
        let work_dir = if trimmed.is_empty() {
            DEFAULT_WORK_DIR.to_string()
        } else {
            format!("/{trimmed}/")
        };
        Self { work_dir }
    }

    pub fn work_dir(&self) -> &str {
        &self.work_dir
    }

    fn prefix(&self) -> &str {
        self.work_dir.trim_start_matches('/')
    }

    /// Resolve a caller-relative path into an absolute backend path.
    pub fn abs_path(&self, path: &str) -> String {
        format!("{}{path}", self.prefix())
    }

    /// Recover the caller-relative path from an absolute backend path.
    ///
    /// Names outside the working directory are returned unchanged.
    pub fn rel_path(&self, abs_path: &str) -> String {
        abs_path
            .strip_prefix(self.prefix())
            .unwrap_or(abs_path)
            .to_string()
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_DIR)
    }
}

/// Extract a normalized basename from a remote path.
pub fn basename(path: &str) -> String {
    std::path::Path::new(path.trim_matches('/'))
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.trim_matches('/').to_string())
}
