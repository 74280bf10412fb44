// Backend collaborator: the file-share service as seen by the storage layer
use chrono::{DateTime, Utc};
use std::io;
use tokio::io::AsyncRead;

mod operator;

pub use operator::{OpendalBody, OpendalShare};

/// Properties returned by a directory properties fetch.
///
/// String fields are empty when the service did not supply them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryProperties {
    pub last_modified: DateTime<Utc>,
    pub etag: String,
    /// Raw server-side encryption flag, e.g. `"true"`.
    pub server_encrypted: String,
}

/// Properties returned by a file properties fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProperties {
    pub content_length: u64,
    pub last_modified: DateTime<Utc>,
    pub etag: String,
    pub content_type: String,
    /// Raw MD5 digest bytes; empty when the service has none.
    pub content_md5: Vec<u8>,
    pub server_encrypted: String,
}

/// Either shape of a properties response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Properties {
    Directory(DirectoryProperties),
    File(FileProperties),
}

/// HTTP headers declared when a file is initialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileHttpHeaders {
    pub content_type: Option<String>,
}

/// Directory entry of a listing segment. `name` is the absolute backend path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryItem {
    pub name: String,
}

/// File entry of a listing segment. `name` is the absolute backend path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    pub name: String,
    pub content_length: u64,
}

/// Continuation token returned with every listing segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextMarker {
    val: Option<String>,
}

impl NextMarker {
    pub fn new(val: Option<String>) -> Self {
        Self { val }
    }

    /// A marker signalling the end of the listing.
    pub fn done() -> Self {
        Self { val: None }
    }

    /// More segments remain when the token is present and non-empty.
    pub fn not_done(&self) -> bool {
        self.val.as_deref().is_some_and(|v| !v.is_empty())
    }

    pub fn into_inner(self) -> Option<String> {
        self.val
    }
}

/// One page of a listing: directories and files in backend order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSegment {
    pub directory_items: Vec<DirectoryItem>,
    pub file_items: Vec<FileItem>,
    pub next_marker: NextMarker,
}

/// Response stream of a download.
///
/// Dropping the body releases it; `close` does the same but reports release failures.
#[allow(async_fn_in_trait)]
pub trait ResponseBody: AsyncRead + Unpin + Send {
    async fn close(self) -> io::Result<()>;
}

/// A hierarchical file-share service addressed by absolute backend paths.
///
/// Errors use opendal's error type; a missing resource is reported with
/// [`opendal::ErrorKind::NotFound`]. Implementations perform no retries of their own
/// beyond what their transport does.
#[allow(async_fn_in_trait)]
pub trait FileShare {
    type Body: ResponseBody;

    async fn get_directory_properties(&self, path: &str) -> opendal::Result<DirectoryProperties>;

    /// Create a directory without attributes.
    async fn create_directory(&self, path: &str) -> opendal::Result<()>;

    /// Delete an empty directory. A missing directory may be reported as not-found.
    async fn delete_directory(&self, path: &str) -> opendal::Result<()>;

    async fn get_file_properties(&self, path: &str) -> opendal::Result<FileProperties>;

    /// Initialize a file of `size` bytes, replacing any existing content.
    async fn create_file(
        &self,
        path: &str,
        size: u64,
        headers: &FileHttpHeaders,
    ) -> opendal::Result<()>;

    /// Delete a file. A missing file may be reported as not-found.
    async fn delete_file(&self, path: &str) -> opendal::Result<()>;

    /// Download `count` bytes from `offset`, or everything after `offset` when `count` is `None`.
    async fn download(
        &self,
        path: &str,
        offset: u64,
        count: Option<u64>,
    ) -> opendal::Result<Self::Body>;

    /// Write `size` bytes read from `body` into the range starting at `offset`.
    ///
    /// When `content_md5` is given the service rejects the range if the digest of the
    /// transferred bytes differs.
    async fn upload_range<R>(
        &self,
        path: &str,
        offset: u64,
        body: R,
        size: u64,
        content_md5: Option<&[u8]>,
    ) -> opendal::Result<()>
    where
        R: AsyncRead + Unpin + Send;

    /// Fetch one listing segment of the directory at `prefix`.
    async fn list_segment(
        &self,
        prefix: &str,
        marker: Option<&str>,
        max_results: u32,
    ) -> opendal::Result<ListSegment>;
}
