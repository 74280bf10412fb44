// In-memory file share with the strict semantics of a hosted share service:
// deletes of missing resources fail, directories must be empty to delete, and
// listings page over the combined, name-ordered children of an existing directory.
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use md5::{Digest, Md5};
use opendal::{Error as BackendError, ErrorKind};
use sharestore::storage::backend::{
    DirectoryItem, DirectoryProperties, FileHttpHeaders, FileItem, FileProperties, FileShare,
    ListSegment, NextMarker, ResponseBody,
};
use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

#[derive(Debug, Clone)]
struct MockDir {
    last_modified: DateTime<Utc>,
    etag: String,
}

#[derive(Debug, Clone)]
struct MockFile {
    data: Vec<u8>,
    last_modified: DateTime<Utc>,
    etag: String,
    content_type: String,
    content_md5: Vec<u8>,
}

#[derive(Debug, Default)]
struct MockState {
    dirs: BTreeMap<String, MockDir>,
    files: BTreeMap<String, MockFile>,
    calls: Vec<String>,
    clock: i64,
    page_size: Option<u32>,
    fail_list_call: Option<usize>,
    list_calls: usize,
    list_delay: Option<Duration>,
    server_encrypted: String,
    fail_close: bool,
    stall_reads: bool,
}

impl MockState {
    fn tick(&mut self) -> (DateTime<Utc>, String) {
        self.clock += 1;
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + ChronoDuration::seconds(self.clock);
        (at, format!("\"0x{:X}\"", self.clock))
    }
}

/// Scripted share used to exercise the storage layer without a service.
#[derive(Clone, Default)]
pub struct MockShare {
    state: Arc<Mutex<MockState>>,
    open_bodies: Arc<AtomicUsize>,
}

fn not_found(path: &str) -> BackendError {
    BackendError::new(ErrorKind::NotFound, "The specified resource does not exist.")
        .with_context("path", path)
}

fn parent_of(name: &str) -> &str {
    name.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

impl MockShare {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the page size the share actually honors.
    pub fn with_page_size(self, page_size: u32) -> Self {
        self.state.lock().unwrap().page_size = Some(page_size);
        self
    }

    /// Fail the `n`-th (1-based) listing call.
    pub fn with_failing_list_call(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_list_call = Some(n);
        self
    }

    pub fn with_list_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().list_delay = Some(delay);
        self
    }

    /// Raw server-encryption flag reported by every properties call.
    pub fn with_server_encrypted(self, raw: &str) -> Self {
        self.state.lock().unwrap().server_encrypted = raw.to_string();
        self
    }

    pub fn with_failing_close(self) -> Self {
        self.state.lock().unwrap().fail_close = true;
        self
    }

    /// Download bodies never produce data.
    pub fn with_stalled_reads(self) -> Self {
        self.state.lock().unwrap().stall_reads = true;
        self
    }

    pub fn add_dir(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        let (last_modified, etag) = state.tick();
        state.dirs.insert(
            name.to_string(),
            MockDir {
                last_modified,
                etag,
            },
        );
    }

    pub fn add_file(&self, name: &str, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        let (last_modified, etag) = state.tick();
        state.files.insert(
            name.to_string(),
            MockFile {
                data: data.to_vec(),
                last_modified,
                etag,
                content_type: String::new(),
                content_md5: Vec::new(),
            },
        );
    }

    pub fn has_dir(&self, name: &str) -> bool {
        self.state.lock().unwrap().dirs.contains_key(name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.state.lock().unwrap().files.contains_key(name)
    }

    pub fn file_data(&self, name: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(name)
            .map(|f| f.data.clone())
    }

    /// Every backend call so far, as `operation:path`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(':').next() == Some(op))
            .count()
    }

    /// Download bodies handed out and not yet released.
    pub fn open_bodies(&self) -> usize {
        self.open_bodies.load(Ordering::SeqCst)
    }

    fn record(&self, op: &str, path: &str) {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(format!("{op}:{path}"));
    }
}

impl FileShare for MockShare {
    type Body = MockBody;

    async fn get_directory_properties(
        &self,
        path: &str,
    ) -> opendal::Result<DirectoryProperties> {
        self.record("get_directory_properties", path);
        let state = self.state.lock().unwrap();
        let dir = state.dirs.get(path).ok_or_else(|| not_found(path))?;
        Ok(DirectoryProperties {
            last_modified: dir.last_modified,
            etag: dir.etag.clone(),
            server_encrypted: state.server_encrypted.clone(),
        })
    }

    async fn create_directory(&self, path: &str) -> opendal::Result<()> {
        self.record("create_directory", path);
        if self.has_dir(path) {
            return Err(BackendError::new(
                ErrorKind::AlreadyExists,
                "The specified resource already exists.",
            ));
        }
        self.add_dir(path);
        Ok(())
    }

    async fn delete_directory(&self, path: &str) -> opendal::Result<()> {
        self.record("delete_directory", path);
        let mut state = self.state.lock().unwrap();
        if !state.dirs.contains_key(path) {
            return Err(not_found(path));
        }
        let has_children = state.dirs.keys().any(|k| parent_of(k) == path)
            || state.files.keys().any(|k| parent_of(k) == path);
        if has_children {
            return Err(BackendError::new(
                ErrorKind::Unexpected,
                "The specified directory is not empty.",
            ));
        }
        state.dirs.remove(path);
        Ok(())
    }

    async fn get_file_properties(&self, path: &str) -> opendal::Result<FileProperties> {
        self.record("get_file_properties", path);
        let state = self.state.lock().unwrap();
        let file = state.files.get(path).ok_or_else(|| not_found(path))?;
        Ok(FileProperties {
            content_length: file.data.len() as u64,
            last_modified: file.last_modified,
            etag: file.etag.clone(),
            content_type: file.content_type.clone(),
            content_md5: file.content_md5.clone(),
            server_encrypted: state.server_encrypted.clone(),
        })
    }

    async fn create_file(
        &self,
        path: &str,
        size: u64,
        headers: &FileHttpHeaders,
    ) -> opendal::Result<()> {
        self.record("create_file", path);
        let mut state = self.state.lock().unwrap();
        let (last_modified, etag) = state.tick();
        state.files.insert(
            path.to_string(),
            MockFile {
                data: vec![0; size as usize],
                last_modified,
                etag,
                content_type: headers.content_type.clone().unwrap_or_default(),
                content_md5: Vec::new(),
            },
        );
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> opendal::Result<()> {
        self.record("delete_file", path);
        match self.state.lock().unwrap().files.remove(path) {
            Some(_) => Ok(()),
            None => Err(not_found(path)),
        }
    }

    async fn download(
        &self,
        path: &str,
        offset: u64,
        count: Option<u64>,
    ) -> opendal::Result<Self::Body> {
        self.record("download", path);
        let state = self.state.lock().unwrap();
        let file = state.files.get(path).ok_or_else(|| not_found(path))?;
        let len = file.data.len();
        let start = (offset as usize).min(len);
        let end = count
            .map(|c| start.saturating_add(c as usize))
            .unwrap_or(len)
            .min(len);

        self.open_bodies.fetch_add(1, Ordering::SeqCst);
        Ok(MockBody {
            data: Cursor::new(file.data[start..end].to_vec()),
            fail_close: state.fail_close,
            stall: state.stall_reads,
            open_bodies: self.open_bodies.clone(),
        })
    }

    async fn upload_range<R>(
        &self,
        path: &str,
        offset: u64,
        mut body: R,
        size: u64,
        content_md5: Option<&[u8]>,
    ) -> opendal::Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.record("upload_range", path);
        let mut data = Vec::new();
        body.read_to_end(&mut data)
            .await
            .map_err(|e| BackendError::new(ErrorKind::Unexpected, "read body").set_source(e))?;
        if data.len() as u64 != size {
            return Err(BackendError::new(
                ErrorKind::Unexpected,
                "body length differs from range size",
            ));
        }
        if let Some(expected) = content_md5 {
            if Md5::digest(&data).as_slice() != expected {
                return Err(BackendError::new(
                    ErrorKind::ConditionNotMatch,
                    "The MD5 value specified in the request did not match.",
                ));
            }
        }

        let mut state = self.state.lock().unwrap();
        let (last_modified, etag) = state.tick();
        let file = state.files.get_mut(path).ok_or_else(|| not_found(path))?;
        let start = offset as usize;
        if start + data.len() > file.data.len() {
            return Err(BackendError::new(
                ErrorKind::Unexpected,
                "range exceeds file size",
            ));
        }
        file.data[start..start + data.len()].copy_from_slice(&data);
        file.last_modified = last_modified;
        file.etag = etag;
        if let Some(md5) = content_md5 {
            file.content_md5 = md5.to_vec();
        }
        Ok(())
    }

    async fn list_segment(
        &self,
        prefix: &str,
        marker: Option<&str>,
        max_results: u32,
    ) -> opendal::Result<ListSegment> {
        self.record("list_segment", &format!("{prefix}@{}", marker.unwrap_or("")));
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.list_calls += 1;
            if state.fail_list_call == Some(state.list_calls) {
                return Err(BackendError::new(
                    ErrorKind::Unexpected,
                    "Server failed to authenticate the request.",
                ));
            }
            state.list_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        let dir = prefix.trim_end_matches('/');
        if !dir.is_empty() && !state.dirs.contains_key(dir) {
            return Err(not_found(prefix));
        }
        let mut children: Vec<(&String, Option<u64>)> = state
            .dirs
            .keys()
            .filter(|k| parent_of(k) == dir)
            .map(|k| (k, None))
            .chain(
                state
                    .files
                    .iter()
                    .filter(|(k, _)| parent_of(k) == dir)
                    .map(|(k, f)| (k, Some(f.data.len() as u64))),
            )
            .filter(|(k, _)| marker.is_none_or(|m| k.as_str() > m))
            .collect();
        children.sort_by(|a, b| a.0.cmp(b.0));

        let page_size = state.page_size.unwrap_or(max_results) as usize;
        let has_more = children.len() > page_size;
        children.truncate(page_size);

        let mut segment = ListSegment::default();
        for (name, size) in &children {
            match size {
                None => segment.directory_items.push(DirectoryItem {
                    name: name.to_string(),
                }),
                Some(content_length) => segment.file_items.push(FileItem {
                    name: name.to_string(),
                    content_length: *content_length,
                }),
            }
        }
        if has_more {
            segment.next_marker = NextMarker::new(children.last().map(|(n, _)| n.to_string()));
        }
        Ok(segment)
    }
}

pub struct MockBody {
    data: Cursor<Vec<u8>>,
    fail_close: bool,
    stall: bool,
    open_bodies: Arc<AtomicUsize>,
}

impl AsyncRead for MockBody {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.stall {
            return Poll::Pending;
        }
        Pin::new(&mut self.data).poll_read(cx, buf)
    }
}

impl ResponseBody for MockBody {
    async fn close(self) -> io::Result<()> {
        if self.fail_close {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset while closing",
            ));
        }
        Ok(())
    }
}

impl Drop for MockBody {
    fn drop(&mut self) {
        self.open_bodies.fetch_sub(1, Ordering::SeqCst);
    }
}
