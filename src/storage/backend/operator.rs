// FileShare implementation on top of an OpenDAL operator
use super::{
    DirectoryItem, DirectoryProperties, FileHttpHeaders, FileItem, FileProperties, FileShare,
    ListSegment, NextMarker, ResponseBody,
};
use crate::storage::constants::DEFAULT_CHUNK_SIZE;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use opendal::{EntryMode, ErrorKind, FuturesAsyncReader, Metadata, Operator, Writer};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio_util::compat::{Compat, FuturesAsyncReadCompatExt};

/// Exposes any OpenDAL operator as a file share.
///
/// Directories are addressed with a trailing `/`. Listing is ordered by path and
/// continued with the last returned path as marker.
#[derive(Clone)]
pub struct OpendalShare {
    operator: Operator,
}

impl OpendalShare {
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    async fn stat_mode(&self, path: &str, mode: EntryMode) -> opendal::Result<Metadata> {
        let meta = self.operator.stat(path).await?;
        if meta.mode() != mode {
            return Err(opendal::Error::new(
                ErrorKind::NotFound,
                format!("no {} at this path", mode_name(mode)),
            )
            .with_context("path", path));
        }
        Ok(meta)
    }

    /// Stream the whole body into the writer, checking length and digest before commit.
    async fn copy_body<R>(
        writer: &mut Writer,
        mut body: R,
        size: u64,
        content_md5: Option<&[u8]>,
    ) -> opendal::Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut buffer = vec![0u8; DEFAULT_CHUNK_SIZE];
        let mut hasher = Md5::new();
        let mut written = 0u64;

        loop {
            let bytes_read = body.read(&mut buffer).await.map_err(|e| {
                opendal::Error::new(ErrorKind::Unexpected, "failed to read upload body")
                    .set_source(e)
            })?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
            writer.write(buffer[..bytes_read].to_vec()).await?;
            written += bytes_read as u64;
        }

        if written != size {
            return Err(opendal::Error::new(
                ErrorKind::Unexpected,
                format!("upload body ended after {written} of {size} bytes"),
            ));
        }
        if let Some(expected) = content_md5 {
            if hasher.finalize().as_slice() != expected {
                return Err(opendal::Error::new(
                    ErrorKind::ConditionNotMatch,
                    "content md5 does not match the transferred bytes",
                ));
            }
        }
        Ok(())
    }
}

fn mode_name(mode: EntryMode) -> &'static str {
    match mode {
        EntryMode::DIR => "directory",
        EntryMode::FILE => "file",
        _ => "entry",
    }
}

fn dir_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("{trimmed}/")
    }
}

fn last_modified(meta: &Metadata) -> DateTime<Utc> {
    // Some services omit it for directory markers
    meta.last_modified().unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

impl FileShare for OpendalShare {
    type Body = OpendalBody;

    async fn get_directory_properties(&self, path: &str) -> opendal::Result<DirectoryProperties> {
        let meta = self.stat_mode(&dir_path(path), EntryMode::DIR).await?;
        Ok(DirectoryProperties {
            last_modified: last_modified(&meta),
            etag: meta.etag().unwrap_or_default().to_string(),
            server_encrypted: String::new(),
        })
    }

    async fn create_directory(&self, path: &str) -> opendal::Result<()> {
        self.operator.create_dir(&dir_path(path)).await
    }

    async fn delete_directory(&self, path: &str) -> opendal::Result<()> {
        let dir = dir_path(path);
        // A file at this path is not the directory asked for.
        self.stat_mode(&dir, EntryMode::DIR).await?;
        self.operator.delete(&dir).await
    }

    async fn get_file_properties(&self, path: &str) -> opendal::Result<FileProperties> {
        let meta = self.stat_mode(path, EntryMode::FILE).await?;
        Ok(FileProperties {
            content_length: meta.content_length(),
            last_modified: last_modified(&meta),
            etag: meta.etag().unwrap_or_default().to_string(),
            content_type: meta.content_type().unwrap_or_default().to_string(),
            content_md5: meta
                .content_md5()
                .and_then(|v| STANDARD.decode(v).ok())
                .unwrap_or_default(),
            server_encrypted: String::new(),
        })
    }

    async fn create_file(
        &self,
        path: &str,
        size: u64,
        headers: &FileHttpHeaders,
    ) -> opendal::Result<()> {
        log::trace!("create_file path={path} size={size} headers={headers:?}");
        let mut writer = match &headers.content_type {
            Some(content_type) => {
                self.operator
                    .writer_with(path)
                    .content_type(content_type)
                    .await?
            }
            None => self.operator.writer(path).await?,
        };

        // Objects can't be preallocated, so the declared size is zero-filled.
        let mut remaining = size;
        while remaining > 0 {
            let chunk = remaining.min(DEFAULT_CHUNK_SIZE as u64);
            if let Err(err) = writer.write(vec![0u8; chunk as usize]).await {
                if let Err(abort_err) = writer.abort().await {
                    log::warn!("failed to abort writer for {path}: {abort_err}");
                }
                return Err(err);
            }
            remaining -= chunk;
        }
        writer.close().await?;
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> opendal::Result<()> {
        self.stat_mode(path, EntryMode::FILE).await?;
        self.operator.delete(path).await
    }

    async fn download(
        &self,
        path: &str,
        offset: u64,
        count: Option<u64>,
    ) -> opendal::Result<Self::Body> {
        let meta = self.stat_mode(path, EntryMode::FILE).await?;
        let length = meta.content_length();
        let end = count
            .map(|count| offset.saturating_add(count))
            .unwrap_or(length)
            .min(length);
        if offset >= end {
            return Ok(OpendalBody { inner: None });
        }

        let reader = self.operator.reader(path).await?;
        let stream = reader.into_futures_async_read(offset..end).await?;
        Ok(OpendalBody {
            inner: Some(stream.compat()),
        })
    }

    async fn upload_range<R>(
        &self,
        path: &str,
        offset: u64,
        body: R,
        size: u64,
        content_md5: Option<&[u8]>,
    ) -> opendal::Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        if offset != 0 {
            return Err(opendal::Error::new(
                ErrorKind::Unsupported,
                "range uploads must start at offset 0",
            ));
        }

        // Keep the headers declared when the file was initialized.
        let content_type = self
            .operator
            .stat(path)
            .await?
            .content_type()
            .map(str::to_string);
        let mut writer = match &content_type {
            Some(content_type) => {
                self.operator
                    .writer_with(path)
                    .content_type(content_type)
                    .await?
            }
            None => self.operator.writer(path).await?,
        };

        match Self::copy_body(&mut writer, body, size, content_md5).await {
            Ok(()) => {
                writer.close().await?;
                Ok(())
            }
            Err(err) => {
                if let Err(abort_err) = writer.abort().await {
                    log::warn!("failed to abort writer for {path}: {abort_err}");
                }
                Err(err)
            }
        }
    }

    async fn list_segment(
        &self,
        prefix: &str,
        marker: Option<&str>,
        max_results: u32,
    ) -> opendal::Result<ListSegment> {
        let dir = dir_path(prefix);
        // Every segment re-lists and re-sorts the whole directory, so paging a
        // directory costs O(pages * entries) plus a stat per zero-length file.
        let listed = self.operator.list(&dir).await?;
        // Listers yield the directory itself; nothing at all means it is missing.
        if listed.is_empty() && dir != "/" {
            self.stat_mode(&dir, EntryMode::DIR).await?;
        }
        let mut entries: Vec<_> = listed
            .into_iter()
            .filter(|entry| entry.path() != dir)
            .filter(|entry| marker.is_none_or(|m| entry.path() > m))
            .collect();
        entries.sort_by(|a, b| a.path().cmp(b.path()));

        let max_results = max_results.max(1) as usize;
        let has_more = entries.len() > max_results;
        let mut segment = ListSegment::default();
        let mut last_name = None;

        for entry in entries.into_iter().take(max_results) {
            last_name = Some(entry.path().to_string());
            let meta = entry.metadata();
            match meta.mode() {
                EntryMode::DIR => segment.directory_items.push(DirectoryItem {
                    name: entry.path().trim_end_matches('/').to_string(),
                }),
                EntryMode::FILE => {
                    // Some listers only report the entry mode.
                    let content_length = match meta.content_length() {
                        0 => self.operator.stat(entry.path()).await?.content_length(),
                        n => n,
                    };
                    segment.file_items.push(FileItem {
                        name: entry.path().to_string(),
                        content_length,
                    });
                }
                _ => log::debug!("skip entry of unknown mode: {}", entry.path()),
            }
        }

        if has_more {
            segment.next_marker = NextMarker::new(last_name);
        }
        Ok(segment)
    }
}

/// Download stream of an [`OpendalShare`].
pub struct OpendalBody {
    inner: Option<Compat<FuturesAsyncReader>>,
}

impl AsyncRead for OpendalBody {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.inner.as_mut() {
            Some(inner) => Pin::new(inner).poll_read(cx, buf),
            // Empty range
            None => Poll::Ready(Ok(())),
        }
    }
}

impl ResponseBody for OpendalBody {
    async fn close(self) -> io::Result<()> {
        // OpenDAL releases the underlying connection on drop.
        drop(self);
        Ok(())
    }
}
