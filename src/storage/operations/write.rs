// Two-phase write: initialize the file, then upload the whole body as one range
use crate::error::{BackendSnafu, InvalidContentMd5Snafu, Result};
use crate::storage::backend::{FileHttpHeaders, FileShare};
use crate::storage::options::WriteOptions;
use crate::storage::utils::cancel::cancellable;
use crate::storage::utils::io::CallbackReader;
use crate::storage::utils::path::PathResolver;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use snafu::ResultExt;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Trait for writing file contents to storage.
pub trait Writer {
    /// Replace the file at `path` with `size` bytes read from `r`.
    ///
    /// Returns `size` on success.
    async fn write<R>(&self, path: &str, r: R, size: u64, opt: &WriteOptions) -> Result<u64>
    where
        R: AsyncRead + Unpin + Send;
}

/// Implementation of Writer for a file share.
pub struct ShareWriter<'a, B> {
    backend: &'a B,
    resolver: &'a PathResolver,
}

impl<'a, B: FileShare> ShareWriter<'a, B> {
    pub fn new(backend: &'a B, resolver: &'a PathResolver) -> Self {
        Self { backend, resolver }
    }

    async fn upload<R>(
        &self,
        rp: &str,
        r: R,
        size: u64,
        content_md5: Option<&[u8]>,
        opt: &WriteOptions,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin + Send,
    {
        let headers = FileHttpHeaders {
            content_type: opt.content_type.clone(),
        };
        self.backend
            .create_file(rp, size, &headers)
            .await
            .context(BackendSnafu {
                op: "initialize file",
                path: rp,
            })?;

        let body = CallbackReader::new(r.take(size), opt.io_callback.clone());
        // No rollback: a failed upload leaves the initialized file behind.
        if let Err(err) = self
            .backend
            .upload_range(rp, 0, body, size, content_md5)
            .await
        {
            log::warn!("upload to {rp} failed after the file was initialized: {err}");
            return Err(err).context(BackendSnafu {
                op: "upload range",
                path: rp,
            });
        }

        Ok(size)
    }
}

impl<B: FileShare> Writer for ShareWriter<'_, B> {
    async fn write<R>(&self, path: &str, r: R, size: u64, opt: &WriteOptions) -> Result<u64>
    where
        R: AsyncRead + Unpin + Send,
    {
        let rp = self.resolver.abs_path(path);

        // Reject a malformed checksum before anything reaches the backend.
        let content_md5 = opt
            .content_md5
            .as_deref()
            .map(|value| STANDARD.decode(value).context(InvalidContentMd5Snafu { value }))
            .transpose()?;

        cancellable(
            opt.cancel.as_ref(),
            "write",
            &rp,
            self.upload(&rp, r, size, content_md5.as_deref(), opt),
        )
        .await
    }
}
