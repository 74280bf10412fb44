// Ranged download into a caller supplied sink
use crate::error::{BackendSnafu, CloseStreamSnafu, CopyDataSnafu, Result};
use crate::storage::backend::{FileShare, ResponseBody};
use crate::storage::options::ReadOptions;
use crate::storage::utils::cancel::cancellable;
use crate::storage::utils::io::CallbackReader;
use crate::storage::utils::path::PathResolver;
use snafu::ResultExt;
use tokio::io::AsyncWrite;

pub trait FileReader {
    /// Copy the requested range of the file at `path` into `w`.
    ///
    /// Returns the number of bytes copied.
    async fn read<W>(&self, path: &str, w: &mut W, opt: &ReadOptions) -> Result<u64>
    where
        W: AsyncWrite + Unpin;
}

/// File share implementation of file reading
pub struct ShareFileReader<'a, B> {
    backend: &'a B,
    resolver: &'a PathResolver,
}

impl<'a, B: FileShare> ShareFileReader<'a, B> {
    pub fn new(backend: &'a B, resolver: &'a PathResolver) -> Self {
        Self { backend, resolver }
    }

    async fn download_into<W>(&self, rp: &str, w: &mut W, opt: &ReadOptions) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let offset = opt.offset.unwrap_or(0);
        let body = self
            .backend
            .download(rp, offset, opt.size)
            .await
            .context(BackendSnafu { op: "read", path: rp })?;

        let mut reader = CallbackReader::new(body, opt.io_callback.clone());
        let copied = tokio::io::copy(&mut reader, w).await;
        // The stream is released on every path; a release failure still fails the read.
        let closed = reader.into_inner().close().await;

        let n = copied.context(CopyDataSnafu { path: rp })?;
        closed.context(CloseStreamSnafu { path: rp })?;
        Ok(n)
    }
}

impl<B: FileShare> FileReader for ShareFileReader<'_, B> {
    async fn read<W>(&self, path: &str, w: &mut W, opt: &ReadOptions) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let rp = self.resolver.abs_path(path);
        cancellable(
            opt.cancel.as_ref(),
            "read",
            &rp,
            self.download_into(&rp, w, opt),
        )
        .await
    }
}
