// Delete operation trait and implementation
use crate::error::{BackendSnafu, Result};
use crate::storage::backend::FileShare;
use crate::storage::options::{DeleteOptions, wants_dir};
use crate::storage::utils::cancel::cancellable;
use crate::storage::utils::path::PathResolver;
use snafu::ResultExt;

/// Trait for deleting files and directories from storage.
pub trait Deleter {
    /// Delete the file, or the directory when the mode hint says so.
    ///
    /// Deleting something that does not exist succeeds.
    async fn delete(&self, path: &str, opt: &DeleteOptions) -> Result<()>;
}

/// Implementation of Deleter for a file share.
pub struct ShareDeleter<'a, B> {
    backend: &'a B,
    resolver: &'a PathResolver,
}

impl<'a, B: FileShare> ShareDeleter<'a, B> {
    pub fn new(backend: &'a B, resolver: &'a PathResolver) -> Self {
        Self { backend, resolver }
    }

    async fn delete_resource(&self, rp: &str, is_dir: bool) -> Result<()> {
        let result = if is_dir {
            self.backend.delete_directory(rp).await
        } else {
            self.backend.delete_file(rp).await
        };

        match result {
            Ok(()) => Ok(()),
            // Backend deletes are not idempotent; a missing target counts as deleted.
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => {
                log::debug!("delete target already absent: {rp}");
                Ok(())
            }
            Err(e) => Err(e).context(BackendSnafu { op: "delete", path: rp }),
        }
    }
}

impl<B: FileShare> Deleter for ShareDeleter<'_, B> {
    async fn delete(&self, path: &str, opt: &DeleteOptions) -> Result<()> {
        let rp = self.resolver.abs_path(path);
        cancellable(
            opt.cancel.as_ref(),
            "delete",
            &rp,
            self.delete_resource(&rp, wants_dir(opt.object_mode)),
        )
        .await
    }
}
