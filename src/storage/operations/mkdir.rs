// Directory creation operation trait and implementation
use crate::error::{BackendSnafu, Result};
use crate::storage::backend::{FileShare, Properties};
use crate::storage::mapper::format_object;
use crate::storage::object::{Object, ObjectMode};
use crate::storage::options::CreateDirOptions;
use crate::storage::utils::cancel::cancellable;
use crate::storage::utils::path::PathResolver;
use snafu::ResultExt;

/// Trait for creating directories in storage.
pub trait DirCreator {
    /// Make sure a directory exists at `path`.
    ///
    /// An existing directory is reported as success with its fetched metadata;
    /// a newly created one comes back identity-only.
    async fn create_dir(&self, path: &str, opt: &CreateDirOptions) -> Result<Object>;
}

/// Implementation of DirCreator for a file share.
pub struct ShareDirCreator<'a, B> {
    backend: &'a B,
    resolver: &'a PathResolver,
}

impl<'a, B: FileShare> ShareDirCreator<'a, B> {
    pub fn new(backend: &'a B, resolver: &'a PathResolver) -> Self {
        Self { backend, resolver }
    }

    async fn ensure_directory(&self, path: &str, rp: &str) -> Result<Object> {
        match self.backend.get_directory_properties(rp).await {
            Ok(props) => {
                log::debug!("directory already exists: {rp}");
                Ok(format_object(
                    rp.to_string(),
                    path.to_string(),
                    &Properties::Directory(props),
                ))
            }
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => {
                self.backend
                    .create_directory(rp)
                    .await
                    .context(BackendSnafu {
                        op: "create directory",
                        path: rp,
                    })?;
                log::debug!("created directory: {rp}");
                Ok(Object::identity(rp, path, ObjectMode::DIR))
            }
            Err(e) => Err(e).context(BackendSnafu {
                op: "stat directory",
                path: rp,
            }),
        }
    }
}

impl<B: FileShare> DirCreator for ShareDirCreator<'_, B> {
    async fn create_dir(&self, path: &str, opt: &CreateDirOptions) -> Result<Object> {
        let rp = self.resolver.abs_path(path);
        cancellable(
            opt.cancel.as_ref(),
            "create_dir",
            &rp,
            self.ensure_directory(path, &rp),
        )
        .await
    }
}
