use crate::error::{BackendSnafu, Result};
use crate::storage::backend::{FileShare, Properties};
use crate::storage::mapper::format_object;
use crate::storage::object::Object;
use crate::storage::options::{StatOptions, wants_dir};
use crate::storage::utils::cancel::cancellable;
use crate::storage::utils::path::PathResolver;
use snafu::ResultExt;

/// Trait for fetching object metadata from storage.
pub trait Stater {
    /// Fetch metadata for a file, or a directory when the mode hint says so.
    ///
    /// A missing object is an error; check it with [`Error::is_not_found`].
    ///
    /// [`Error::is_not_found`]: crate::error::Error::is_not_found
    async fn stat(&self, path: &str, opt: &StatOptions) -> Result<Object>;
}

/// Implementation of `Stater` for a file share.
pub struct ShareStater<'a, B> {
    backend: &'a B,
    resolver: &'a PathResolver,
}

impl<'a, B: FileShare> ShareStater<'a, B> {
    pub fn new(backend: &'a B, resolver: &'a PathResolver) -> Self {
        Self { backend, resolver }
    }

    async fn fetch_properties(&self, rp: &str, is_dir: bool) -> Result<Properties> {
        let properties = if is_dir {
            self.backend
                .get_directory_properties(rp)
                .await
                .map(Properties::Directory)
        } else {
            self.backend
                .get_file_properties(rp)
                .await
                .map(Properties::File)
        };
        properties.context(BackendSnafu { op: "stat", path: rp })
    }
}

impl<B: FileShare> Stater for ShareStater<'_, B> {
    async fn stat(&self, path: &str, opt: &StatOptions) -> Result<Object> {
        let rp = self.resolver.abs_path(path);
        let properties = cancellable(
            opt.cancel.as_ref(),
            "stat",
            &rp,
            self.fetch_properties(&rp, wants_dir(opt.object_mode)),
        )
        .await?;
        Ok(format_object(rp, path.to_string(), &properties))
    }
}
