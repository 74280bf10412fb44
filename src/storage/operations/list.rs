use crate::storage::backend::FileShare;
use crate::storage::constants::LIST_MAX_RESULTS;
use crate::storage::options::ListOptions;
use crate::storage::pagination::{ObjectIterator, PageStatus};
use crate::storage::utils::path::PathResolver;

/// Trait for listing directory contents in storage.
pub trait Lister<'a, B> {
    /// Start a lazy listing of the directory at `path`.
    ///
    /// Nothing is fetched until the iterator is advanced.
    fn list(&self, path: &str, opt: &ListOptions) -> ObjectIterator<'a, B>;
}

/// Implementation of Lister for a file share.
pub struct ShareLister<'a, B> {
    backend: &'a B,
    resolver: &'a PathResolver,
}

impl<'a, B: FileShare> ShareLister<'a, B> {
    pub fn new(backend: &'a B, resolver: &'a PathResolver) -> Self {
        Self { backend, resolver }
    }
}

impl<'a, B: FileShare> Lister<'a, B> for ShareLister<'a, B> {
    fn list(&self, path: &str, opt: &ListOptions) -> ObjectIterator<'a, B> {
        let status = PageStatus::new(self.resolver.abs_path(path), LIST_MAX_RESULTS);
        ObjectIterator::new(self.backend, self.resolver, status, opt.cancel.clone())
    }
}
