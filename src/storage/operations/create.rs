// Declarative create: describe an object without touching the backend
use crate::storage::object::{Object, ObjectMode};
use crate::storage::options::{CreateOptions, wants_dir};
use crate::storage::utils::path::PathResolver;

/// Trait for building object records without any backend call.
pub trait Creator {
    /// Describe the object at `path`.
    ///
    /// The returned record is identity-only; nothing is created remotely.
    fn create(&self, path: &str, opt: &CreateOptions) -> Object;
}

/// Creator resolving paths against the session working directory.
pub struct ShareCreator<'a> {
    resolver: &'a PathResolver,
}

impl<'a> ShareCreator<'a> {
    pub fn new(resolver: &'a PathResolver) -> Self {
        Self { resolver }
    }
}

impl Creator for ShareCreator<'_> {
    fn create(&self, path: &str, opt: &CreateOptions) -> Object {
        let mode = if wants_dir(opt.object_mode) {
            ObjectMode::DIR
        } else {
            ObjectMode::READ
        };
        Object::identity(self.resolver.abs_path(path), path, mode)
    }
}
