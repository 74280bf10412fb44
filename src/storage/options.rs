// Per-call options of the storage operations
use crate::storage::object::ObjectMode;
use crate::storage::utils::io::IoCallback;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Options for [`Storage::create`](crate::storage::Storage::create).
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub object_mode: Option<ObjectMode>,
}

impl CreateOptions {
    pub fn with_object_mode(mut self, mode: ObjectMode) -> Self {
        self.object_mode = Some(mode);
        self
    }
}

/// Options for [`Storage::create_dir`](crate::storage::Storage::create_dir).
#[derive(Debug, Clone, Default)]
pub struct CreateDirOptions {
    pub cancel: Option<CancellationToken>,
}

impl CreateDirOptions {
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Options for [`Storage::delete`](crate::storage::Storage::delete).
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    pub object_mode: Option<ObjectMode>,
    pub cancel: Option<CancellationToken>,
}

impl DeleteOptions {
    pub fn with_object_mode(mut self, mode: ObjectMode) -> Self {
        self.object_mode = Some(mode);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Options for [`Storage::stat`](crate::storage::Storage::stat).
#[derive(Debug, Clone, Default)]
pub struct StatOptions {
    pub object_mode: Option<ObjectMode>,
    pub cancel: Option<CancellationToken>,
}

impl StatOptions {
    pub fn with_object_mode(mut self, mode: ObjectMode) -> Self {
        self.object_mode = Some(mode);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Options for [`Storage::list`](crate::storage::Storage::list).
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub cancel: Option<CancellationToken>,
}

impl ListOptions {
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Options for [`Storage::read`](crate::storage::Storage::read).
///
/// Without `offset` the read starts at 0; without `size` it runs to the end.
#[derive(Clone, Default)]
pub struct ReadOptions {
    pub offset: Option<u64>,
    pub size: Option<u64>,
    pub io_callback: Option<IoCallback>,
    pub cancel: Option<CancellationToken>,
}

impl ReadOptions {
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_io_callback(mut self, callback: IoCallback) -> Self {
        self.io_callback = Some(callback);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("offset", &self.offset)
            .field("size", &self.size)
            .field("io_callback", &self.io_callback.is_some())
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

/// Options for [`Storage::write`](crate::storage::Storage::write).
#[derive(Clone, Default)]
pub struct WriteOptions {
    pub content_type: Option<String>,
    /// Base64 encoded MD5 of the whole body.
    pub content_md5: Option<String>,
    pub io_callback: Option<IoCallback>,
    pub cancel: Option<CancellationToken>,
}

impl WriteOptions {
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_content_md5(mut self, content_md5: impl Into<String>) -> Self {
        self.content_md5 = Some(content_md5.into());
        self
    }

    pub fn with_io_callback(mut self, callback: IoCallback) -> Self {
        self.io_callback = Some(callback);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl fmt::Debug for WriteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("content_type", &self.content_type)
            .field("content_md5", &self.content_md5)
            .field("io_callback", &self.io_callback.is_some())
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

/// Whether a mode hint asks for the directory variant of an operation.
pub(crate) fn wants_dir(mode: Option<ObjectMode>) -> bool {
    mode.is_some_and(ObjectMode::is_dir)
}
