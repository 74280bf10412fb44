use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Structural and capability flags of an [`Object`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ObjectMode(u8);

impl ObjectMode {
    pub const DIR: ObjectMode = ObjectMode(1 << 0);
    pub const READ: ObjectMode = ObjectMode(1 << 1);

    pub const fn empty() -> Self {
        ObjectMode(0)
    }

    pub const fn contains(self, other: ObjectMode) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_dir(self) -> bool {
        self.contains(Self::DIR)
    }

    pub const fn is_read(self) -> bool {
        self.contains(Self::READ)
    }
}

impl BitOr for ObjectMode {
    type Output = ObjectMode;

    fn bitor(self, rhs: Self) -> Self::Output {
        ObjectMode(self.0 | rhs.0)
    }
}

impl BitOrAssign for ObjectMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ObjectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.is_dir() {
            flags.push("dir");
        }
        if self.is_read() {
            flags.push("read");
        }
        write!(f, "{}", flags.join("|"))
    }
}

impl Serialize for ObjectMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Service-maintained attributes that are not part of the content itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemMetadata {
    /// Absent when the backend flag was missing or unparsable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_encrypted: Option<bool>,
}

/// Whether an [`Object`] carries metadata fetched from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Only identity and mode are known; nothing was fetched.
    Identity,
    /// Metadata reflects a successful properties fetch.
    Populated,
}

/// Uniform record for a directory or file in the share.
///
/// `id` is the absolute backend path, `path` the caller-relative one. All other
/// metadata is optional and stays `None` unless the backend supplied a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
    pub id: String,
    pub path: String,
    pub mode: ObjectMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_metadata: Option<SystemMetadata>,
    #[serde(skip)]
    state: ObjectState,
}

impl Object {
    fn new(id: String, path: String, mode: ObjectMode, state: ObjectState) -> Self {
        Self {
            id,
            path,
            mode,
            content_length: None,
            last_modified: None,
            etag: None,
            content_type: None,
            content_md5: None,
            system_metadata: None,
            state,
        }
    }

    /// A record describing only identity, e.g. right after a declarative create.
    pub fn identity(id: impl Into<String>, path: impl Into<String>, mode: ObjectMode) -> Self {
        Self::new(id.into(), path.into(), mode, ObjectState::Identity)
    }

    /// A record whose metadata was fetched from the backend.
    pub fn populated(id: impl Into<String>, path: impl Into<String>, mode: ObjectMode) -> Self {
        Self::new(id.into(), path.into(), mode, ObjectState::Populated)
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn is_populated(&self) -> bool {
        self.state == ObjectState::Populated
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn set_content_length(&mut self, v: u64) -> &mut Self {
        self.content_length = Some(v);
        self
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn set_last_modified(&mut self, v: DateTime<Utc>) -> &mut Self {
        self.last_modified = Some(v);
        self
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn set_etag(&mut self, v: impl Into<String>) -> &mut Self {
        self.etag = Some(v.into());
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn set_content_type(&mut self, v: impl Into<String>) -> &mut Self {
        self.content_type = Some(v.into());
        self
    }

    /// Base64 encoded MD5 digest of the content.
    pub fn content_md5(&self) -> Option<&str> {
        self.content_md5.as_deref()
    }

    pub fn set_content_md5(&mut self, v: impl Into<String>) -> &mut Self {
        self.content_md5 = Some(v.into());
        self
    }

    pub fn system_metadata(&self) -> Option<&SystemMetadata> {
        self.system_metadata.as_ref()
    }

    pub fn set_system_metadata(&mut self, v: SystemMetadata) -> &mut Self {
        self.system_metadata = Some(v);
        self
    }
}
