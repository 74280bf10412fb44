use crate::error::{Error, Result};
use opendal::Operator;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncWrite};

pub mod backend;
pub mod constants;
pub mod mapper;
pub mod object;
mod operations;
pub mod options;
pub mod pagination;
pub mod utils;

pub use self::backend::{FileShare, OpendalShare};
pub use self::object::{Object, ObjectMode, ObjectState, SystemMetadata};
pub use self::options::{
    CreateDirOptions, CreateOptions, DeleteOptions, ListOptions, ReadOptions, StatOptions,
    WriteOptions,
};
pub use self::pagination::{ObjectIterator, PageStatus};
pub use self::utils::io::IoCallback;
pub use self::utils::path::PathResolver;

use self::operations::create::ShareCreator;
use self::operations::delete::ShareDeleter;
use self::operations::list::ShareLister;
use self::operations::mkdir::ShareDirCreator;
use self::operations::read::ShareFileReader;
use self::operations::stat::ShareStater;
use self::operations::write::ShareWriter;
use self::operations::{Creator, Deleter, DirCreator, FileReader, Lister, Stater, Writer};

/// Storage provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    Oss,
    S3,
    Fs,
}

impl FromStr for StorageProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "oss" => Ok(Self::Oss),
            "s3" | "minio" => Ok(Self::S3),
            "fs" => Ok(Self::Fs),
            _ => Err(Error::UnsupportedProvider {
                provider: s.to_string(),
            }),
        }
    }
}

/// Unified storage configuration for different providers
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub access_key_secret: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub root_path: Option<String>,
    /// Working directory every caller path is resolved against.
    pub work_dir: String,
}

impl StorageConfig {
    pub fn oss(
        bucket: String,
        access_key_id: String,
        access_key_secret: String,
        region: Option<String>,
    ) -> Self {
        Self {
            provider: StorageProvider::Oss,
            bucket,
            access_key_id: Some(access_key_id),
            access_key_secret: Some(access_key_secret),
            endpoint: None,
            region,
            root_path: None,
            work_dir: constants::DEFAULT_WORK_DIR.to_string(),
        }
    }

    pub fn s3(
        bucket: String,
        access_key_id: String,
        secret_access_key: String,
        region: Option<String>,
    ) -> Self {
        Self {
            provider: StorageProvider::S3,
            bucket,
            access_key_id: Some(access_key_id),
            access_key_secret: Some(secret_access_key),
            endpoint: None,
            region,
            root_path: None,
            work_dir: constants::DEFAULT_WORK_DIR.to_string(),
        }
    }

    pub fn fs(root_path: String) -> Self {
        Self {
            provider: StorageProvider::Fs,
            bucket: "local".to_string(),
            access_key_id: None,
            access_key_secret: None,
            endpoint: None,
            region: None,
            root_path: Some(root_path),
            work_dir: constants::DEFAULT_WORK_DIR.to_string(),
        }
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<String>) -> Self {
        self.work_dir = work_dir.into();
        self
    }
}

fn build_operator(config: &StorageConfig) -> Result<Operator> {
    match &config.provider {
        StorageProvider::Oss => {
            let mut builder = opendal::services::Oss::default().bucket(&config.bucket);
            if let Some(access_key_id) = &config.access_key_id {
                builder = builder.access_key_id(access_key_id);
            }
            if let Some(access_key_secret) = &config.access_key_secret {
                builder = builder.access_key_secret(access_key_secret);
            }
            if let Some(endpoint) = &config.endpoint {
                builder = builder.endpoint(endpoint);
            }
            Ok(Operator::new(builder)?.finish())
        }
        StorageProvider::S3 => {
            let mut builder = opendal::services::S3::default().bucket(&config.bucket);
            if let Some(access_key_id) = &config.access_key_id {
                builder = builder.access_key_id(access_key_id);
            }
            if let Some(secret_access_key) = &config.access_key_secret {
                builder = builder.secret_access_key(secret_access_key);
            }
            if let Some(region) = &config.region {
                builder = builder.region(region);
            }
            if let Some(endpoint) = &config.endpoint {
                builder = builder.endpoint(endpoint);
            }
            Ok(Operator::new(builder)?.finish())
        }
        StorageProvider::Fs => {
            let root = config
                .root_path
                .as_deref()
                .unwrap_or(constants::DEFAULT_FS_ROOT);
            let builder = opendal::services::Fs::default().root(root);
            Ok(Operator::new(builder)?.finish())
        }
    }
}

/// Static facts about a storage session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageMeta {
    pub work_dir: String,
}

/// A storage session: one backend plus the working directory paths resolve against.
///
/// Every operation is independent; sessions can be shared across tasks and
/// concurrent listings each get their own [`ObjectIterator`].
#[derive(Clone)]
pub struct Storage<B> {
    backend: B,
    resolver: PathResolver,
}

impl Storage<OpendalShare> {
    /// Build a session on an OpenDAL operator for the configured provider.
    pub async fn connect(config: StorageConfig) -> Result<Self> {
        log::debug!(
            "connect provider={:?} work_dir={}",
            config.provider,
            config.work_dir
        );
        let operator = build_operator(&config)?;
        Ok(Self::new(OpendalShare::new(operator), &config.work_dir))
    }

    pub fn operator(&self) -> &Operator {
        self.backend.operator()
    }
}

impl<B: FileShare> Storage<B> {
    pub fn new(backend: B, work_dir: &str) -> Self {
        Self {
            backend,
            resolver: PathResolver::new(work_dir),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn metadata(&self) -> StorageMeta {
        StorageMeta {
            work_dir: self.resolver.work_dir().to_string(),
        }
    }

    /// Describe an object locally; never touches the backend.
    pub fn create(&self, path: &str, opt: &CreateOptions) -> Object {
        ShareCreator::new(&self.resolver).create(path, opt)
    }

    pub async fn create_dir(&self, path: &str, opt: &CreateDirOptions) -> Result<Object> {
        log::debug!("create_dir path={path}");
        ShareDirCreator::new(&self.backend, &self.resolver)
            .create_dir(path, opt)
            .await
    }

    pub async fn delete(&self, path: &str, opt: &DeleteOptions) -> Result<()> {
        log::debug!("delete path={} mode={:?}", path, opt.object_mode);
        ShareDeleter::new(&self.backend, &self.resolver)
            .delete(path, opt)
            .await
    }

    pub async fn stat(&self, path: &str, opt: &StatOptions) -> Result<Object> {
        log::debug!("stat path={} mode={:?}", path, opt.object_mode);
        ShareStater::new(&self.backend, &self.resolver)
            .stat(path, opt)
            .await
    }

    /// Fetch metadata for an identity-only record; populated records pass through.
    pub async fn complete(&self, object: Object) -> Result<Object> {
        if object.is_populated() {
            return Ok(object);
        }
        let opt = StatOptions::default().with_object_mode(object.mode);
        self.stat(&object.path, &opt).await
    }

    pub async fn read<W>(&self, path: &str, w: &mut W, opt: &ReadOptions) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        log::debug!("read path={path} opt={opt:?}");
        ShareFileReader::new(&self.backend, &self.resolver)
            .read(path, w, opt)
            .await
    }

    pub async fn write<R>(&self, path: &str, r: R, size: u64, opt: &WriteOptions) -> Result<u64>
    where
        R: AsyncRead + Unpin + Send,
    {
        log::debug!("write path={path} size={size} opt={opt:?}");
        ShareWriter::new(&self.backend, &self.resolver)
            .write(path, r, size, opt)
            .await
    }

    /// Lazily list the directory at `path`.
    pub fn list(&self, path: &str, opt: &ListOptions) -> ObjectIterator<'_, B> {
        log::debug!("list path={path}");
        ShareLister::new(&self.backend, &self.resolver).list(path, opt)
    }
}
