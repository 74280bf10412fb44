use clap::{Parser, Subcommand};
use snafu::ensure;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{PathNotFoundSnafu, Result};
use crate::storage::constants::{DEFAULT_BUFFER_SIZE, PROGRESS_UPDATE_INTERVAL};
use crate::storage::utils::OutputFormat;
use crate::storage::utils::path::basename;
use crate::storage::utils::progress::ConsoleProgressReporter;
use crate::storage::utils::size::format_size;
use crate::storage::{
    CreateDirOptions, DeleteOptions, ListOptions, Object, ObjectMode, OpendalShare, ReadOptions,
    StatOptions, Storage, WriteOptions,
};
use crate::wrap_err;

#[derive(Debug, Parser)]
#[command(name = "sharestore", version, about = "Object view of a file share")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List a directory
    Ls {
        #[arg(default_value = "")]
        path: String,
        /// Show type, size and modification time
        #[arg(short = 'l')]
        long: bool,
        /// One JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Show object metadata
    Stat {
        path: String,
        /// Treat the path as a directory
        #[arg(short = 'd', long = "dir")]
        dir: bool,
        #[arg(long, conflicts_with = "raw")]
        json: bool,
        #[arg(long)]
        raw: bool,
    },
    /// Create a directory if it does not exist
    Mkdir { path: String },
    /// Delete files, or empty directories with -d
    Rm {
        #[arg(required = true)]
        paths: Vec<String>,
        #[arg(short = 'd', long = "dir")]
        dir: bool,
    },
    /// Print a file, optionally a byte range of it
    Cat {
        path: String,
        #[arg(long)]
        offset: Option<u64>,
        #[arg(long)]
        size: Option<u64>,
    },
    /// Upload a local file
    Put {
        local: String,
        remote: String,
        #[arg(long)]
        content_type: Option<String>,
        /// Base64 encoded MD5 of the file
        #[arg(long)]
        content_md5: Option<String>,
        #[arg(long)]
        progress: bool,
    },
    /// Download a file
    Get {
        remote: String,
        local: String,
        #[arg(long)]
        progress: bool,
    },
}

pub async fn run(args: Args, storage: Storage<OpendalShare>) -> Result<()> {
    match args.command {
        Command::Ls { path, long, json } => list(&storage, &path, long, json).await,
        Command::Stat {
            path,
            dir,
            json,
            raw,
        } => {
            let format = if json {
                OutputFormat::Json
            } else if raw {
                OutputFormat::Raw
            } else {
                OutputFormat::Human
            };
            stat(&storage, &path, dir, format).await
        }
        Command::Mkdir { path } => {
            let object = storage
                .create_dir(&path, &CreateDirOptions::default())
                .await?;
            if object.is_populated() {
                println!("Directory already exists: {path}");
            } else {
                println!("Created directory: {path}");
            }
            Ok(())
        }
        Command::Rm { paths, dir } => {
            let mut opt = DeleteOptions::default();
            if dir {
                opt = opt.with_object_mode(ObjectMode::DIR);
            }
            for path in &paths {
                storage.delete(path, &opt).await?;
                println!("Deleted: {path}");
            }
            Ok(())
        }
        Command::Cat { path, offset, size } => {
            let opt = ReadOptions {
                offset,
                size,
                ..Default::default()
            };
            let mut stdout = tokio::io::stdout();
            wrap_err!(
                storage.read(&path, &mut stdout, &opt).await,
                ReadFailed { path: path.clone() }
            )?;
            stdout.flush().await?;
            Ok(())
        }
        Command::Put {
            local,
            remote,
            content_type,
            content_md5,
            progress,
        } => {
            wrap_err!(
                put(&storage, &local, &remote, content_type, content_md5, progress).await,
                WriteFailed {
                    local_path: local.clone(),
                    remote_path: remote.clone()
                }
            )
        }
        Command::Get {
            remote,
            local,
            progress,
        } => wrap_err!(
            get(&storage, &remote, &local, progress).await,
            ReadFailed {
                path: remote.clone()
            }
        ),
    }
}

fn reporter(label: String, total: Option<u64>) -> Arc<ConsoleProgressReporter> {
    let step_bytes = DEFAULT_BUFFER_SIZE as u64 * PROGRESS_UPDATE_INTERVAL;
    Arc::new(ConsoleProgressReporter::new(label, total, step_bytes))
}

async fn list(storage: &Storage<OpendalShare>, path: &str, long: bool, json: bool) -> Result<()> {
    let mut objects = storage.list(path, &ListOptions::default());
    let result: Result<()> = async {
        while let Some(object) = objects.next().await? {
            if json {
                println!("{}", serde_json::to_string(&object)?);
            } else if long {
                println!("{}", FileInfo::from_object(&object));
            } else {
                println!("{}", object.path);
            }
        }
        Ok(())
    }
    .await;
    wrap_err!(
        result,
        ListDirectoryFailed {
            path: path.to_string()
        }
    )
}

async fn stat(
    storage: &Storage<OpendalShare>,
    path: &str,
    dir: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut opt = StatOptions::default();
    if dir {
        opt = opt.with_object_mode(ObjectMode::DIR);
    }
    let object = storage.stat(path, &opt).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&object)?),
        OutputFormat::Raw => {
            for (key, value) in describe(&object) {
                println!("{key}={value}");
            }
        }
        OutputFormat::Human => {
            for (key, value) in describe(&object) {
                println!("{key:>16}: {value}");
            }
        }
    }
    Ok(())
}

/// Present fields of an object as ordered key/value pairs.
fn describe(object: &Object) -> Vec<(&'static str, String)> {
    let entry_type = if object.mode.is_dir() { "dir" } else { "file" };
    let mut fields = vec![
        ("path", object.path.clone()),
        ("id", object.id.clone()),
        ("type", entry_type.to_string()),
    ];
    if let Some(size) = object.content_length() {
        fields.push(("size", size.to_string()));
    }
    if let Some(modified) = object.last_modified() {
        fields.push(("last_modified", modified.to_rfc3339()));
    }
    if let Some(etag) = object.etag() {
        fields.push(("etag", etag.to_string()));
    }
    if let Some(content_type) = object.content_type() {
        fields.push(("content_type", content_type.to_string()));
    }
    if let Some(content_md5) = object.content_md5() {
        fields.push(("content_md5", content_md5.to_string()));
    }
    if let Some(encrypted) = object.system_metadata().and_then(|sm| sm.server_encrypted) {
        fields.push(("server_encrypted", encrypted.to_string()));
    }
    fields
}

async fn put(
    storage: &Storage<OpendalShare>,
    local: &str,
    remote: &str,
    content_type: Option<String>,
    content_md5: Option<String>,
    progress: bool,
) -> Result<()> {
    let local_path = Path::new(local);
    ensure!(
        local_path.is_file(),
        PathNotFoundSnafu {
            path: local_path.to_path_buf()
        }
    );

    let file = fs::File::open(local_path).await?;
    let size = file.metadata().await?.len();
    let remote = if remote.ends_with('/') {
        format!("{remote}{}", basename(local))
    } else {
        remote.to_string()
    };

    let mut opt = WriteOptions {
        content_type,
        content_md5,
        ..Default::default()
    };
    if progress {
        opt = opt.with_io_callback(
            reporter(format!("Uploading {local}"), Some(size)).into_callback(),
        );
    }

    let written = storage.write(&remote, file, size, &opt).await?;
    println!("\nUploaded: {local} → {remote} ({written} bytes)");
    Ok(())
}

async fn get(
    storage: &Storage<OpendalShare>,
    remote: &str,
    local: &str,
    progress: bool,
) -> Result<()> {
    let mut opt = ReadOptions::default();
    if progress {
        let total = storage
            .stat(remote, &StatOptions::default())
            .await?
            .content_length();
        opt = opt.with_io_callback(reporter(format!("Downloading {remote}"), total).into_callback());
    }

    if let Some(parent) = Path::new(local).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let mut file = fs::File::create(local).await?;
    let copied = storage.read(remote, &mut file, &opt).await?;
    file.flush().await?;
    println!("\nDownloaded: {remote} → {local} ({copied} bytes)");
    Ok(())
}

/// File information for detailed listing output.
struct FileInfo {
    path: String,
    size: Option<u64>,
    modified: Option<String>,
    is_dir: bool,
}

impl FileInfo {
    fn from_object(object: &Object) -> Self {
        Self {
            path: object.path.clone(),
            size: object.content_length(),
            modified: object.last_modified().map(|t| t.to_rfc3339()),
            is_dir: object.mode.is_dir(),
        }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file_type = if self.is_dir { "DIR" } else { "FILE" };
        let size_str = match self.size {
            Some(size) if !self.is_dir => format_size(size),
            _ => "-".to_string(),
        };
        let modified = self.modified.as_deref().unwrap_or("Unknown");
        write!(f, "{file_type:<6} {size_str:>10} {modified} {}", self.path)
    }
}
