// Buffer related constants
pub const DEFAULT_BUFFER_SIZE: usize = 8192;
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

// Progress related constants
// Controls how often progress is printed (in multiples of buffer size)
pub const PROGRESS_UPDATE_INTERVAL: u64 = 100;

// Filesystem default
pub const DEFAULT_FS_ROOT: &str = "./storage";

// Listing page size hint handed to the backend on every segment fetch
pub const LIST_MAX_RESULTS: u32 = 200;

pub const DEFAULT_WORK_DIR: &str = "/";
