// Storage operation traits and implementations
pub mod create;
pub mod delete;
pub mod list;
pub mod mkdir;
pub mod read;
pub mod stat;
pub mod write;

pub use create::Creator;
pub use delete::Deleter;
pub use list::Lister;
pub use mkdir::DirCreator;
pub use read::FileReader;
pub use stat::Stater;
pub use write::Writer;
