// Translate backend responses into object records
use crate::storage::backend::{DirectoryItem, FileItem, Properties};
use crate::storage::object::{Object, ObjectMode, SystemMetadata};
use crate::storage::utils::path::PathResolver;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Parse a boolean flag the way the service spells it.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`; anything else is `None`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn system_metadata(server_encrypted: &str) -> SystemMetadata {
    SystemMetadata {
        server_encrypted: parse_bool(server_encrypted),
    }
}

/// Build a populated record from a properties response.
///
/// Never fails: values the backend left empty are simply not set.
pub fn format_object(id: String, path: String, properties: &Properties) -> Object {
    match properties {
        Properties::Directory(dir) => {
            let mut o = Object::populated(id, path, ObjectMode::DIR);
            o.set_last_modified(dir.last_modified);
            if !dir.etag.is_empty() {
                o.set_etag(dir.etag.as_str());
            }
            o.set_system_metadata(system_metadata(&dir.server_encrypted));
            o
        }
        Properties::File(file) => {
            let mut o = Object::populated(id, path, ObjectMode::READ);
            o.set_content_length(file.content_length);
            o.set_last_modified(file.last_modified);
            if !file.etag.is_empty() {
                o.set_etag(file.etag.as_str());
            }
            if !file.content_type.is_empty() {
                o.set_content_type(file.content_type.as_str());
            }
            if !file.content_md5.is_empty() {
                o.set_content_md5(STANDARD.encode(&file.content_md5));
            }
            o.set_system_metadata(system_metadata(&file.server_encrypted));
            o
        }
    }
}

/// Record for a listed directory; listings carry no directory metadata.
pub fn format_dir_item(resolver: &PathResolver, item: &DirectoryItem) -> Object {
    Object::identity(
        item.name.as_str(),
        resolver.rel_path(&item.name),
        ObjectMode::DIR,
    )
}

/// Record for a listed file, carrying the size reported by the listing.
pub fn format_file_item(resolver: &PathResolver, item: &FileItem) -> Object {
    let mut o = Object::identity(
        item.name.as_str(),
        resolver.rel_path(&item.name),
        ObjectMode::READ,
    );
    o.set_content_length(item.content_length);
    o
}
