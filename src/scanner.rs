//! Discovery of object source files.
//!
//! Layout convention: one file per object under the objects directory, with
//! the parent directory name giving the object type (uppercased) and the
//! file stem giving the object name. Only `.sql` files are picked up.

use std::fs;
use std::path::Path;

use crate::directives::parse_object_file;
use crate::error::{DeployError, Result};
use crate::registry::{ObjectRecord, Registry};

/// Scan `objects_dir` and parse every object file found.
pub fn scan_objects(objects_dir: &Path) -> Result<Vec<ObjectRecord>> {
    if !objects_dir.is_dir() {
        return Err(DeployError::DirectoryNotFound(objects_dir.to_path_buf()));
    }

    let mut records = Vec::new();
    scan_directory_recursive(objects_dir, objects_dir, &mut records)?;
    Ok(records)
}

/// Scan and register in one step. Later files overwrite earlier records
/// with the same (type, name) key.
pub fn scan_into_registry(objects_dir: &Path, registry: &mut Registry) -> Result<usize> {
    let records = scan_objects(objects_dir)?;
    let count = records.len();
    for record in records {
        registry.register(record);
    }
    Ok(count)
}

fn scan_directory_recursive(
    dir: &Path,
    base: &Path,
    records: &mut Vec<ObjectRecord>,
) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|e| DeployError::FileRead {
            path: dir.to_path_buf(),
            message: e.to_string(),
            source: e,
        })?
        .filter_map(|e| e.ok())
        .collect();
    // Deterministic scan order regardless of filesystem.
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            scan_directory_recursive(&path, base, records)?;
        } else if path.extension().and_then(|s| s.to_str()) == Some("sql") {
            match process_object_file(&path, base) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }
    Ok(())
}

fn process_object_file(path: &Path, base: &Path) -> Result<ObjectRecord> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| DeployError::Other(format!("unreadable file name: {}", path.display())))?;
    let object_type = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            DeployError::Other(format!("no parent directory for {}", path.display()))
        })?;

    let text = fs::read_to_string(path).map_err(|e| DeployError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
        source: e,
    })?;

    let label = path
        .strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();
    Ok(parse_object_file(object_type, name, &label, &text))
}
