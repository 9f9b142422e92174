//! Output directory scanning
//!
//! The output root holds one subdirectory per namespace. Each index-page
//! request walks the tree fresh: nothing here is cached or persisted.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use walkdir::WalkDir;

use crate::error::{OutpostError, Result};

/// Summary of one namespace directory.
#[derive(Debug, Clone)]
pub struct NamespaceInfo {
    /// Directory basename.
    pub name: String,
    /// Recursive file count (directories excluded).
    pub item_count: usize,
    /// Latest modification time over all contained files; `None` when the
    /// namespace holds no files.
    pub updated: Option<DateTime<Local>>,
    /// `updated` formatted for display, empty when `updated` is `None`.
    pub updated_human: String,
}

/// Scan result: namespaces sorted by name, plus any non-fatal problems hit
/// along the way. Counts reflect whatever was reachable before an issue.
#[derive(Debug, Default)]
pub struct NamespaceListing {
    pub namespaces: Vec<NamespaceInfo>,
    pub issues: Vec<String>,
}

/// Create the output root if it does not exist yet.
pub fn ensure_out(dir: impl AsRef<Path>) -> Result<()> {
    fs::create_dir_all(dir.as_ref())?;
    Ok(())
}

/// List the namespaces under `root`.
///
/// Only immediate subdirectories count as namespaces; loose files at the top
/// level are ignored. Walk errors inside a namespace are collected as issues
/// rather than failing the scan. Fails only when `root` itself cannot be
/// listed.
pub fn list_namespaces(root: impl AsRef<Path>) -> Result<NamespaceListing> {
    let root = root.as_ref();
    let entries = fs::read_dir(root).map_err(|e| {
        OutpostError::Generic(format!(
            "failed to list output directory {}: {e}",
            root.display()
        ))
    })?;

    let mut listing = NamespaceListing::default();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                listing.issues.push(format!("{}: {e}", root.display()));
                continue;
            }
        };
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => {}
            Ok(_) => continue,
            Err(e) => {
                listing
                    .issues
                    .push(format!("{}: {e}", entry.path().display()));
                continue;
            }
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let mut item_count = 0;
        let mut latest: Option<SystemTime> = None;

        for walked in WalkDir::new(entry.path()) {
            let walked = match walked {
                Ok(walked) => walked,
                Err(e) => {
                    listing.issues.push(format!("{name}: {e}"));
                    continue;
                }
            };
            if !walked.file_type().is_file() {
                continue;
            }
            item_count += 1;
            if let Ok(meta) = walked.metadata() {
                if let Ok(modified) = meta.modified() {
                    if latest.map_or(true, |current| modified > current) {
                        latest = Some(modified);
                    }
                }
            }
        }

        let updated = latest.map(DateTime::<Local>::from);
        let updated_human = updated
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        listing.namespaces.push(NamespaceInfo {
            name,
            item_count,
            updated,
            updated_human,
        });
    }

    listing.namespaces.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}
