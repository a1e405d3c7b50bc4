//! Mirrored source / packaged directory trees.
//!
//! ```text
//! client/ui/Main.swf      ──encode──▶  gamedata/ui/main.go2     (tag bngo2)
//! gamedata/ui/main.go2    ──decode──▶  client/ui/main.swf
//! ```
//!
//! Encoding lower-cases the relative path, swaps the source extension for
//! `.go2` and records `{FileName, Hash}` in the manifest. Decoding picks the
//! restored extension from the container's tag, so packaged files need no
//! side metadata.
//!
//! Files are independent: one failure is recorded in the [`BatchReport`] and
//! the rest of the tree is still processed. Source files that would land on
//! the same container (`level.js` and `level.xml`, or `A.js` and `a.js`) are
//! all failed as collisions and none of them is written. With the `parallel`
//! feature the per-file work runs on the Rayon pool; report and manifest
//! order stay the sorted walk order either way.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::asset::{AssetType, CONTAINER_EXTENSION};
use crate::container::{self, ContainerError};
use crate::hash::ContentHash;
use crate::manifest::Manifest;
use crate::registry::Registry;

/// Source files whose name ends with this are editor backups and never shipped.
const BACKUP_SUFFIX: &str = "backup.swf";

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{}: {source}", path.display())]
    Container { path: PathBuf, source: ContainerError },
    #[error("{} is not under {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[error("{} and {} map to the same container", path.display(), other.display())]
    Collision { path: PathBuf, other: PathBuf },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> TreeError + '_ {
    move |source| TreeError::Io { path: path.to_owned(), source }
}

/// Outcome of a whole-tree run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<PathBuf>,
    pub skipped:   Vec<PathBuf>,
    pub failed:    Vec<(PathBuf, TreeError)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

enum EncodeOutcome {
    Packed { file_name: String, hash: ContentHash },
    Skipped,
}

enum DecodeOutcome {
    Restored,
    Skipped,
}

// ── Walking ──────────────────────────────────────────────────────────────────

/// Every file under `root`, recursively, in sorted path order.
///
/// Symlinks are followed and each directory is walked once, however many
/// links lead to it. A dangling link is listed like a file so that reading
/// it fails in the report instead of the file silently dropping out.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>, TreeError> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    let mut pending = vec![root.to_owned()];
    while let Some(dir) = pending.pop() {
        let real = fs::canonicalize(&dir).map_err(io_err(&dir))?;
        if !visited.insert(real) {
            continue;
        }
        for entry in fs::read_dir(&dir).map_err(io_err(&dir))? {
            let entry = entry.map_err(io_err(&dir))?;
            let path = entry.path();
            let mut kind = entry.file_type().map_err(io_err(&path))?;
            if kind.is_symlink() {
                match fs::metadata(&path) {
                    Ok(target) => kind = target.file_type(),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "dangling symlink");
                        out.push(path);
                        continue;
                    }
                }
            }
            if kind.is_dir() {
                pending.push(path);
            } else {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

fn relative<'a>(root: &Path, path: &'a Path) -> Result<&'a Path, TreeError> {
    path.strip_prefix(root).map_err(|_| TreeError::OutsideRoot {
        path: path.to_owned(),
        root: root.to_owned(),
    })
}

fn slash_joined(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn lowercase_path(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

// ── Path mapping ─────────────────────────────────────────────────────────────

/// Where the container for `source_file` goes under `packaged_root`.
pub fn packaged_path(source_root: &Path, packaged_root: &Path, source_file: &Path) -> Result<PathBuf, TreeError> {
    let rel = relative(source_root, source_file)?;
    Ok(packaged_root.join(lowercase_path(rel)).with_extension(CONTAINER_EXTENSION))
}

/// Manifest name for `source_file`: the last component of `packaged_root`
/// plus the relative path without extension, `/`-separated and lowercase,
/// e.g. `gamedata/ui/main`.
pub fn logical_name(source_root: &Path, packaged_root: &Path, source_file: &Path) -> Result<String, TreeError> {
    let rel = slash_joined(&relative(source_root, source_file)?.with_extension(""));
    let name = match packaged_root.file_name() {
        Some(root) => format!("{}/{}", root.to_string_lossy(), rel),
        None       => rel,
    };
    Ok(name.to_lowercase())
}

/// Where a decoded container of type `asset_type` is restored.
pub fn restored_path(
    packaged_root: &Path,
    source_root:   &Path,
    container:     &Path,
    asset_type:    AssetType,
) -> Result<PathBuf, TreeError> {
    let rel = relative(packaged_root, container)?;
    Ok(source_root.join(rel).with_extension(asset_type.extension()))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn is_backup(file: &Path) -> bool {
    file.file_name()
        .is_some_and(|n| n.to_string_lossy().to_lowercase().ends_with(BACKUP_SUFFIX))
}

fn source_asset_type(file: &Path) -> Option<AssetType> {
    file.extension()
        .and_then(|e| e.to_str())
        .and_then(AssetType::from_extension)
}

/// Pair every encodable file that shares its container path with another
/// file with one of the files it collides with.
fn find_collisions(source_root: &Path, packaged_root: &Path, files: &[PathBuf]) -> HashMap<PathBuf, PathBuf> {
    let mut by_target: HashMap<PathBuf, Vec<&PathBuf>> = HashMap::new();
    for file in files {
        if is_backup(file) || source_asset_type(file).is_none() {
            continue;
        }
        if let Ok(target) = packaged_path(source_root, packaged_root, file) {
            by_target.entry(target).or_default().push(file);
        }
    }

    let mut collisions = HashMap::new();
    for group in by_target.into_values().filter(|g| g.len() > 1) {
        for (i, file) in group.iter().enumerate() {
            let other = group[(i + 1) % group.len()];
            collisions.insert((*file).clone(), other.clone());
        }
    }
    collisions
}

fn write_creating_parents(path: &Path, bytes: &[u8]) -> Result<(), TreeError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    fs::write(path, bytes).map_err(io_err(path))
}

// ── Per-file work ────────────────────────────────────────────────────────────

fn encode_file(
    registry:      &Registry,
    source_root:   &Path,
    packaged_root: &Path,
    file:          &Path,
) -> Result<EncodeOutcome, TreeError> {
    if is_backup(file) {
        return Ok(EncodeOutcome::Skipped);
    }
    let Some(asset_type) = source_asset_type(file) else {
        warn!(path = %file.display(), "no asset type for extension, skipping");
        return Ok(EncodeOutcome::Skipped);
    };

    let raw = fs::read(file).map_err(io_err(file))?;
    let encoded = container::encode(registry, &raw, asset_type)
        .map_err(|source| TreeError::Container { path: file.to_owned(), source })?;

    let out = packaged_path(source_root, packaged_root, file)?;
    write_creating_parents(&out, &encoded.container)?;
    info!("[Compressed]: {}", file.display());

    Ok(EncodeOutcome::Packed {
        file_name: logical_name(source_root, packaged_root, file)?,
        hash:      encoded.hash,
    })
}

fn decode_file(
    registry:      &Registry,
    packaged_root: &Path,
    source_root:   &Path,
    file:          &Path,
) -> Result<DecodeOutcome, TreeError> {
    if !has_extension(file, CONTAINER_EXTENSION) {
        return Ok(DecodeOutcome::Skipped);
    }
    let bytes = fs::read(file).map_err(io_err(file))?;
    let decoded = container::decode(registry, &bytes)
        .map_err(|source| TreeError::Container { path: file.to_owned(), source })?;

    let out = restored_path(packaged_root, source_root, file, decoded.asset_type)?;
    write_creating_parents(&out, &decoded.data)?;
    info!("[Decompressed]: {}", file.display());
    Ok(DecodeOutcome::Restored)
}

#[cfg(feature = "parallel")]
fn run_all<T, F>(files: &[PathBuf], work: F) -> Vec<Result<T, TreeError>>
where
    T: Send,
    F: Fn(&Path) -> Result<T, TreeError> + Sync + Send,
{
    use rayon::prelude::*;
    files.par_iter().map(|f| work(f.as_path())).collect()
}

#[cfg(not(feature = "parallel"))]
fn run_all<T, F>(files: &[PathBuf], work: F) -> Vec<Result<T, TreeError>>
where
    F: Fn(&Path) -> Result<T, TreeError>,
{
    files.iter().map(|f| work(f.as_path())).collect()
}

// ── Whole-tree operations ────────────────────────────────────────────────────

/// Encode every supported file under `source_root` into `packaged_root`.
///
/// Returns the manifest of successfully encoded files and the batch report.
/// Colliding files are failed before any work runs and get no manifest
/// entry. Only a failure to list `source_root` itself is returned as `Err`.
pub fn encode_tree(
    registry:      &Registry,
    source_root:   &Path,
    packaged_root: &Path,
) -> Result<(Manifest, BatchReport), TreeError> {
    let files = collect_files(source_root)?;
    let mut collisions = find_collisions(source_root, packaged_root, &files);
    let jobs: Vec<PathBuf> = files.iter().filter(|f| !collisions.contains_key(*f)).cloned().collect();
    let mut results = run_all(&jobs, |f| encode_file(registry, source_root, packaged_root, f)).into_iter();

    let mut manifest = Manifest::default();
    let mut report = BatchReport::default();
    for path in files {
        if let Some(other) = collisions.remove(&path) {
            let e = TreeError::Collision { path: path.clone(), other };
            error!(error = %e, "encode failed");
            report.failed.push((path, e));
            continue;
        }
        // `jobs` is `files` minus the collisions, in the same order.
        let Some(result) = results.next() else { break };
        match result {
            Ok(EncodeOutcome::Packed { file_name, hash }) => {
                manifest.push(file_name, hash);
                report.succeeded.push(path);
            }
            Ok(EncodeOutcome::Skipped) => report.skipped.push(path),
            Err(e) => {
                error!(error = %e, "encode failed");
                report.failed.push((path, e));
            }
        }
    }
    Ok((manifest, report))
}

/// Decode every `.go2` container under `packaged_root` back into `source_root`.
///
/// A missing `packaged_root` is created and yields an empty report.
pub fn decode_tree(
    registry:      &Registry,
    packaged_root: &Path,
    source_root:   &Path,
) -> Result<BatchReport, TreeError> {
    if !packaged_root.exists() {
        fs::create_dir_all(packaged_root).map_err(io_err(packaged_root))?;
    }
    let files = collect_files(packaged_root)?;
    let results = run_all(&files, |f| decode_file(registry, packaged_root, source_root, f));

    let mut report = BatchReport::default();
    for (path, result) in files.into_iter().zip(results) {
        match result {
            Ok(DecodeOutcome::Restored) => report.succeeded.push(path),
            Ok(DecodeOutcome::Skipped)  => report.skipped.push(path),
            Err(e) => {
                error!(error = %e, "decode failed");
                report.failed.push((path, e));
            }
        }
    }
    Ok(report)
}
