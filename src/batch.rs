//! Batch photo normalization for the `normalize` command.
//!
//! Inputs are files or directories; directories are walked recursively and
//! every file with an image extension is picked up. Each input becomes one
//! canvas-sized PNG in the output directory, named after the source stem.
//!
//! ## Parallel Processing
//!
//! Files are normalized in parallel on the global [rayon](https://docs.rs/rayon)
//! pool. Progress is reported as [`BatchEvent`]s over an optional channel so
//! the caller can print while work continues. A file that fails to decode is
//! reported and skipped; it never stops the batch.

use crate::imaging::{CanvasSpec, ImageBackend, Placement, normalize_photo};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot walk input directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("input not found: {0}")]
    InputNotFound(PathBuf),
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp", "gif", "bmp"];

/// One source file and where its normalized PNG goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Normalized {
        index: usize,
        source: PathBuf,
        output: PathBuf,
        placement: Placement,
    },
    Failed {
        index: usize,
        source: PathBuf,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub normalized: usize,
    pub failed: usize,
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand inputs into a sorted, de-duplicated list of image files.
///
/// Explicit file arguments are taken as given, whatever their extension.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path).follow_links(true) {
                let entry = entry?;
                if entry.file_type().is_file() && has_image_extension(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            files.extend(found);
        } else {
            return Err(BatchError::InputNotFound(path.clone()));
        }
    }
    let mut seen = HashSet::new();
    files.retain(|f| seen.insert(f.clone()));
    Ok(files)
}

/// Assign each source an output file `{stem}.png` in `out_dir`.
///
/// Repeated stems get a numeric suffix (`photo.png`, `photo-2.png`, ...).
pub fn plan_outputs(sources: &[PathBuf], out_dir: &Path) -> Vec<BatchItem> {
    let mut used = HashSet::new();
    sources
        .iter()
        .map(|source| {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "photo".to_string());
            let mut name = format!("{stem}.png");
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = format!("{stem}-{n}.png");
                n += 1;
            }
            BatchItem {
                source: source.clone(),
                output: out_dir.join(name),
            }
        })
        .collect()
}

fn normalize_one(
    backend: &impl ImageBackend,
    item: &BatchItem,
    canvas: CanvasSpec,
) -> Result<Placement, String> {
    let data = fs::read(&item.source).map_err(|e| e.to_string())?;
    let photo = normalize_photo(backend, &data, canvas).map_err(|e| e.to_string())?;
    fs::write(&item.output, &photo.bytes).map_err(|e| e.to_string())?;
    Ok(photo.placement)
}

/// Normalize every item in parallel, reporting each result on `events`.
pub fn normalize_batch(
    backend: &impl ImageBackend,
    items: &[BatchItem],
    canvas: CanvasSpec,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    for dir in items.iter().filter_map(|i| i.output.parent()) {
        fs::create_dir_all(dir)?;
    }

    let ok: Vec<bool> = items
        .par_iter()
        .enumerate()
        .map(|(index, item)| {
            let result = normalize_one(backend, item, canvas);
            let event = match &result {
                Ok(placement) => BatchEvent::Normalized {
                    index: index + 1,
                    source: item.source.clone(),
                    output: item.output.clone(),
                    placement: *placement,
                },
                Err(reason) => {
                    log::warn!("{}: {}", item.source.display(), reason);
                    BatchEvent::Failed {
                        index: index + 1,
                        source: item.source.clone(),
                        reason: reason.clone(),
                    }
                }
            };
            if let Some(tx) = &events {
                // Receiver gone means nobody is listening
                let _ = tx.send(event);
            }
            result.is_ok()
        })
        .collect();

    let normalized = ok.iter().filter(|&&done| done).count();
    Ok(BatchSummary {
        normalized,
        failed: ok.len() - normalized,
    })
}
