// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Turning command-line paths into input documents.

use std::path::{Path, PathBuf};

use scanlook_core::error::Result;
use scanlook_core::types::{DocumentType, InputDocument, mime};
use tracing::{debug, warn};

/// MIME type for `path`, inferred from its extension.
///
/// Unknown extensions get `application/octet-stream`; the batch then reports
/// those files as unsupported instead of this function guessing.
pub fn mime_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocumentType::from_extension)
        .map(|kind| kind.mime_type())
        .unwrap_or(mime::OCTET_STREAM)
}

/// Expand `paths` into the files to process.
///
/// Files are taken as given. Directories contribute the regular files they
/// contain directly, sorted by name; subdirectories are not entered.
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = Vec::new();
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    entries.push(entry.path());
                }
            }
            entries.sort();
            debug!(dir = %path.display(), files = entries.len(), "Directory expanded");
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Read every file into an [`InputDocument`].
pub fn load_documents(paths: &[PathBuf]) -> Result<Vec<InputDocument>> {
    expand_paths(paths)?
        .into_iter()
        .map(|path| {
            let bytes = std::fs::read(&path)?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let mime_type = mime_for(&path);
            if mime_type == mime::OCTET_STREAM {
                warn!(file = %path.display(), "Unrecognised extension");
            }
            Ok(InputDocument::new(name, mime_type, bytes, path.display().to_string()))
        })
        .collect()
}
