// Document loading module
// Turns a directory of PDF files into one Document per page

#[cfg(test)]
pub(crate) mod fixtures;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::DocsQaError;

/// Text extracted from a single PDF page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Where a document came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentMetadata {
    /// Path of the PDF file
    pub source: PathBuf,
    /// 1-based page number within the file
    pub page: u32,
}

impl DocumentMetadata {
    #[inline]
    pub fn describe(&self) -> String {
        let name = self
            .source
            .file_name()
            .map_or_else(|| self.source.display().to_string(), |n| n.to_string_lossy().into_owned());
        format!("{} (page {})", name, self.page)
    }
}

/// List the PDF files directly inside `dir`, sorted by file name.
/// Hidden files and subdirectories are skipped.
#[inline]
pub fn find_pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DocsQaError::Loader(format!(
            "Directory not found: {}",
            dir.display()
        ))
        .into());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        let hidden = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'));
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if !hidden && is_pdf && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Extract every page of one PDF as a document
#[inline]
pub fn load_pdf(path: &Path) -> Result<Vec<Document>> {
    let pdf = lopdf::Document::load(path)
        .map_err(|e| DocsQaError::Loader(format!("Failed to open {}: {}", path.display(), e)))?;

    let pages = pdf.get_pages();
    let mut documents = Vec::with_capacity(pages.len());

    for &page in pages.keys() {
        let content = match pdf.extract_text(&[page]) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Could not extract text from {} page {}: {}",
                    path.display(),
                    page,
                    e
                );
                String::new()
            }
        };

        documents.push(Document {
            content,
            metadata: DocumentMetadata {
                source: path.to_path_buf(),
                page,
            },
        });
    }

    debug!("Loaded {} pages from {}", documents.len(), path.display());
    Ok(documents)
}

/// Load all pages of all PDFs in `dir`, in file-name then page order
#[inline]
pub fn load_pdf_directory(dir: &Path) -> Result<Vec<Document>> {
    let files = find_pdf_files(dir)?;
    if files.is_empty() {
        warn!("No PDF files found in {}", dir.display());
    }

    let mut documents = Vec::new();
    for file in &files {
        documents.extend(load_pdf(file)?);
    }

    info!(
        "Loaded {} pages from {} PDF files in {}",
        documents.len(),
        files.len(),
        dir.display()
    );
    Ok(documents)
}
