use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::editing::{ContentOp, Document};

/// Load a document from a content-op JSON file.
pub fn read_document(path: &Path) -> anyhow::Result<Document> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read document file {}", path.display()))?;
    let ops: Vec<ContentOp> = serde_json::from_str(&data)
        .with_context(|| format!("document file {} is not valid content-op JSON", path.display()))?;
    let doc = Document::from_ops(&ops)
        .with_context(|| format!("document file {} contains malformed ops", path.display()))?;
    Ok(doc)
}

/// Write a document as pretty-printed content-op JSON.
pub fn write_document(doc: &Document, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&doc.to_ops())?;
    fs::write(path, json)
        .with_context(|| format!("failed to write document file {}", path.display()))?;
    Ok(())
}
