//! Section-marker document chunker.
//!
//! The knowledge document is hand-written markdown whose sections are
//! separated by a marker line (`---` by default). Each section becomes one
//! [`Chunk`]. A line *ending* in the marker also closes a section, so both
//! `"A\n---\nB"` and `"A---\nB"` yield `["A", "B"]`.
//!
//! Chunk indices are contiguous from 0 and are the key that pairs a chunk
//! with its embedding in [`KnowledgeBase`](crate::knowledge::KnowledgeBase).

use std::path::Path;

use crate::error::{Error, Result};

/// One non-empty, trimmed section of the knowledge document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the document, starting at 0.
    pub index: usize,
    pub text: String,
}

/// Read the knowledge document.
///
/// A missing file is reported as [`Error::DocumentMissing`]; the caller is
/// expected to abort startup.
pub fn load_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::DocumentMissing {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and split the knowledge document in one step.
pub fn load_chunks(path: &Path, separator: &str) -> Result<Vec<Chunk>> {
    let text = load_document(path)?;
    let chunks = split_document(&text, separator);
    tracing::info!(
        path = %path.display(),
        count = chunks.len(),
        "knowledge base loaded"
    );
    Ok(chunks)
}

/// Split text into chunks at every line that ends with `separator`.
///
/// Whitespace around each section is trimmed and empty sections are
/// dropped. A line ending in a longer run of the separator's last character
/// (e.g. `----` for `---`) is not treated as a marker.
pub fn split_document(text: &str, separator: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    let marker_tail = separator.chars().last();

    for line in text.split_inclusive('\n') {
        let body = line.trim_end();

        let prefix = body.strip_suffix(separator).filter(|prefix| {
            // "----" must not split on "---"
            match (prefix.chars().last(), marker_tail) {
                (Some(p), Some(t)) => p != t,
                _ => true,
            }
        });

        match prefix {
            Some(prefix) => {
                current.push_str(prefix);
                flush(&mut chunks, &mut current);
            }
            None => current.push_str(line),
        }
    }
    flush(&mut chunks, &mut current);

    chunks
}

/// Join chunk texts with the separator on its own line.
pub fn join_sections<'a>(texts: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    let glue = format!("\n{}\n", separator);
    texts.into_iter().collect::<Vec<_>>().join(&glue)
}

fn flush(chunks: &mut Vec<Chunk>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(Chunk {
            index: chunks.len(),
            text: trimmed.to_string(),
        });
    }
    current.clear();
}
