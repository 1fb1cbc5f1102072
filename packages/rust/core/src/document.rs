//! Per-document processing context.

use copymark_shared::CopyTargetBuckets;

/// Scratch data shared by the stages of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct DocumentData {
    /// Written by the collector, taken by the enhancer.
    pub copy_targets: Option<CopyTargetBuckets>,
}

/// One document being processed: its raw text plus scratch data.
///
/// Create a fresh context for every document; the buckets it carries are
/// only meaningful for the trees of that document.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    text: String,
    data: DocumentData,
}

impl DocumentContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: DocumentData::default(),
        }
    }

    /// The original document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn data_mut(&mut self) -> &mut DocumentData {
        &mut self.data
    }

    /// Buckets left by the collector, if any.
    pub fn copy_targets(&self) -> Option<&CopyTargetBuckets> {
        self.data.copy_targets.as_ref()
    }
}
