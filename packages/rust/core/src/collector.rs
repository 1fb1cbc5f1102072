//! Source-tree pass: records copy targets in document order.

use tracing::{debug, instrument, trace};

use copymark_markdown::MdNode;
use copymark_shared::{CopyTargetBuckets, CopyTargetId, CopyTargetMeta};

use crate::definitions::{CopyPluginConfig, CopyTargetDefinition};
use crate::document::DocumentContext;
use crate::offsets::OffsetResolver;

/// Walks a source tree and fills the document's [`CopyTargetBuckets`].
#[derive(Debug, Clone)]
pub struct CopyCollector {
    definitions: Vec<CopyTargetDefinition>,
}

impl CopyCollector {
    pub fn new(config: &CopyPluginConfig) -> Self {
        Self {
            definitions: config.resolve(),
        }
    }

    /// Collect targets from `tree` into `document`'s scratch data.
    ///
    /// Every node is tested, including nodes nested in other targets. Nodes
    /// whose position cannot be resolved are dropped.
    #[instrument(skip_all, fields(text_len = document.text().len()))]
    pub fn run(&self, tree: &MdNode, document: &mut DocumentContext) {
        let mut pass = CollectPass {
            definitions: &self.definitions,
            resolver: OffsetResolver::new(document.text()),
            buckets: CopyTargetBuckets::new(),
            next_id: 0,
        };
        pass.visit(tree);

        debug!(collected = pass.buckets.total(), "copy targets collected");
        document.data_mut().copy_targets = Some(pass.buckets);
    }
}

struct CollectPass<'a> {
    definitions: &'a [CopyTargetDefinition],
    resolver: OffsetResolver,
    buckets: CopyTargetBuckets,
    next_id: u64,
}

impl CollectPass<'_> {
    fn visit(&mut self, node: &MdNode) {
        self.record(node);
        for child in &node.children {
            self.visit(child);
        }
    }

    /// Record `node` under its first matching definition.
    fn record(&mut self, node: &MdNode) {
        let Some(definition) = self.definitions.iter().find(|d| (d.source_test)(node)) else {
            return;
        };

        let position = node.position.as_ref();
        let start = self.resolver.resolve(position.and_then(|p| p.start.as_ref()));
        let end = self.resolver.resolve(position.and_then(|p| p.end.as_ref()));
        let (Some(start), Some(end)) = (start, end) else {
            trace!(kind = node.kind.name(), "unresolvable position, node skipped");
            return;
        };

        self.next_id += 1;
        self.buckets.push(CopyTargetMeta {
            id: CopyTargetId(self.next_id),
            target_type: definition.target_type,
            mode: definition.mode,
            start,
            end,
        });
    }
}
