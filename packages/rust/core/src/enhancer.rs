//! Render-tree pass: decorates matched elements with copy affordances.

use tracing::{debug, instrument, trace};

use copymark_markdown::{Element, HastNode, HastRoot, ParentRef};
use copymark_shared::{CopyTargetBuckets, CopyTargetMode};

use crate::decorate::DecorateContext;
use crate::definitions::{CopyPluginConfig, CopyTargetDefinition};
use crate::document::DocumentContext;

/// Walks a render tree and applies the buckets left by the collector.
#[derive(Debug, Clone)]
pub struct CopyEnhancer {
    definitions: Vec<CopyTargetDefinition>,
}

impl CopyEnhancer {
    pub fn new(config: &CopyPluginConfig) -> Self {
        Self {
            definitions: config.resolve(),
        }
    }

    /// Decorate `tree` in place from `document`'s buckets.
    ///
    /// The buckets are consumed: a second run on the same document is a
    /// no-op. Returns the number of elements decorated.
    #[instrument(skip_all)]
    pub fn run(&self, tree: &mut HastRoot, document: &mut DocumentContext) -> usize {
        let Some(mut buckets) = document.data_mut().copy_targets.take() else {
            debug!("no copy targets collected, enhancement skipped");
            return 0;
        };

        let mut decorated = 0;
        self.walk(&mut tree.children, ParentRef::Root, &mut buckets, &mut decorated);

        debug!(decorated, unused = buckets.total(), "copy targets applied");
        decorated
    }

    fn walk(
        &self,
        siblings: &mut Vec<HastNode>,
        parent: ParentRef<'_>,
        buckets: &mut CopyTargetBuckets,
        decorated: &mut usize,
    ) {
        let mut index = 0;
        while index < siblings.len() {
            let HastNode::Element(element) = &siblings[index] else {
                index += 1;
                continue;
            };

            let mut descend = true;
            if let Some(definition) = self.match_element(element, parent) {
                match buckets.pop_front(definition.target_type) {
                    Some(meta) => {
                        let mut context = DecorateContext::attached(siblings, index);
                        (definition.decorate)(definition, &meta, &mut context);
                        *decorated += 1;
                        descend = definition.mode == CopyTargetMode::Inline;
                    }
                    None => trace!(
                        target_type = %definition.target_type,
                        "queue exhausted, element left undecorated"
                    ),
                }
            }

            if descend {
                if let Some(Element {
                    tag_name,
                    properties,
                    children,
                }) = siblings[index].as_element_mut()
                {
                    let parent = ParentRef::Element {
                        tag_name: tag_name.as_str(),
                        properties,
                    };
                    self.walk(children, parent, buckets, decorated);
                }
            }
            index += 1;
        }
    }

    /// First definition whose render predicate accepts `element`.
    fn match_element(&self, element: &Element, parent: ParentRef<'_>) -> Option<&CopyTargetDefinition> {
        self.definitions
            .iter()
            .find(|d| (d.render_match)(element, parent))
    }
}
