//! Decorators and the markup they inject.
//!
//! Block decorators swap the matched element for a container that still holds
//! it; inline decorators only add attributes. Every decorator is best-effort:
//! when the structure it needs is missing it leaves the tree untouched.

use tracing::trace;

use copymark_markdown::{Element, HastNode};
use copymark_shared::CopyTargetMeta;

use crate::definitions::CopyTargetDefinition;

// ---------------------------------------------------------------------------
// Decoration context
// ---------------------------------------------------------------------------

/// Where the matched element lives.
///
/// An attached element sits at `index` in its parent's children and can be
/// replaced. A detached element can only be mutated in place.
pub struct DecorateContext<'a> {
    slot: Slot<'a>,
}

enum Slot<'a> {
    Attached {
        siblings: &'a mut Vec<HastNode>,
        index: usize,
    },
    Detached(&'a mut Element),
}

impl<'a> DecorateContext<'a> {
    /// Context for the element at `siblings[index]`.
    pub fn attached(siblings: &'a mut Vec<HastNode>, index: usize) -> Self {
        Self {
            slot: Slot::Attached { siblings, index },
        }
    }

    /// Context for an element with no known parent.
    pub fn detached(element: &'a mut Element) -> Self {
        Self {
            slot: Slot::Detached(element),
        }
    }

    /// The matched element.
    pub fn element_mut(&mut self) -> Option<&mut Element> {
        match &mut self.slot {
            Slot::Attached { siblings, index } => siblings.get_mut(*index)?.as_element_mut(),
            Slot::Detached(element) => Some(&mut **element),
        }
    }

    /// Replace the element in its parent with `build(element)`.
    ///
    /// Returns `false`, leaving everything untouched, when the element is
    /// detached or the slot does not hold an element.
    pub fn replace_with(&mut self, build: impl FnOnce(Element) -> Element) -> bool {
        let Slot::Attached { siblings, index } = &mut self.slot else {
            return false;
        };
        let Some(slot) = siblings.get_mut(*index) else {
            return false;
        };

        match std::mem::replace(slot, HastNode::Text(String::new())) {
            HastNode::Element(original) => {
                *slot = HastNode::Element(build(original));
                true
            }
            other => {
                *slot = other;
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Per-category decorators
// ---------------------------------------------------------------------------

/// Tag the `pre` container and prepend a copy button.
pub fn code_block(
    definition: &CopyTargetDefinition,
    meta: &CopyTargetMeta,
    context: &mut DecorateContext<'_>,
) {
    let Some(element) = context.element_mut() else {
        return;
    };

    element.add_class("markdown-copy-target");
    element.add_class("markdown-copy-target--code");
    ensure_dataset(element, meta);
    element.add_class("markdown-copy-has-control");
    element.add_class("markdown-copy-code");

    let button = copy_button(meta, &definition.aria_label);
    element.children.insert(0, button.into());
}

/// Wrap the table in a container with a header row.
pub fn table(
    definition: &CopyTargetDefinition,
    meta: &CopyTargetMeta,
    context: &mut DecorateContext<'_>,
) {
    let replaced = context.replace_with(|table| {
        let wrapper = Element::new("div")
            .with_classes(["markdown-copy-table-wrapper"])
            .with_child(table);

        block_container(meta, "table")
            .with_child(copy_header(meta, &definition.aria_label))
            .with_child(wrapper)
    });

    if !replaced {
        trace!(id = %meta.id, "table has no parent slot, left undecorated");
    }
}

/// Wrap display math in a container with a header row.
pub fn math_block(
    definition: &CopyTargetDefinition,
    meta: &CopyTargetMeta,
    context: &mut DecorateContext<'_>,
) {
    let replaced = context.replace_with(|math| {
        let body = Element::new("div")
            .with_classes(["markdown-copy-math-body"])
            .with_child(math);

        block_container(meta, "math")
            .with_child(copy_header(meta, &definition.aria_label))
            .with_child(body)
    });

    if !replaced {
        trace!(id = %meta.id, "math block has no parent slot, left undecorated");
    }
}

/// Make inline math focusable and clickable.
pub fn inline_math(
    definition: &CopyTargetDefinition,
    meta: &CopyTargetMeta,
    context: &mut DecorateContext<'_>,
) {
    let Some(element) = context.element_mut() else {
        return;
    };

    element.add_class("markdown-copy-inline");
    mark_inline(element, definition, meta);
}

/// Make an inline code span focusable and clickable.
pub fn inline_code(
    definition: &CopyTargetDefinition,
    meta: &CopyTargetMeta,
    context: &mut DecorateContext<'_>,
) {
    let Some(element) = context.element_mut() else {
        return;
    };

    element.add_class("markdown-copy-inline");
    element.add_class("markdown-copy-inline-code");
    mark_inline(element, definition, meta);
}

// ---------------------------------------------------------------------------
// Markup helpers
// ---------------------------------------------------------------------------

/// Set the `data-copy-*` attributes carrying the target metadata.
pub fn ensure_dataset(element: &mut Element, meta: &CopyTargetMeta) {
    for (name, value) in dataset(meta) {
        element.set_property(name, value);
    }
}

fn dataset(meta: &CopyTargetMeta) -> [(&'static str, String); 4] {
    [
        ("data-copy-id", meta.id.to_string()),
        ("data-copy-type", meta.target_type.to_string()),
        ("data-copy-start", meta.start.to_string()),
        ("data-copy-end", meta.end.to_string()),
    ]
}

fn mark_inline(element: &mut Element, definition: &CopyTargetDefinition, meta: &CopyTargetMeta) {
    ensure_dataset(element, meta);
    element.set_property("data-copy-role", "inline");
    if let Some(hint) = &definition.hint {
        element.set_property("data-copy-hint", hint.as_str());
    }
    element.set_property("tabindex", 0_i64);
    element.set_property("role", "button");
    element.set_property("aria-label", definition.aria_label.as_str());
}

fn block_container(meta: &CopyTargetMeta, variant: &str) -> Element {
    let variant_class = format!("markdown-copy-container--{variant}");
    let mut container = Element::new("div")
        .with_classes(["markdown-copy-container", variant_class.as_str()]);
    ensure_dataset(&mut container, meta);
    container
}

fn copy_header(meta: &CopyTargetMeta, aria_label: &str) -> Element {
    Element::new("div")
        .with_classes(["markdown-copy-header"])
        .with_child(copy_button(meta, aria_label))
}

/// The trigger control: a button holding the idle and success icons.
pub fn copy_button(meta: &CopyTargetMeta, aria_label: &str) -> Element {
    let mut button = Element::new("button")
        .with_property("type", "button")
        .with_classes(["markdown-copy-button"])
        .with_property("aria-label", aria_label)
        .with_property("data-copy-role", "trigger");
    ensure_dataset(&mut button, meta);

    button
        .with_child(icon(IconVariant::Copy))
        .with_child(icon(IconVariant::Success))
}

#[derive(Debug, Clone, Copy)]
enum IconVariant {
    Copy,
    Success,
}

fn icon(variant: IconVariant) -> Element {
    let variant_class = match variant {
        IconVariant::Copy => "markdown-copy-icon--copy",
        IconVariant::Success => "markdown-copy-icon--success",
    };

    let svg = Element::new("svg")
        .with_classes(["markdown-copy-icon", variant_class])
        .with_property("width", 16_i64)
        .with_property("height", 16_i64)
        .with_property("viewBox", "0 0 24 24")
        .with_property("fill", "none")
        .with_property("stroke", "currentColor")
        .with_property("stroke-width", 2_i64)
        .with_property("stroke-linecap", "round")
        .with_property("stroke-linejoin", "round")
        .with_property("aria-hidden", "true");

    match variant {
        IconVariant::Copy => svg
            .with_child(Element::new("path").with_property("d", "M16 16H8a2 2 0 0 1-2-2V6"))
            .with_child(
                Element::new("rect")
                    .with_property("x", 8_i64)
                    .with_property("y", 2_i64)
                    .with_property("width", 12_i64)
                    .with_property("height", 12_i64)
                    .with_property("rx", 2_i64)
                    .with_property("ry", 2_i64),
            ),
        IconVariant::Success => {
            svg.with_child(Element::new("polyline").with_property("points", "20 6 9 17 4 12"))
        }
    }
}
