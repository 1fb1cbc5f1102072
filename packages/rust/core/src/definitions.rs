//! Category definition table.
//!
//! Each [`CopyTargetDefinition`] pairs a source-tree predicate with a
//! render-tree predicate and a decorator, all as plain function pointers.
//! Both pipeline stages try definitions in list order and stop at the first
//! match, so the Nth source match of a category lines up with its Nth render
//! match.

use copymark_markdown::{Element, MdNode, MdNodeKind, ParentRef};
use copymark_shared::{CopyTargetMeta, CopyTargetMode, CopyTargetType, TargetsConfig};

use crate::decorate::{self, DecorateContext};

/// Tests a source-tree node.
pub type SourceTest = fn(&MdNode) -> bool;

/// Tests a render-tree element given its parent.
pub type RenderMatch = fn(&Element, ParentRef<'_>) -> bool;

/// Mutates a matched render-tree element.
pub type Decorator = fn(&CopyTargetDefinition, &CopyTargetMeta, &mut DecorateContext<'_>);

/// One annotatable construct.
#[derive(Debug, Clone)]
pub struct CopyTargetDefinition {
    pub target_type: CopyTargetType,
    pub mode: CopyTargetMode,
    /// Accessible label of the copy control (or of the inline target itself).
    pub aria_label: String,
    /// Hint text for inline targets.
    pub hint: Option<String>,
    /// Whether decoration injects a visible trigger button.
    pub has_visible_control: bool,
    pub source_test: SourceTest,
    pub render_match: RenderMatch,
    pub decorate: Decorator,
}

impl CopyTargetDefinition {
    /// The built-in definition for a target type.
    pub fn builtin(target_type: CopyTargetType) -> Self {
        match target_type {
            CopyTargetType::Code => Self {
                target_type,
                mode: CopyTargetMode::Block,
                aria_label: "Copy code block".into(),
                hint: None,
                has_visible_control: true,
                source_test: is_code_node,
                render_match: is_code_block_element,
                decorate: decorate::code_block,
            },
            CopyTargetType::Table => Self {
                target_type,
                mode: CopyTargetMode::Block,
                aria_label: "Copy table".into(),
                hint: None,
                has_visible_control: true,
                source_test: is_table_node,
                render_match: is_table_element,
                decorate: decorate::table,
            },
            CopyTargetType::MathBlock => Self {
                target_type,
                mode: CopyTargetMode::Block,
                aria_label: "Copy math block".into(),
                hint: None,
                has_visible_control: true,
                source_test: is_math_node,
                render_match: is_display_math_element,
                decorate: decorate::math_block,
            },
            CopyTargetType::MathInline => Self {
                target_type,
                mode: CopyTargetMode::Inline,
                aria_label: "Copy inline math".into(),
                hint: Some(DEFAULT_INLINE_HINT.into()),
                has_visible_control: false,
                source_test: is_inline_math_node,
                render_match: is_inline_math_element,
                decorate: decorate::inline_math,
            },
            CopyTargetType::CodeInline => Self {
                target_type,
                mode: CopyTargetMode::Inline,
                aria_label: "Copy inline code".into(),
                hint: Some(DEFAULT_INLINE_HINT.into()),
                has_visible_control: false,
                source_test: is_inline_code_node,
                render_match: is_inline_code_element,
                decorate: decorate::inline_code,
            },
        }
    }
}

const DEFAULT_INLINE_HINT: &str = "click to copy";

/// The five built-in definitions, in matching order.
pub fn default_definitions() -> Vec<CopyTargetDefinition> {
    CopyTargetType::ALL
        .into_iter()
        .map(CopyTargetDefinition::builtin)
        .collect()
}

// ---------------------------------------------------------------------------
// Plugin config
// ---------------------------------------------------------------------------

/// Options accepted by both pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct CopyPluginConfig {
    /// Replacement definition list; `None` uses [`default_definitions`].
    pub definitions: Option<Vec<CopyTargetDefinition>>,
}

impl CopyPluginConfig {
    /// Use exactly these definitions.
    pub fn with_definitions(definitions: Vec<CopyTargetDefinition>) -> Self {
        Self {
            definitions: Some(definitions),
        }
    }

    /// Build a definition list from the `[targets]` config section.
    ///
    /// Built-in order is kept; disabled types are dropped and label/hint
    /// overrides replace the defaults.
    pub fn from_targets(targets: &TargetsConfig) -> Self {
        let definitions = CopyTargetType::ALL
            .into_iter()
            .filter(|ty| targets.get(*ty).enabled)
            .map(|ty| {
                let settings = targets.get(ty);
                let mut definition = CopyTargetDefinition::builtin(ty);
                if let Some(label) = &settings.aria_label {
                    definition.aria_label = label.clone();
                }
                if let Some(hint) = &settings.hint {
                    definition.hint = Some(hint.clone());
                }
                definition
            })
            .collect();
        Self::with_definitions(definitions)
    }

    /// The definitions the stages will actually use.
    pub fn resolve(&self) -> Vec<CopyTargetDefinition> {
        self.definitions
            .clone()
            .unwrap_or_else(default_definitions)
    }
}

// ---------------------------------------------------------------------------
// Source predicates
// ---------------------------------------------------------------------------

fn is_code_node(node: &MdNode) -> bool {
    node.kind == MdNodeKind::Code
}

fn is_table_node(node: &MdNode) -> bool {
    node.kind == MdNodeKind::Table
}

fn is_math_node(node: &MdNode) -> bool {
    node.kind == MdNodeKind::Math
}

fn is_inline_math_node(node: &MdNode) -> bool {
    node.kind == MdNodeKind::InlineMath
}

fn is_inline_code_node(node: &MdNode) -> bool {
    node.kind == MdNodeKind::InlineCode
}

// ---------------------------------------------------------------------------
// Render predicates
// ---------------------------------------------------------------------------

fn is_code_block_element(element: &Element, _parent: ParentRef<'_>) -> bool {
    element.tag_name == "pre"
}

fn is_table_element(element: &Element, _parent: ParentRef<'_>) -> bool {
    element.tag_name == "table"
}

fn is_display_math_element(element: &Element, _parent: ParentRef<'_>) -> bool {
    element.tag_name == "span" && element.has_class("katex-display")
}

/// KaTeX nests a `span.katex` inside every `span.katex-display`; only the
/// free-standing ones are inline math.
fn is_inline_math_element(element: &Element, parent: ParentRef<'_>) -> bool {
    if element.tag_name != "span" {
        return false;
    }

    let classes = element.class_list();
    if !classes.iter().any(|c| c == "katex") || classes.iter().any(|c| c == "katex-display") {
        return false;
    }

    !parent.class_list().iter().any(|c| c == "katex-display")
}

fn is_inline_code_element(element: &Element, parent: ParentRef<'_>) -> bool {
    element.tag_name == "code" && parent.tag_name() != Some("pre")
}
