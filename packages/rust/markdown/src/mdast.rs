//! Source-level content tree (markdown AST) and the comrak front end.
//!
//! The tree mirrors the mdast contract: typed nodes in document order with
//! optional `line`/`column`/`offset` positions. Positions are kept as raw
//! signed values because external producers may hand out out-of-range points;
//! resolution and clamping happen in the collector. Columns count characters,
//! not bytes.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, parse_document};
use tracing::{debug, instrument};

use copymark_shared::RenderConfig;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One point in the source document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    /// 1-based line.
    pub line: Option<i64>,
    /// 1-based column.
    pub column: Option<i64>,
    /// 0-based absolute offset, takes precedence over line/column.
    pub offset: Option<i64>,
}

impl Point {
    /// A point known only by line and column.
    pub fn line_column(line: i64, column: i64) -> Self {
        Self {
            line: Some(line),
            column: Some(column),
            offset: None,
        }
    }

    /// A point known by absolute offset.
    pub fn offset(offset: i64) -> Self {
        Self {
            line: None,
            column: None,
            offset: Some(offset),
        }
    }
}

/// Start/end span of a node. End is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub start: Option<Point>,
    pub end: Option<Point>,
}

impl Position {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Node kinds of the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdNodeKind {
    Root,
    Paragraph,
    Heading(u8),
    BlockQuote,
    List,
    ListItem,
    /// Fenced or indented code block.
    Code,
    Table,
    TableRow,
    TableCell,
    /// Display math.
    Math,
    InlineMath,
    InlineCode,
    Text,
    Emphasis,
    Strong,
    Link,
    Image,
    Html,
    Break,
    ThematicBreak,
    /// Any other construct, by its producer's type name.
    Other(String),
}

impl MdNodeKind {
    /// The mdast type name of this kind (`code`, `inlineMath`, ...).
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "root",
            Self::Paragraph => "paragraph",
            Self::Heading(_) => "heading",
            Self::BlockQuote => "blockquote",
            Self::List => "list",
            Self::ListItem => "listItem",
            Self::Code => "code",
            Self::Table => "table",
            Self::TableRow => "tableRow",
            Self::TableCell => "tableCell",
            Self::Math => "math",
            Self::InlineMath => "inlineMath",
            Self::InlineCode => "inlineCode",
            Self::Text => "text",
            Self::Emphasis => "emphasis",
            Self::Strong => "strong",
            Self::Link => "link",
            Self::Image => "image",
            Self::Html => "html",
            Self::Break => "break",
            Self::ThematicBreak => "thematicBreak",
            Self::Other(name) => name,
        }
    }
}

/// A node of the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdNode {
    pub kind: MdNodeKind,
    pub position: Option<Position>,
    pub children: Vec<MdNode>,
}

impl MdNode {
    /// A childless node without position.
    pub fn new(kind: MdNodeKind) -> Self {
        Self {
            kind,
            position: None,
            children: Vec::new(),
        }
    }

    /// A root node holding `children`.
    pub fn root(children: Vec<MdNode>) -> Self {
        Self {
            kind: MdNodeKind::Root,
            position: None,
            children,
        }
    }

    /// Builder-style position setter.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Builder-style children setter.
    pub fn with_children(mut self, children: Vec<MdNode>) -> Self {
        self.children = children;
        self
    }

    /// Pre-order, document-order iterator over this node and its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Iterator returned by [`MdNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a MdNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a MdNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// ---------------------------------------------------------------------------
// comrak front end
// ---------------------------------------------------------------------------

/// Comrak options shared by parsing and HTML rendering.
pub(crate) fn comrak_options(config: &RenderConfig) -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = config.tables;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.math_dollars = config.math;
    options.render.unsafe_ = config.unsafe_html;
    options
}

/// Parse markdown into a source tree with line/column positions.
#[instrument(skip_all, fields(len = text.len()))]
pub fn parse_markdown(text: &str, config: &RenderConfig) -> MdNode {
    let arena = Arena::new();
    let options = comrak_options(config);
    let root = parse_document(&arena, text, &options);

    let lines = LineIndex::new(text);
    let tree = convert_node(root, &lines);
    debug!(nodes = tree.descendants().count(), "markdown parsed");
    tree
}

fn convert_node<'a>(node: &'a AstNode<'a>, lines: &LineIndex<'_>) -> MdNode {
    let data = node.data.borrow();
    let kind = kind_of(&data.value);
    let delimiter = delimiter_width(&data.value);

    let pos = data.sourcepos;
    // comrak reports zeroed positions for nodes it could not place.
    let position = (pos.start.line > 0).then(|| {
        let start_column = pos.start.column.saturating_sub(delimiter);
        // comrak's end column is inclusive
        let end_column = pos.end.column + 1 + delimiter;
        Position::new(
            Point::line_column(
                pos.start.line as i64,
                lines.char_column(pos.start.line, start_column),
            ),
            Point::line_column(
                pos.end.line as i64,
                lines.char_column(pos.end.line, end_column),
            ),
        )
    });
    drop(data);

    MdNode {
        kind,
        position,
        children: node.children().map(|child| convert_node(child, lines)).collect(),
    }
}

/// Width of the fence around a code or math span.
///
/// comrak positions these spans on their content only; the source tree covers
/// the backticks and dollars as well.
fn delimiter_width(value: &NodeValue) -> usize {
    match value {
        NodeValue::Code(code) => code.num_backticks,
        NodeValue::Math(math) if math.dollar_math && !math.display_math => 1,
        NodeValue::Math(_) => 2,
        _ => 0,
    }
}

/// Line starts of the parsed text, for turning comrak's byte columns into
/// character columns.
struct LineIndex<'t> {
    text: &'t str,
    starts: Vec<usize>,
}

impl<'t> LineIndex<'t> {
    fn new(text: &'t str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, starts }
    }

    /// 1-based character column of a 1-based byte column on `line`.
    fn char_column(&self, line: usize, byte_column: usize) -> i64 {
        let Some(&start) = self.starts.get(line.saturating_sub(1)) else {
            return byte_column as i64;
        };
        let rest = &self.text[start..];
        let width = byte_column.saturating_sub(1);
        let chars = rest.char_indices().take_while(|(i, _)| *i < width).count();
        // past the end of the text every byte counts as one column
        let overflow = width.saturating_sub(rest.len());
        (chars + overflow + 1) as i64
    }
}

fn kind_of(value: &NodeValue) -> MdNodeKind {
    match value {
        NodeValue::Document => MdNodeKind::Root,
        NodeValue::Paragraph => MdNodeKind::Paragraph,
        NodeValue::Heading(heading) => MdNodeKind::Heading(heading.level),
        NodeValue::BlockQuote => MdNodeKind::BlockQuote,
        NodeValue::List(_) => MdNodeKind::List,
        NodeValue::Item(_) => MdNodeKind::ListItem,
        NodeValue::CodeBlock(_) => MdNodeKind::Code,
        NodeValue::Table(_) => MdNodeKind::Table,
        NodeValue::TableRow(_) => MdNodeKind::TableRow,
        NodeValue::TableCell => MdNodeKind::TableCell,
        NodeValue::Math(math) if math.display_math => MdNodeKind::Math,
        NodeValue::Math(_) => MdNodeKind::InlineMath,
        NodeValue::Code(_) => MdNodeKind::InlineCode,
        NodeValue::Text(_) => MdNodeKind::Text,
        NodeValue::Emph => MdNodeKind::Emphasis,
        NodeValue::Strong => MdNodeKind::Strong,
        NodeValue::Link(_) => MdNodeKind::Link,
        NodeValue::Image(_) => MdNodeKind::Image,
        NodeValue::HtmlBlock(_) | NodeValue::HtmlInline(_) => MdNodeKind::Html,
        NodeValue::SoftBreak | NodeValue::LineBreak => MdNodeKind::Break,
        NodeValue::ThematicBreak => MdNodeKind::ThematicBreak,
        other => MdNodeKind::Other(variant_name(other)),
    }
}

/// camelCase name of a comrak node variant (`FootnoteReference` becomes
/// `footnoteReference`).
fn variant_name(value: &NodeValue) -> String {
    let debug = format!("{value:?}");
    let variant = debug.split(['(', ' ', '{']).next().unwrap_or_default();
    let mut chars = variant.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
