//! Render-level element tree (HTML AST).
//!
//! A small owned tree in the shape of hast: a root, elements with an ordered
//! property map, text and comments. Attribute names are stored as they appear
//! in HTML (`class`, `aria-label`, `data-copy-id`).

use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Value of one element property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    /// `true` serializes as a bare attribute, `false` is omitted.
    Boolean(bool),
    /// Space-separated token list (`class`).
    List(Vec<String>),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Element properties, keyed by attribute name.
pub type Properties = BTreeMap<String, PropertyValue>;

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag_name: String,
    pub properties: Properties,
    pub children: Vec<HastNode>,
}

/// Any node below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HastNode {
    Element(Element),
    Text(String),
    Comment(String),
}

/// The render tree root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HastRoot {
    pub children: Vec<HastNode>,
}

/// Read-only view of an element's parent, handed to render predicates.
#[derive(Debug, Clone, Copy)]
pub enum ParentRef<'a> {
    Root,
    Element {
        tag_name: &'a str,
        properties: &'a Properties,
    },
}

impl ParentRef<'_> {
    /// Tag name of the parent element, `None` for the root.
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Element { tag_name, .. } => Some(*tag_name),
        }
    }

    /// Class list of the parent element, empty for the root.
    pub fn class_list(&self) -> Vec<String> {
        match self {
            Self::Root => Vec::new(),
            Self::Element { properties, .. } => class_list_of(properties),
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Element {
    /// A childless element without properties.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    /// Builder-style class list setter (list form).
    pub fn with_classes<'a>(mut self, classes: impl IntoIterator<Item = &'a str>) -> Self {
        let list = classes.into_iter().map(str::to_string).collect::<Vec<_>>();
        self.properties.insert("class".to_string(), PropertyValue::List(list));
        self
    }

    /// Builder-style child appender.
    pub fn with_child(mut self, child: impl Into<HastNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Set or replace a property.
    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.properties.insert(name.to_string(), value.into());
    }

    /// Property value as text. `None` for booleans and missing properties.
    pub fn property_text(&self, name: &str) -> Option<String> {
        match self.properties.get(name)? {
            PropertyValue::Text(text) => Some(text.clone()),
            PropertyValue::Integer(n) => Some(n.to_string()),
            PropertyValue::List(items) => Some(items.join(" ")),
            PropertyValue::Boolean(_) => None,
        }
    }

    /// The element's classes, whatever form the `class` property is in.
    pub fn class_list(&self) -> Vec<String> {
        class_list_of(&self.properties)
    }

    /// `true` if the element carries `class_name`.
    pub fn has_class(&self, class_name: &str) -> bool {
        self.class_list().iter().any(|c| c == class_name)
    }

    /// Add a class once, normalizing the `class` property to list form.
    pub fn add_class(&mut self, class_name: &str) {
        let mut classes = match self.properties.remove("class") {
            Some(PropertyValue::List(list)) => list,
            Some(PropertyValue::Text(text)) => split_classes(&text),
            _ => Vec::new(),
        };
        if !classes.iter().any(|c| c == class_name) {
            classes.push(class_name.to_string());
        }
        self.properties
            .insert("class".to_string(), PropertyValue::List(classes));
    }

    /// Child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(HastNode::as_element)
    }
}

impl From<Element> for HastNode {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl HastNode {
    /// A text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl HastRoot {
    pub fn new(children: Vec<HastNode>) -> Self {
        Self { children }
    }

    /// All elements in document order (pre-order).
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(&self.children, &mut out);
        out
    }

    /// First element (document order) with the given tag.
    pub fn find_tag(&self, tag_name: &str) -> Option<&Element> {
        self.elements().into_iter().find(|el| el.tag_name == tag_name)
    }
}

fn collect_elements<'a>(nodes: &'a [HastNode], out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let HastNode::Element(element) = node {
            out.push(element);
            collect_elements(&element.children, out);
        }
    }
}

// ---------------------------------------------------------------------------
// Class helpers
// ---------------------------------------------------------------------------

fn class_list_of(properties: &Properties) -> Vec<String> {
    match properties.get("class") {
        Some(PropertyValue::List(list)) => list.clone(),
        Some(PropertyValue::Text(text)) => split_classes(text),
        _ => Vec::new(),
    }
}

fn split_classes(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_class_normalizes_string_form() {
        let mut el = Element::new("pre").with_property("class", "  shiki   dark ");
        el.add_class("markdown-copy-code");
        assert_eq!(
            el.properties.get("class"),
            Some(&PropertyValue::List(vec![
                "shiki".into(),
                "dark".into(),
                "markdown-copy-code".into()
            ]))
        );
    }

    #[test]
    fn add_class_is_idempotent() {
        let mut el = Element::new("code").with_classes(["a"]);
        el.add_class("b");
        el.add_class("a");
        el.add_class("b");
        assert_eq!(el.class_list(), ["a", "b"]);

        let mut from_text = Element::new("code").with_property("class", "a b");
        from_text.add_class("a");
        assert_eq!(from_text.class_list(), ["a", "b"]);
        assert!(matches!(from_text.properties["class"], PropertyValue::List(_)));
    }

    #[test]
    fn add_class_creates_missing_property() {
        let mut el = Element::new("span");
        el.add_class("katex");
        assert!(el.has_class("katex"));
    }

    #[test]
    fn parent_ref_reports_classes() {
        let props = Properties::from([(
            "class".to_string(),
            PropertyValue::Text("katex-display".into()),
        )]);
        let parent = ParentRef::Element {
            tag_name: "span",
            properties: &props,
        };
        assert_eq!(parent.tag_name(), Some("span"));
        assert_eq!(parent.class_list(), ["katex-display"]);
        assert!(ParentRef::Root.class_list().is_empty());
    }

    #[test]
    fn elements_are_preorder() {
        let root = HastRoot::new(vec![
            Element::new("p")
                .with_child(Element::new("code"))
                .with_child(HastNode::text("x"))
                .into(),
            Element::new("pre").into(),
        ]);
        let tags: Vec<&str> = root.elements().iter().map(|e| e.tag_name.as_str()).collect();
        assert_eq!(tags, ["p", "code", "pre"]);
        assert!(root.find_tag("pre").is_some());
    }
}
