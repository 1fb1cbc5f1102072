//! Markdown and HTML trees for copy-target annotation.
//!
//! Provides the two tree shapes the annotation stages walk, and the adapters
//! that produce them from a markdown document:
//! - [`MdNode`]: the source-level content tree, parsed with `comrak`
//! - [`HastRoot`]: the render-level element tree, parsed from comrak's HTML
//!   with `scraper` and serialized back with [`to_html`]

pub mod hast;
pub mod html;
pub mod mdast;

pub use hast::{Element, HastNode, HastRoot, ParentRef, Properties, PropertyValue};
pub use html::{normalize_math_markup, parse_html_fragment, render_html, to_html};
pub use mdast::{MdNode, MdNodeKind, Point, Position, parse_markdown};
