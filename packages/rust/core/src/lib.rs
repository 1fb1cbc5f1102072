//! Copy-target annotation for rendered markdown.
//!
//! A [`CopyCollector`] walks the source tree and queues one
//! [`CopyTargetMeta`](copymark_shared::CopyTargetMeta) per annotatable
//! construct. A [`CopyEnhancer`] then walks the HTML render tree and pairs
//! each matching element with the head of its category's queue, injecting
//! copy controls and `data-copy-*` attributes. [`CopyPipeline`] runs both
//! passes around the comrak front end.

pub mod collector;
pub mod decorate;
pub mod definitions;
pub mod document;
pub mod enhancer;
pub mod offsets;
pub mod pipeline;

pub use collector::CopyCollector;
pub use decorate::DecorateContext;
pub use definitions::{
    CopyPluginConfig, CopyTargetDefinition, Decorator, RenderMatch, SourceTest,
    default_definitions,
};
pub use document::{DocumentContext, DocumentData};
pub use enhancer::CopyEnhancer;
pub use offsets::OffsetResolver;
pub use pipeline::{AnnotatedDocument, CopyPipeline};
