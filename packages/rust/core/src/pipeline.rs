//! End-to-end annotation: markdown → source tree → HTML → decorated HTML.

use tracing::{info, instrument};

use copymark_markdown::{normalize_math_markup, parse_html_fragment, parse_markdown, render_html, to_html};
use copymark_shared::{AppConfig, CopyTargetBuckets, CopyTargetMeta, RenderConfig, Result};

use crate::collector::CopyCollector;
use crate::definitions::CopyPluginConfig;
use crate::document::DocumentContext;
use crate::enhancer::CopyEnhancer;

/// Output of [`CopyPipeline::annotate`].
#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    /// Decorated HTML fragment.
    pub html: String,
    /// Every collected target, ordered by id.
    pub targets: Vec<CopyTargetMeta>,
    /// Number of render elements that received a decoration.
    pub decorated: usize,
}

/// Collector and enhancer wired around the comrak front end.
#[derive(Debug, Clone)]
pub struct CopyPipeline {
    render: RenderConfig,
    collector: CopyCollector,
    enhancer: CopyEnhancer,
}

impl CopyPipeline {
    pub fn new(render: RenderConfig, plugin: CopyPluginConfig) -> Self {
        Self {
            render,
            collector: CopyCollector::new(&plugin),
            enhancer: CopyEnhancer::new(&plugin),
        }
    }

    /// Build a pipeline from the loaded application config.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            config.render.clone(),
            CopyPluginConfig::from_targets(&config.targets),
        )
    }

    /// Run both passes over one markdown document.
    ///
    /// 1. Parse the source tree and collect targets
    /// 2. Render HTML and parse it into a render tree
    /// 3. Decorate the render tree and serialize it
    #[instrument(skip_all, fields(len = markdown.len()))]
    pub fn annotate(&self, markdown: &str) -> Result<AnnotatedDocument> {
        let mut document = DocumentContext::new(markdown);

        let source = parse_markdown(markdown, &self.render);
        self.collector.run(&source, &mut document);
        let targets = document
            .copy_targets()
            .map(CopyTargetBuckets::to_sorted_vec)
            .unwrap_or_default();

        let rendered = render_html(markdown, &self.render)?;
        let mut tree = parse_html_fragment(&rendered);
        if self.render.math {
            normalize_math_markup(&mut tree);
        }
        let decorated = self.enhancer.run(&mut tree, &mut document);

        info!(targets = targets.len(), decorated, "document annotated");
        Ok(AnnotatedDocument {
            html: to_html(&tree),
            targets,
            decorated,
        })
    }

    /// Run only the source pass and return the buckets.
    pub fn collect(&self, markdown: &str) -> CopyTargetBuckets {
        let mut document = DocumentContext::new(markdown);
        let source = parse_markdown(markdown, &self.render);
        self.collector.run(&source, &mut document);
        document.data_mut().copy_targets.take().unwrap_or_default()
    }
}

impl Default for CopyPipeline {
    fn default() -> Self {
        Self::new(RenderConfig::default(), CopyPluginConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use copymark_shared::{CopyTargetId, CopyTargetType, TargetConfig};

    use super::*;

    const SAMPLE: &str = "Intro `x`.\n\n```rust\nfn main() {}\n```\n\n| a | b |\n|---|---|\n| `c` | 2 |\n";

    /// Characters `meta` covers in `text`.
    fn covered(text: &str, meta: &CopyTargetMeta) -> String {
        text.chars().skip(meta.start).take(meta.end - meta.start).collect()
    }

    #[test]
    fn annotates_code_and_tables() {
        let doc = CopyPipeline::default().annotate(SAMPLE).unwrap();

        let types: Vec<CopyTargetType> = doc.targets.iter().map(|m| m.target_type).collect();
        assert_eq!(
            types,
            [
                CopyTargetType::CodeInline,
                CopyTargetType::Code,
                CopyTargetType::Table,
                CopyTargetType::CodeInline,
            ]
        );
        assert_eq!(doc.decorated, 3);

        assert!(doc.html.contains(r#"data-copy-id="copy-target-1""#));
        assert!(doc.html.contains("markdown-copy-button"));
        assert!(doc.html.contains("markdown-copy-container--table"));
        assert!(doc.html.contains("markdown-copy-inline-code"));
    }

    #[test]
    fn offsets_slice_the_source() {
        let doc = CopyPipeline::default().annotate(SAMPLE).unwrap();

        assert_eq!(covered(SAMPLE, &doc.targets[0]), "`x`");
        assert_eq!(covered(SAMPLE, &doc.targets[1]), "```rust\nfn main() {}\n```");
        assert_eq!(covered(SAMPLE, &doc.targets[3]), "`c`");
    }

    #[test]
    fn offsets_count_characters() {
        let text = "`é` and `x`\n";
        let doc = CopyPipeline::default().annotate(text).unwrap();

        let spans: Vec<(usize, usize)> = doc.targets.iter().map(|m| (m.start, m.end)).collect();
        assert_eq!(spans, [(0, 3), (8, 11)]);
        assert_eq!(covered(text, &doc.targets[0]), "`é`");
    }

    #[test]
    fn code_inside_tables_is_collected_but_left_undecorated() {
        let doc = CopyPipeline::default().annotate(SAMPLE).unwrap();
        let inline_ids: Vec<CopyTargetId> = doc
            .targets
            .iter()
            .filter(|m| m.target_type == CopyTargetType::CodeInline)
            .map(|m| m.id)
            .collect();
        assert_eq!(inline_ids, [CopyTargetId(1), CopyTargetId(4)]);

        // The enhancer never enters the decorated table, so the queued entry
        // for `c` stays unused.
        assert!(!doc.html.contains("copy-target-4"));
    }

    #[test]
    fn plain_prose_passes_through() {
        let doc = CopyPipeline::default().annotate("Just words.\n").unwrap();
        assert!(doc.targets.is_empty());
        assert_eq!(doc.decorated, 0);
        assert!(doc.html.contains("<p>Just words.</p>"));
    }

    #[test]
    fn math_is_decorated_when_enabled() {
        let doc = CopyPipeline::default()
            .annotate("Inline $y$ here.\n")
            .unwrap();
        assert_eq!(doc.targets.len(), 1);
        assert_eq!(doc.targets[0].target_type, CopyTargetType::MathInline);
        assert_eq!(covered("Inline $y$ here.\n", &doc.targets[0]), "$y$");
        assert_eq!(doc.decorated, 1);
        assert!(doc.html.contains("katex"));
    }

    #[test]
    fn display_math_is_wrapped() {
        let text = "$$z$$\n";
        let doc = CopyPipeline::default().annotate(text).unwrap();

        assert_eq!(doc.targets.len(), 1);
        assert_eq!(doc.targets[0].target_type, CopyTargetType::MathBlock);
        assert_eq!((doc.targets[0].start, doc.targets[0].end), (0, 5));
        assert_eq!(covered(text, &doc.targets[0]), "$$z$$");

        assert_eq!(doc.decorated, 1);
        assert!(doc.html.contains("markdown-copy-container--math"));
        assert!(doc.html.contains("markdown-copy-math-body"));
        assert!(doc.html.contains("katex-display"));
    }

    #[test]
    fn disabled_targets_are_ignored() {
        let mut config = AppConfig::default();
        *config.targets.get_mut(CopyTargetType::Table) = TargetConfig {
            enabled: false,
            ..TargetConfig::default()
        };
        config.targets.get_mut(CopyTargetType::Code).aria_label = Some("Copy snippet".into());

        let doc = CopyPipeline::from_app_config(&config).annotate(SAMPLE).unwrap();
        assert!(doc.targets.iter().all(|m| m.target_type != CopyTargetType::Table));
        assert!(!doc.html.contains("markdown-copy-container--table"));
        assert!(doc.html.contains(r#"aria-label="Copy snippet""#));
    }

    #[test]
    fn collect_returns_buckets() {
        let buckets = CopyPipeline::default().collect(SAMPLE);
        assert_eq!(buckets.len(CopyTargetType::Code), 1);
        assert_eq!(buckets.len(CopyTargetType::Table), 1);
        assert_eq!(buckets.len(CopyTargetType::CodeInline), 2);
        assert_eq!(buckets.total(), 4);
    }
}
