//! Orchestration of a full batch render.
//!
//! [`MessageComposer`] turns an [`AlertBatch`] plus a [`RenderConfig`] into
//! an ordered page sequence: it resolves template names against the
//! registry, renders rows (grouped or flat), and paginates them. It holds
//! no mutable state and may be shared across concurrent renders.

use tracing::{debug, warn};

use crate::config::{DEFAULT_TEMPLATE, FormatOptions, RenderConfig};
use crate::error::{RenderError, Result};
use crate::group::group_alerts;
use crate::paginate::Paginator;
use crate::template::TemplateRegistry;
use crate::types::{AlertBatch, Page, RenderedRow};

/// Renders alert batches into budget-bounded message pages.
pub struct MessageComposer {
    registry: TemplateRegistry,
}

impl MessageComposer {
    /// Creates a composer over an already-populated registry.
    #[must_use]
    pub fn new(registry: TemplateRegistry) -> Self {
        Self { registry }
    }

    /// Creates a composer with the built-in default templates.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InvalidConfig` for an invalid time format
    /// pattern, or `RenderError::TemplateParse` if a built-in template fails
    /// to compile.
    pub fn with_defaults(opts: &FormatOptions) -> Result<Self> {
        Ok(Self::new(TemplateRegistry::with_defaults(opts)?))
    }

    /// Returns the template registry.
    #[must_use]
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Returns a mutable registry handle for registering templates at setup
    /// time, before the composer is shared.
    pub fn registry_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.registry
    }

    /// Renders `batch` into an ordered page sequence.
    ///
    /// An empty batch yields an empty page list; pages with zero rows are
    /// never emitted. On error no pages are returned: partial output is
    /// discarded rather than partially delivered.
    ///
    /// # Errors
    ///
    /// - `RenderError::InvalidConfig` for a zero byte budget or an empty
    ///   group label with grouping enabled.
    /// - `RenderError::UnknownTemplate` if neither the configured template
    ///   nor the `default` fallback is registered.
    /// - `RenderError::MissingGroupLabel` under the `Fail` policy.
    /// - `RenderError::TemplateExecution` for render-time template failures.
    pub fn compose(&self, batch: &AlertBatch, config: &RenderConfig) -> Result<Vec<Page>> {
        config.validate()?;

        let row_template = self.resolve_row_template(&config.row_template)?;
        let layout = self.resolve_layout(&config.layout)?;

        let rows = if config.grouping {
            self.grouped_rows(batch, config, row_template)?
        } else {
            self.flat_rows(batch, row_template)?
        };

        let paginator = Paginator::new(&self.registry, layout, config.byte_budget);
        let pages = paginator.paginate(batch, &rows)?;

        debug!(
            alerts = batch.len(),
            rows = rows.len(),
            pages = pages.len(),
            grouping = config.grouping,
            "composed alert batch"
        );
        Ok(pages)
    }

    fn flat_rows(&self, batch: &AlertBatch, row_template: &str) -> Result<Vec<RenderedRow>> {
        batch
            .alerts
            .iter()
            .enumerate()
            .map(|(i, alert)| {
                let content =
                    self.registry
                        .render_row(row_template, alert, &format!("alert {i}"))?;
                Ok(RenderedRow::new(content, None))
            })
            .collect()
    }

    fn grouped_rows(
        &self,
        batch: &AlertBatch,
        config: &RenderConfig,
        row_template: &str,
    ) -> Result<Vec<RenderedRow>> {
        let groups = group_alerts(
            &batch.alerts,
            &config.group_label,
            config.missing_label_policy,
        )?;

        let mut rows = Vec::new();
        for group in &groups {
            let header = self.registry.render_group_header(&group.key)?;
            rows.push(RenderedRow::new(header, Some(group.key.clone())));

            for (i, alert) in group.alerts.iter().enumerate() {
                let context = format!("group '{}' alert {i}", group.key);
                let content = self.registry.render_row(row_template, alert, &context)?;
                rows.push(RenderedRow::new(content, Some(group.key.clone())));
            }
        }
        Ok(rows)
    }

    /// Resolves a configured row template name, falling back to `default`
    /// when the named template is not registered.
    fn resolve_row_template<'a>(&self, name: &'a str) -> Result<&'a str> {
        if self.registry.has_row_template(name) {
            return Ok(name);
        }
        if name != DEFAULT_TEMPLATE && self.registry.has_row_template(DEFAULT_TEMPLATE) {
            warn!(template = %name, "unknown row template, falling back to default");
            return Ok(DEFAULT_TEMPLATE);
        }
        Err(RenderError::UnknownTemplate {
            name: name.to_string(),
        })
    }

    /// Resolves a configured layout name, falling back to `default` when the
    /// named layout is not registered.
    fn resolve_layout<'a>(&self, name: &'a str) -> Result<&'a str> {
        if self.registry.has_layout(name) {
            return Ok(name);
        }
        if name != DEFAULT_TEMPLATE && self.registry.has_layout(DEFAULT_TEMPLATE) {
            warn!(layout = %name, "unknown layout, falling back to default");
            return Ok(DEFAULT_TEMPLATE);
        }
        Err(RenderError::UnknownTemplate {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::MissingLabelPolicy;
    use crate::types::Alert;

    fn composer() -> MessageComposer {
        MessageComposer::with_defaults(&FormatOptions::default()).unwrap()
    }

    fn alert(name: &str) -> Alert {
        Alert::new()
            .with_label("alertname", name)
            .with_label("severity", "warning")
            .with_annotation("message", format!("{name} is misbehaving"))
    }

    fn batch_of(alerts: Vec<Alert>) -> AlertBatch {
        AlertBatch {
            status: "firing".to_string(),
            receiver: "ops".to_string(),
            alerts,
            ..AlertBatch::default()
        }
    }

    #[test]
    fn small_batch_fits_on_one_page() {
        // Scenario: 3 alerts, default 4000-byte budget, no grouping.
        let batch = batch_of(vec![alert("A"), alert("B"), alert("C")]);
        let pages = composer().compose(&batch, &RenderConfig::default()).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].rows, 0..3);
        let content = &pages[0].content;
        assert!(content.find("A is misbehaving").unwrap() < content.find("B is misbehaving").unwrap());
        assert!(content.find("B is misbehaving").unwrap() < content.find("C is misbehaving").unwrap());
    }

    #[test]
    fn large_batch_splits_within_budget() {
        // Scenario: 50 alerts against a 1000-byte budget.
        let alerts: Vec<Alert> = (0..50)
            .map(|i| {
                Alert::new()
                    .with_label("alertname", format!("Alert{i}"))
                    .with_label("severity", "warning")
                    .with_annotation("message", "x".repeat(90))
            })
            .collect();
        let batch = batch_of(alerts);
        let config = RenderConfig {
            byte_budget: 1000,
            ..RenderConfig::default()
        };

        let pages = composer().compose(&batch, &config).unwrap();

        assert!(pages.len() > 1);
        let total_rows: usize = pages.iter().map(Page::row_count).sum();
        assert_eq!(total_rows, 50);
        for page in &pages {
            assert!(page.byte_len() <= 1000, "page {} too large", page.index);
        }
    }

    #[test]
    fn grouping_orders_by_first_occurrence() {
        // Scenario: alertnames [A, B, A] grouped; group A comes first with
        // both members, then group B.
        let batch = batch_of(vec![
            alert("A").with_annotation("message", "first member of A"),
            alert("B"),
            alert("A").with_annotation("message", "third alert, second member of A"),
        ]);
        let config = RenderConfig {
            grouping: true,
            ..RenderConfig::default()
        };

        let pages = composer().compose(&batch, &config).unwrap();
        assert_eq!(pages.len(), 1);
        // 3 alerts + 2 group headers.
        assert_eq!(pages[0].row_count(), 5);

        let content = &pages[0].content;
        let header_a = content.find("📁 <b>A</b>").unwrap();
        let header_b = content.find("📁 <b>B</b>").unwrap();
        assert!(header_a < header_b);

        // Both A alerts sit between header A and header B.
        let first = content.find("first member of A").unwrap();
        let third = content.find("third alert").unwrap();
        assert!(header_a < first && first < third && third < header_b);
    }

    #[test]
    fn oversized_row_is_never_truncated() {
        // Scenario: a single alert rendering far beyond the budget.
        let batch = batch_of(vec![
            alert("big").with_annotation("message", "y".repeat(6000)),
        ]);
        let config = RenderConfig {
            byte_budget: 4000,
            ..RenderConfig::default()
        };

        let pages = composer().compose(&batch, &config).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].byte_len() > 6000);
        assert!(pages[0].content.contains(&"y".repeat(6000)));
    }

    #[test]
    fn missing_group_label_fails_with_no_pages() {
        // Scenario: grouping enabled, one alert lacks the label.
        let batch = batch_of(vec![alert("A"), Alert::new().with_label("job", "node")]);
        let config = RenderConfig {
            grouping: true,
            ..RenderConfig::default()
        };

        let err = composer().compose(&batch, &config).unwrap_err();
        match err {
            RenderError::MissingGroupLabel { label, index, .. } => {
                assert_eq!(label, "alertname");
                assert_eq!(index, 1);
            }
            other => panic!("expected MissingGroupLabel, got {other}"),
        }
    }

    #[test]
    fn collect_policy_renders_unlabeled_group() {
        let batch = batch_of(vec![alert("A"), Alert::new().with_label("job", "node")]);
        let config = RenderConfig {
            grouping: true,
            missing_label_policy: MissingLabelPolicy::Collect,
            ..RenderConfig::default()
        };

        let pages = composer().compose(&batch, &config).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].content.contains("unlabeled"));
    }

    #[test]
    fn empty_batch_yields_no_pages() {
        let pages = composer()
            .compose(&batch_of(vec![]), &RenderConfig::default())
            .unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn unknown_templates_fall_back_to_default() {
        let batch = batch_of(vec![alert("A")]);
        let config = RenderConfig {
            layout: "fancy".to_string(),
            row_template: "fancy".to_string(),
            ..RenderConfig::default()
        };

        let pages = composer().compose(&batch, &config).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].content.contains("A is misbehaving"));
    }

    #[test]
    fn unknown_template_without_default_errors() {
        let registry = TemplateRegistry::new(&FormatOptions::default()).unwrap();
        let composer = MessageComposer::new(registry);
        let batch = batch_of(vec![alert("A")]);

        let err = composer.compose(&batch, &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate { .. }));
    }

    #[test]
    fn custom_row_template_is_used() {
        let mut composer = composer();
        composer
            .registry_mut()
            .register_row_template("compact", "{{labels.alertname}}\n")
            .unwrap();

        let batch = batch_of(vec![alert("A"), alert("B")]);
        let config = RenderConfig {
            row_template: "compact".to_string(),
            ..RenderConfig::default()
        };

        let pages = composer.compose(&batch, &config).unwrap();
        assert!(pages[0].content.contains("A\n"));
        assert!(!pages[0].content.contains("misbehaving"));
    }

    #[test]
    fn compose_is_deterministic() {
        let batch = batch_of(vec![alert("A"), alert("B"), alert("A")]);
        let config = RenderConfig {
            grouping: true,
            byte_budget: 200,
            ..RenderConfig::default()
        };

        let composer = composer();
        let first = composer.compose(&batch, &config).unwrap();
        let second = composer.compose(&batch, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn row_error_carries_group_context() {
        let mut composer = composer();
        composer
            .registry_mut()
            .register_row_template("strict", "{{annotations.absent}}")
            .unwrap();

        let batch = batch_of(vec![alert("A")]);
        let config = RenderConfig {
            grouping: true,
            row_template: "strict".to_string(),
            ..RenderConfig::default()
        };

        let err = composer.compose(&batch, &config).unwrap_err();
        match err {
            RenderError::TemplateExecution { context, .. } => {
                assert!(context.contains("group 'A'"), "context was {context:?}");
            }
            other => panic!("expected TemplateExecution, got {other}"),
        }
    }
}
