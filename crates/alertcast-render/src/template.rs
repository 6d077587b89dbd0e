//! Template registry and the fixed function set exposed to templates.
//!
//! Wraps a [`handlebars::Handlebars`] registry in strict mode, so a template
//! referencing a field absent from its data fails at render time with a
//! recoverable [`RenderError::TemplateExecution`] instead of silently
//! printing nothing. Template parse failures surface at registration time,
//! never mid-render.
//!
//! The helper set available to row and layout templates:
//!
//! | helper           | effect                                            |
//! |------------------|---------------------------------------------------|
//! | `to_upper`       | uppercase a string                                |
//! | `to_lower`       | lowercase a string                                |
//! | `title`          | title-case a string                               |
//! | `format_date`    | format an RFC 3339 timestamp in the configured zone |
//! | `format_byte`    | humanize a byte count (`1536` → `1.5KiB`)         |
//! | `format_measure` | SI measurement suffixes (`1500000` → `1.5M`)      |
//! | `format_float`   | trim a float to at most two decimals              |
//! | `has_key`        | test a label/annotation map for a key             |

use std::collections::HashMap;

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderErrorReason, handlebars_helper,
};
use serde::Serialize;
use serde_json::Value;

use crate::config::FormatOptions;
use crate::error::{RenderError, Result};
use crate::measure::{self, MeasureConverter};
use crate::types::{Alert, AlertBatch, RenderedRow};

const ROW_PREFIX: &str = "row/";
const LAYOUT_PREFIX: &str = "layout/";
const GROUP_HEADER: &str = "group-header";

const DEFAULT_ROW_TEMPLATE: &str = r#"<b>{{#if (has_key annotations "message")}}{{annotations.message}}{{else}}{{#if (has_key labels "alertname")}}{{labels.alertname}}{{else}}alert{{/if}}{{/if}}</b> [ {{#if (has_key labels "severity")}}{{labels.severity}}{{else}}none{{/if}} ]
"#;

const DEFAULT_LAYOUT_TEMPLATE: &str = r#"{{#if firing}}Firing🔥{{else}}{{title status}}{{/if}}
{{#each rows}}{{{this}}}{{/each}}"#;

const GROUP_HEADER_TEMPLATE: &str = "\n📁 <b>{{group_key}}</b>\n";

handlebars_helper!(ToUpper: |s: str| s.to_uppercase());
handlebars_helper!(ToLower: |s: str| s.to_lowercase());
handlebars_helper!(Title: |s: str| title_case(s));
handlebars_helper!(HasKey: |map: object, key: str| map.contains_key(key));

/// The view handed to layout templates for each candidate page.
#[derive(Debug, Serialize)]
pub struct LayoutView<'a> {
    /// 0-based page number.
    pub page: usize,
    /// Batch status string.
    pub status: &'a str,
    /// Whether the batch status is `"firing"`.
    pub firing: bool,
    /// Link to the alerting system's UI.
    pub external_url: &'a str,
    /// The receiver that matched the batch.
    pub receiver: &'a str,
    /// Labels the batch was grouped by upstream.
    pub group_labels: &'a HashMap<String, Value>,
    /// Labels common to every alert.
    pub common_labels: &'a HashMap<String, Value>,
    /// Annotations common to every alert.
    pub common_annotations: &'a HashMap<String, Value>,
    /// The rendered rows embedded in this page, in order.
    pub rows: Vec<&'a str>,
}

impl<'a> LayoutView<'a> {
    /// Builds the view for one candidate page.
    #[must_use]
    pub fn new(batch: &'a AlertBatch, page: usize, rows: &'a [RenderedRow]) -> Self {
        Self {
            page,
            status: &batch.status,
            firing: batch.is_firing(),
            external_url: &batch.external_url,
            receiver: &batch.receiver,
            group_labels: &batch.group_labels,
            common_labels: &batch.common_labels,
            common_annotations: &batch.common_annotations,
            rows: rows.iter().map(|r| r.content.as_str()).collect(),
        }
    }
}

/// A read-only registry of named row and layout templates.
///
/// Safe to share across concurrent renders once populated.
pub struct TemplateRegistry {
    hb: Handlebars<'static>,
}

impl TemplateRegistry {
    /// Creates a registry with the helper set installed but no templates.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InvalidConfig` if the configured time format
    /// pattern is invalid.
    pub fn new(opts: &FormatOptions) -> Result<Self> {
        let converter = MeasureConverter::new(opts)?;
        let mut hb = Handlebars::new();
        hb.set_strict_mode(true);
        hb.register_helper("to_upper", Box::new(ToUpper));
        hb.register_helper("to_lower", Box::new(ToLower));
        hb.register_helper("title", Box::new(Title));
        hb.register_helper("has_key", Box::new(HasKey));
        hb.register_helper("format_date", Box::new(FormatDateHelper { converter }));
        hb.register_helper(
            "format_byte",
            Box::new(NumberFormatHelper {
                name: "format_byte",
                format: measure::humanize_bytes,
            }),
        );
        hb.register_helper(
            "format_measure",
            Box::new(NumberFormatHelper {
                name: "format_measure",
                format: measure::format_measure,
            }),
        );
        hb.register_helper(
            "format_float",
            Box::new(NumberFormatHelper {
                name: "format_float",
                format: measure::format_float,
            }),
        );
        Ok(Self { hb })
    }

    /// Creates a registry with the built-in `default` row template, `default`
    /// layout, and group-header template registered.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InvalidConfig` for an invalid time format
    /// pattern, or `RenderError::TemplateParse` if a built-in template fails
    /// to compile.
    pub fn with_defaults(opts: &FormatOptions) -> Result<Self> {
        let mut registry = Self::new(opts)?;
        registry.register_row_template("default", DEFAULT_ROW_TEMPLATE)?;
        registry.register_layout("default", DEFAULT_LAYOUT_TEMPLATE)?;
        registry.register_group_header(GROUP_HEADER_TEMPLATE)?;
        Ok(registry)
    }

    /// Registers a row template under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateParse` if the template does not compile.
    pub fn register_row_template(&mut self, name: &str, text: &str) -> Result<()> {
        self.register(&format!("{ROW_PREFIX}{name}"), text)
    }

    /// Registers a layout template under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateParse` if the template does not compile.
    pub fn register_layout(&mut self, name: &str, text: &str) -> Result<()> {
        self.register(&format!("{LAYOUT_PREFIX}{name}"), text)
    }

    /// Registers the group header template. There is exactly one; it is not
    /// overridable per destination.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateParse` if the template does not compile.
    pub fn register_group_header(&mut self, text: &str) -> Result<()> {
        self.register(GROUP_HEADER, text)
    }

    fn register(&mut self, name: &str, text: &str) -> Result<()> {
        self.hb
            .register_template_string(name, text)
            .map_err(|e| RenderError::TemplateParse {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Returns true if a row template named `name` is registered.
    #[must_use]
    pub fn has_row_template(&self, name: &str) -> bool {
        self.hb.get_template(&format!("{ROW_PREFIX}{name}")).is_some()
    }

    /// Returns true if a layout named `name` is registered.
    #[must_use]
    pub fn has_layout(&self, name: &str) -> bool {
        self.hb
            .get_template(&format!("{LAYOUT_PREFIX}{name}"))
            .is_some()
    }

    /// Renders one alert with the named row template.
    ///
    /// `context` describes what is being rendered for error reporting,
    /// e.g. `alert 3`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateExecution` on any render-time failure,
    /// including fields absent from the alert.
    pub fn render_row(&self, name: &str, alert: &Alert, context: &str) -> Result<String> {
        let full = format!("{ROW_PREFIX}{name}");
        self.hb
            .render(&full, alert)
            .map_err(|e| RenderError::TemplateExecution {
                name: full.clone(),
                context: context.to_string(),
                reason: e.to_string(),
            })
    }

    /// Renders the group header for `key`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateExecution` on render failure.
    pub fn render_group_header(&self, key: &str) -> Result<String> {
        self.hb
            .render(GROUP_HEADER, &serde_json::json!({ "group_key": key }))
            .map_err(|e| RenderError::TemplateExecution {
                name: GROUP_HEADER.to_string(),
                context: format!("group '{key}'"),
                reason: e.to_string(),
            })
    }

    /// Renders the named layout with a page view.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::TemplateExecution` on render failure.
    pub fn render_layout(&self, name: &str, view: &LayoutView<'_>) -> Result<String> {
        let full = format!("{LAYOUT_PREFIX}{name}");
        self.hb
            .render(&full, view)
            .map_err(|e| RenderError::TemplateExecution {
                name: full.clone(),
                context: format!("page {}", view.page),
                reason: e.to_string(),
            })
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Clone)]
struct FormatDateHelper {
    converter: MeasureConverter,
}

impl HelperDef for FormatDateHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let raw = h
            .param(0)
            .and_then(|p| p.value().as_str())
            .ok_or_else(|| {
                RenderErrorReason::Other("format_date expects a timestamp string".to_string())
            })?;
        let formatted = self
            .converter
            .format_date(raw)
            .map_err(|e| RenderErrorReason::Other(format!("format_date: {e}")))?;
        out.write(&formatted)?;
        Ok(())
    }
}

/// Numeric formatter accepting either a JSON number or a numeric string,
/// since label and annotation values frequently arrive as strings.
struct NumberFormatHelper {
    name: &'static str,
    format: fn(f64) -> String,
}

impl HelperDef for NumberFormatHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let value = h.param(0).and_then(|p| json_number(p.value())).ok_or_else(|| {
            RenderErrorReason::Other(format!("{} expects a numeric value", self.name))
        })?;
        out.write(&(self.format)(value))?;
        Ok(())
    }
}

fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
