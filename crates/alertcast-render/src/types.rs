//! Core types for alert batch rendering.
//!
//! This module provides the data model that flows through the engine:
//! - [`Alert`]: one firing or resolved condition from a monitoring system
//! - [`AlertBatch`]: a batch of alerts plus batch-level metadata
//! - [`RenderedRow`]: one alert or group header rendered to text
//! - [`Page`]: one complete, budget-bounded deliverable message
//!
//! [`Alert`] and [`AlertBatch`] deserialize directly from the Alertmanager
//! webhook payload; both are read-only once received.

use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Batch status value for firing alerts.
pub const STATUS_FIRING: &str = "firing";

/// One firing or resolved condition with labels, annotations, timestamps,
/// and an optional source link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Labels identifying the alert. Values are scalars; non-string values
    /// are tolerated but cannot serve as a grouping key.
    #[serde(default)]
    pub labels: HashMap<String, Value>,
    /// Free-form annotations providing more context.
    #[serde(default)]
    pub annotations: HashMap<String, Value>,
    /// When the alert started, as an opaque timestamp string.
    #[serde(default, rename = "startsAt")]
    pub starts_at: String,
    /// When the alert ended, as an opaque timestamp string.
    #[serde(default, rename = "endsAt")]
    pub ends_at: String,
    /// Link back to the system that generated the alert. May be empty.
    #[serde(default, rename = "generatorURL")]
    pub generator_url: String,
}

impl Alert {
    /// Creates an empty alert.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a string label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Adds a string annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations
            .insert(key.into(), Value::String(value.into()));
        self
    }

    /// Returns the value of a label if it is a plain string.
    #[must_use]
    pub fn label_str(&self, key: &str) -> Option<&str> {
        self.labels.get(key).and_then(Value::as_str)
    }

    /// Returns the `alertname` label if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.label_str("alertname")
    }

    /// A short description of the alert for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        self.name().unwrap_or("unnamed").to_string()
    }
}

/// A batch of alerts plus batch-level metadata from one notification event.
///
/// This is the top-level object of the Alertmanager webhook payload.
/// Unknown fields (e.g. `version`, `groupKey`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertBatch {
    /// Batch status: `"firing"`, `"resolved"`, or any passthrough string.
    #[serde(default)]
    pub status: String,
    /// Link to the alerting system's UI.
    #[serde(default, rename = "externalURL")]
    pub external_url: String,
    /// The receiver that matched this batch.
    #[serde(default)]
    pub receiver: String,
    /// Labels the alerting system grouped this batch by.
    #[serde(default, rename = "groupLabels")]
    pub group_labels: HashMap<String, Value>,
    /// Labels common to every alert in the batch.
    #[serde(default, rename = "commonLabels")]
    pub common_labels: HashMap<String, Value>,
    /// Annotations common to every alert in the batch.
    #[serde(default, rename = "commonAnnotations")]
    pub common_annotations: HashMap<String, Value>,
    /// The alerts, in encounter order.
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl AlertBatch {
    /// Returns true if the batch status is `"firing"`.
    #[must_use]
    pub fn is_firing(&self) -> bool {
        self.status == STATUS_FIRING
    }

    /// Returns the number of alerts in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Returns true if the batch carries no alerts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// One alert or one group header rendered to a self-contained text fragment.
///
/// Owned exclusively by the paginator once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    /// The rendered text.
    pub content: String,
    /// The group this row belongs to, if grouping was enabled.
    pub group_key: Option<String>,
}

impl RenderedRow {
    /// Creates a rendered row.
    #[must_use]
    pub fn new(content: impl Into<String>, group_key: Option<String>) -> Self {
        Self {
            content: content.into(),
            group_key,
        }
    }

    /// Returns the rendered size in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.content.len()
    }
}

/// One complete, budget-bounded deliverable message.
///
/// Page indices are contiguous starting at 0, and the union of all pages'
/// row ranges covers the full row sequence with no gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 0-based ordinal of this page within the batch.
    pub index: usize,
    /// The fully rendered layout, including embedded rows.
    pub content: String,
    /// The half-open range of row indices this page contains.
    pub rows: Range<usize>,
}

impl Page {
    /// Creates a page.
    #[must_use]
    pub fn new(index: usize, content: impl Into<String>, rows: Range<usize>) -> Self {
        Self {
            index,
            content: content.into(),
            rows,
        }
    }

    /// Returns the rendered size in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.content.len()
    }

    /// Returns the number of rows embedded in this page.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Consumes the page and returns the rendered bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.content.into_bytes()
    }
}
