//! Rendering configuration.
//!
//! [`RenderConfig`] is the fully resolved per-destination configuration the
//! composer works from; [`DestinationOverrides`] is its all-optional mirror
//! for per-destination override maps. Both deserialize with defaults so
//! they can be embedded in a process configuration file.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::group::{DEFAULT_GROUP_LABEL, MissingLabelPolicy};
use crate::paginate::DEFAULT_BYTE_BUDGET;

/// The name under which the built-in templates are registered.
pub const DEFAULT_TEMPLATE: &str = "default";

/// Default strftime pattern for `format_date`.
pub const DEFAULT_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Resolved rendering configuration for one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Name of the layout template wrapping each page.
    pub layout: String,
    /// Name of the template rendering one alert into a row.
    pub row_template: String,
    /// Whether to group alerts by label before rendering.
    pub grouping: bool,
    /// The label key to group by.
    pub group_label: String,
    /// Maximum rendered size of one page, in bytes.
    pub byte_budget: usize,
    /// What to do with alerts lacking the grouping label.
    pub missing_label_policy: MissingLabelPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layout: DEFAULT_TEMPLATE.to_string(),
            row_template: DEFAULT_TEMPLATE.to_string(),
            grouping: false,
            group_label: DEFAULT_GROUP_LABEL.to_string(),
            byte_budget: DEFAULT_BYTE_BUDGET,
            missing_label_policy: MissingLabelPolicy::default(),
        }
    }
}

impl RenderConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InvalidConfig` if the byte budget is zero or
    /// grouping is enabled with an empty group label.
    pub fn validate(&self) -> Result<()> {
        if self.byte_budget == 0 {
            return Err(RenderError::InvalidConfig {
                reason: "byte budget must be positive".to_string(),
            });
        }
        if self.grouping && self.group_label.is_empty() {
            return Err(RenderError::InvalidConfig {
                reason: "group label cannot be empty when grouping".to_string(),
            });
        }
        Ok(())
    }
}

/// Per-destination overrides, resolved against a default [`RenderConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationOverrides {
    /// Overrides the layout template name.
    pub layout: Option<String>,
    /// Overrides the row template name.
    pub row_template: Option<String>,
    /// Overrides the grouping flag.
    pub grouping: Option<bool>,
    /// Overrides the grouping label key.
    pub group_label: Option<String>,
    /// Overrides the byte budget.
    pub byte_budget: Option<usize>,
    /// Overrides the missing-label policy.
    pub missing_label_policy: Option<MissingLabelPolicy>,
}

impl DestinationOverrides {
    /// Resolves the overrides against defaults into a full configuration.
    #[must_use]
    pub fn resolve(&self, defaults: &RenderConfig) -> RenderConfig {
        RenderConfig {
            layout: self.layout.clone().unwrap_or_else(|| defaults.layout.clone()),
            row_template: self
                .row_template
                .clone()
                .unwrap_or_else(|| defaults.row_template.clone()),
            grouping: self.grouping.unwrap_or(defaults.grouping),
            group_label: self
                .group_label
                .clone()
                .unwrap_or_else(|| defaults.group_label.clone()),
            byte_budget: self.byte_budget.unwrap_or(defaults.byte_budget),
            missing_label_policy: self
                .missing_label_policy
                .unwrap_or(defaults.missing_label_policy),
        }
    }
}

/// Options for the template date formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// The time zone timestamps are formatted in.
    pub time_zone: Tz,
    /// The strftime pattern timestamps are formatted with.
    pub time_format: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            time_zone: Tz::UTC,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.layout, "default");
        assert_eq!(config.row_template, "default");
        assert!(!config.grouping);
        assert_eq!(config.group_label, "alertname");
        assert_eq!(config.byte_budget, 4000);
        assert_eq!(config.missing_label_policy, MissingLabelPolicy::Fail);
    }

    #[test]
    fn render_config_deserializes_with_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"grouping": true, "byte_budget": 1000}"#).unwrap();
        assert!(config.grouping);
        assert_eq!(config.byte_budget, 1000);
        assert_eq!(config.layout, "default");
    }

    #[test]
    fn validate_rejects_zero_budget() {
        let config = RenderConfig {
            byte_budget: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RenderError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_group_label() {
        let config = RenderConfig {
            grouping: true,
            group_label: String::new(),
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn overrides_resolve_against_defaults() {
        let overrides = DestinationOverrides {
            row_template: Some("compact".to_string()),
            byte_budget: Some(512),
            ..DestinationOverrides::default()
        };

        let resolved = overrides.resolve(&RenderConfig::default());
        assert_eq!(resolved.row_template, "compact");
        assert_eq!(resolved.byte_budget, 512);
        assert_eq!(resolved.layout, "default");
        assert!(!resolved.grouping);
    }

    #[test]
    fn empty_overrides_resolve_to_defaults() {
        let resolved = DestinationOverrides::default().resolve(&RenderConfig::default());
        assert_eq!(resolved, RenderConfig::default());
    }

    #[test]
    fn format_options_deserialize_zone_by_name() {
        let opts: FormatOptions =
            serde_json::from_str(r#"{"time_zone": "Europe/Rome"}"#).unwrap();
        assert_eq!(opts.time_zone, chrono_tz::Europe::Rome);
        assert_eq!(opts.time_format, DEFAULT_TIME_FORMAT);
    }
}
