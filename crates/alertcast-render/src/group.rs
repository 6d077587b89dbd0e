//! Order-preserving grouping of alerts by a label key.
//!
//! Groups appear in first-occurrence order and alerts keep their batch
//! order within each group. Order is tracked with an explicit group list
//! plus an index map; hash-map iteration order is never relied on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RenderError, Result};
use crate::types::Alert;

/// The label key alerts are grouped by when none is configured.
pub const DEFAULT_GROUP_LABEL: &str = "alertname";

/// Group key assigned to alerts lacking the grouping label under
/// [`MissingLabelPolicy::Collect`].
pub const UNLABELED_GROUP: &str = "unlabeled";

/// What to do with an alert that lacks the grouping label, or whose label
/// value is not a plain string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingLabelPolicy {
    /// Fail the whole batch with `MissingGroupLabel`.
    #[default]
    Fail,
    /// Collect such alerts under the [`UNLABELED_GROUP`] group.
    Collect,
}

/// One group of alerts sharing a label value, in batch order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertGroup<'a> {
    /// The shared label value.
    pub key: String,
    /// The member alerts, in original batch order.
    pub alerts: Vec<&'a Alert>,
}

/// Partitions alerts into groups keyed by `label_key`.
///
/// Groups are returned in first-occurrence order; alerts keep their batch
/// order within each group.
///
/// # Errors
///
/// Under [`MissingLabelPolicy::Fail`], returns `MissingGroupLabel` naming
/// the first alert whose `label_key` is absent or not a plain string.
pub fn group_alerts<'a>(
    alerts: &'a [Alert],
    label_key: &str,
    policy: MissingLabelPolicy,
) -> Result<Vec<AlertGroup<'a>>> {
    let mut groups: Vec<AlertGroup<'a>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (i, alert) in alerts.iter().enumerate() {
        let key = match alert.labels.get(label_key).and_then(Value::as_str) {
            Some(value) => value.to_string(),
            None => match policy {
                MissingLabelPolicy::Fail => {
                    return Err(RenderError::MissingGroupLabel {
                        label: label_key.to_string(),
                        index: i,
                        alert: alert.describe(),
                    });
                }
                MissingLabelPolicy::Collect => UNLABELED_GROUP.to_string(),
            },
        };

        match index.get(&key) {
            Some(&at) => groups[at].alerts.push(alert),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(AlertGroup {
                    key,
                    alerts: vec![alert],
                });
            }
        }
    }

    Ok(groups)
}
