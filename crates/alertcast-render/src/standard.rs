//! Template-free fallback formatting.
//!
//! Produces a compact single-message summary of a batch for deployments
//! that configure no templates: a status banner linking back to the
//! alerting system, the batch's group labels, common labels and
//! annotations (all in sorted key order for deterministic output), and a
//! one-line detail per alert.

use serde_json::Value;

use crate::types::AlertBatch;

/// Formats a batch without templates.
#[must_use]
pub fn format_standard(batch: &AlertBatch) -> String {
    let group_labels = sorted_pairs(&batch.group_labels, |_| true)
        .into_iter()
        .map(|(k, v)| format!("{k}=<code>{v}</code>"))
        .collect::<Vec<_>>()
        .join(", ");

    // Common labels repeat the group labels; show only the remainder.
    let common_labels = sorted_pairs(&batch.common_labels, |k| !batch.group_labels.contains_key(k))
        .into_iter()
        .map(|(k, v)| format!("{k}=<code>{v}</code>"))
        .collect::<Vec<_>>()
        .join(", ");

    let common_annotations = sorted_pairs(&batch.common_annotations, |_| true)
        .into_iter()
        .map(|(k, v)| format!("\n{k}: <code>{v}</code>"))
        .collect::<Vec<_>>()
        .join("");

    let details = batch
        .alerts
        .iter()
        .map(|alert| {
            let mut detail = String::new();
            if let Some(instance) = alert.label_str("instance") {
                detail.push_str(instance.split(':').next().unwrap_or(instance));
            }
            if let Some(job) = alert.label_str("job") {
                detail.push_str(&format!("[{job}]"));
            }
            if alert.generator_url.is_empty() {
                detail
            } else {
                format!("<a href='{}'>{detail}</a>", alert.generator_url)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "<a href='{}/#/alerts?receiver={}'>[{}:{}]</a>\ngrouped by: {}\nlabels: {}{}\n{}",
        batch.external_url,
        batch.receiver,
        batch.status.to_uppercase(),
        batch.alerts.len(),
        group_labels,
        common_labels,
        common_annotations,
        details,
    )
}

/// Splits text into chunks of at most `budget` bytes, never splitting
/// inside a UTF-8 sequence.
#[must_use]
pub fn split_chunks(text: &str, budget: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if !current.is_empty() && current.len() + ch.len_utf8() > budget {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn sorted_pairs<'a>(
    map: &'a std::collections::HashMap<String, Value>,
    keep: impl Fn(&str) -> bool,
) -> Vec<(&'a str, String)> {
    let mut pairs: Vec<(&str, String)> = map
        .iter()
        .filter(|(k, _)| keep(k))
        .map(|(k, v)| (k.as_str(), scalar_text(v)))
        .collect();
    pairs.sort_by_key(|(k, _)| *k);
    pairs
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
