//! Alert batch rendering, grouping, and budget-bounded pagination.
//!
//! `alertcast-render` turns a parsed Alertmanager webhook batch into one or
//! more human-readable text messages, each bounded by a byte budget, ready
//! for delivery over a size-limited messaging channel. It performs no
//! network I/O: input is an [`AlertBatch`] value plus a resolved
//! [`RenderConfig`], output is an ordered sequence of [`Page`]s.
//!
//! # Features
//!
//! - **Row templates**: each alert renders through a named template with a
//!   fixed helper set (case transforms, date/byte/measurement formatting,
//!   key-existence tests)
//! - **Grouping**: optional grouping by a label key, preserving first-seen
//!   group order and intra-group batch order, with a header row per group
//! - **Pagination**: pages never exceed the byte budget (except a single
//!   oversized row, which gets its own page rather than being truncated)
//! - **Recoverable errors**: template and grouping failures are typed
//!   errors returned to the caller, never process-terminating
//!
//! # Example
//!
//! ```rust
//! use alertcast_render::{AlertBatch, FormatOptions, MessageComposer, RenderConfig};
//!
//! let payload = r#"{
//!     "status": "firing",
//!     "receiver": "ops",
//!     "alerts": [
//!         {"labels": {"alertname": "DiskFull", "severity": "critical"},
//!          "annotations": {"message": "Disk usage above 90%"}}
//!     ]
//! }"#;
//!
//! let batch: AlertBatch = serde_json::from_str(payload).unwrap();
//! let composer = MessageComposer::with_defaults(&FormatOptions::default()).unwrap();
//!
//! let pages = composer.compose(&batch, &RenderConfig::default()).unwrap();
//! assert_eq!(pages.len(), 1);
//! assert!(pages[0].content.contains("Firing🔥"));
//! assert!(pages[0].content.contains("Disk usage above 90%"));
//! ```
//!
//! # Templates
//!
//! Row templates render one alert and see the webhook alert fields
//! (`labels`, `annotations`, `startsAt`, `endsAt`, `generatorURL`). Layout
//! templates wrap one page's rows and see a [`LayoutView`]
//! (`page`, `status`, `firing`, `rows`, batch metadata). Both may use the
//! helper set documented in [`template`].

#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/alertcast-render/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod compose;
pub mod config;
pub mod error;
pub mod group;
pub mod measure;
pub mod paginate;
pub mod standard;
pub mod template;
pub mod types;

// Re-export main types at crate root
pub use compose::MessageComposer;
pub use config::{DEFAULT_TEMPLATE, DestinationOverrides, FormatOptions, RenderConfig};
pub use error::{RenderError, Result};
pub use group::{AlertGroup, DEFAULT_GROUP_LABEL, MissingLabelPolicy, group_alerts};
pub use measure::MeasureConverter;
pub use paginate::{DEFAULT_BYTE_BUDGET, Paginator};
pub use template::{LayoutView, TemplateRegistry};
pub use types::{Alert, AlertBatch, Page, RenderedRow};
