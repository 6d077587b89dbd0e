//! Per-destination fan-out of rendered alert pages.
//!
//! `alertcast-fanout` sits between the rendering engine and a delivery
//! collaborator: a worker task drains a queue of jobs, renders each batch
//! once per destination with that destination's resolved configuration,
//! and hands the resulting pages to a [`Deliverer`] in order, with a fixed
//! courtesy delay between pages to the same destination. Failures are
//! isolated per destination and never stop the worker.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use alertcast_fanout::{Deliverer, FanoutConfig, FanoutJob, FanoutWorker, job_channel};
//! use alertcast_render::{AlertBatch, FormatOptions, MessageComposer, Page, RenderConfig};
//!
//! struct StdoutDeliverer;
//!
//! impl Deliverer for StdoutDeliverer {
//!     fn name(&self) -> &str {
//!         "stdout"
//!     }
//!
//!     fn deliver(&self, destination: &str, page: &Page) -> alertcast_fanout::Result<()> {
//!         println!("-> {destination}: {}", page.content);
//!         Ok(())
//!     }
//! }
//!
//! # async fn demo() {
//! let composer = MessageComposer::with_defaults(&FormatOptions::default()).unwrap();
//! let config = FanoutConfig::default();
//! let (tx, rx) = job_channel(&config);
//! let worker = FanoutWorker::new(
//!     composer,
//!     Box::new(StdoutDeliverer),
//!     RenderConfig::default(),
//!     config,
//! );
//! tokio::spawn(worker.run(rx));
//!
//! tx.send(FanoutJob {
//!     batch: Arc::new(AlertBatch::default()),
//!     destinations: vec!["chat-42".to_string()],
//! })
//! .await
//! .unwrap();
//! # }
//! ```

#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/alertcast-fanout/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod worker;

// Re-export main types at crate root
pub use error::{FanoutError, Result};
pub use worker::{Deliverer, FanoutConfig, FanoutJob, FanoutWorker, job_channel};
