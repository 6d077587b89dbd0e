//! The fan-out worker.
//!
//! One worker task drains a queue of [`FanoutJob`]s. For each destination
//! in a job it resolves the destination's render configuration, invokes the
//! composer, and hands the resulting pages to the [`Deliverer`] in order,
//! sleeping a fixed courtesy delay between successive pages to the same
//! destination. A failure for one destination is logged and isolated; the
//! remaining destinations still render and deliver. Composer, overrides,
//! and configuration are read-only once the worker is built.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alertcast_render::{AlertBatch, DestinationOverrides, MessageComposer, Page, RenderConfig};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::Result;

/// A delivery collaborator handed fully rendered pages.
///
/// Implementations wrap a chat or messaging API client. Retries and rate
/// limiting beyond the worker's fixed inter-page delay are the
/// implementation's concern.
pub trait Deliverer: Send + Sync {
    /// Returns the name of this deliverer for logging.
    fn name(&self) -> &str;

    /// Delivers one page to a destination.
    ///
    /// # Errors
    ///
    /// Returns `FanoutError::DeliveryFailed` if the page cannot be sent.
    fn deliver(&self, destination: &str, page: &Page) -> Result<()>;
}

/// One unit of fan-out work: a batch and the destinations it goes to.
#[derive(Debug, Clone)]
pub struct FanoutJob {
    /// The alert batch to render, shared across destinations.
    pub batch: Arc<AlertBatch>,
    /// The destinations to deliver to, in order.
    pub destinations: Vec<String>,
}

/// Configuration for the fan-out worker.
#[derive(Debug, Clone)]
pub struct FanoutConfig {
    /// Delay between successive pages sent to the same destination.
    pub page_delay: Duration,
    /// Capacity of the job queue created by [`job_channel`].
    pub queue_capacity: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(1),
            queue_capacity: 64,
        }
    }
}

/// Creates a job queue sized from `config.queue_capacity`.
#[must_use]
pub fn job_channel(config: &FanoutConfig) -> (mpsc::Sender<FanoutJob>, mpsc::Receiver<FanoutJob>) {
    mpsc::channel(config.queue_capacity)
}

/// Drains fan-out jobs and delivers rendered pages per destination.
pub struct FanoutWorker {
    composer: MessageComposer,
    deliverer: Box<dyn Deliverer>,
    defaults: RenderConfig,
    overrides: HashMap<String, DestinationOverrides>,
    config: FanoutConfig,
}

impl FanoutWorker {
    /// Creates a worker with no per-destination overrides.
    #[must_use]
    pub fn new(
        composer: MessageComposer,
        deliverer: Box<dyn Deliverer>,
        defaults: RenderConfig,
        config: FanoutConfig,
    ) -> Self {
        Self {
            composer,
            deliverer,
            defaults,
            overrides: HashMap::new(),
            config,
        }
    }

    /// Adds a per-destination override.
    #[must_use]
    pub fn with_override(
        mut self,
        destination: impl Into<String>,
        overrides: DestinationOverrides,
    ) -> Self {
        self.overrides.insert(destination.into(), overrides);
        self
    }

    /// Returns the resolved configuration for a destination.
    #[must_use]
    pub fn config_for(&self, destination: &str) -> RenderConfig {
        self.overrides
            .get(destination)
            .map_or_else(|| self.defaults.clone(), |o| o.resolve(&self.defaults))
    }

    /// Runs the worker until the job queue closes.
    pub async fn run(self, mut jobs: mpsc::Receiver<FanoutJob>) {
        while let Some(job) = jobs.recv().await {
            self.process(&job).await;
        }
        info!(deliverer = %self.deliverer.name(), "job queue closed, worker stopping");
    }

    /// Processes one job, isolating failures per destination.
    pub async fn process(&self, job: &FanoutJob) {
        for destination in &job.destinations {
            if let Err(e) = self.send_to(destination, &job.batch).await {
                error!(
                    destination = %destination,
                    error = %e,
                    "destination failed, continuing with remaining destinations"
                );
            }
        }
    }

    async fn send_to(&self, destination: &str, batch: &AlertBatch) -> Result<()> {
        let config = self.config_for(destination);
        let pages = self.composer.compose(batch, &config)?;

        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.page_delay).await;
            }
            self.deliverer.deliver(destination, page)?;
            debug!(
                destination = %destination,
                page = page.index,
                bytes = page.byte_len(),
                "delivered page"
            );
        }
        Ok(())
    }
}
