use super::ErrorPolicy;
use crate::core::{ElementIo, ElementState, ProcessingElement};
use crate::observability::ElementMetrics;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Wraps an element behavior with metrics recording and an error policy.
///
/// The pipeline wraps every behavior on attach, so all process() calls are
/// counted and failures are handled uniformly. An isolated element reports
/// not-ready forever; nothing else in the graph is affected.
pub struct ResilientElement {
    inner: Box<dyn ProcessingElement>,
    metrics: Arc<ElementMetrics>,
    error_policy: ErrorPolicy,
    isolated: bool,
}

impl ResilientElement {
    pub fn new(
        inner: Box<dyn ProcessingElement>,
        metrics: Arc<ElementMetrics>,
        error_policy: ErrorPolicy,
    ) -> Self {
        Self {
            inner,
            metrics,
            error_policy,
            isolated: false,
        }
    }
}

#[async_trait]
impl ProcessingElement for ResilientElement {
    async fn on_create(&mut self, config: Value) -> Result<()> {
        self.inner.on_create(config).await
    }

    async fn init(&mut self) -> Result<ElementState> {
        self.inner.init().await
    }

    fn is_ready_for_processing(&self, io: &ElementIo<'_>) -> bool {
        !self.isolated && self.inner.is_ready_for_processing(io)
    }

    async fn process(&mut self, io: &mut ElementIo<'_>) -> Result<()> {
        let start = self.metrics.start_processing();

        match self.inner.process(io).await {
            Ok(()) => {
                self.metrics.finish_processing(start);
                self.metrics.record_buffer_processed();
                Ok(())
            }
            Err(e) => {
                self.metrics.record_error();
                io.discard_staged();

                match self.error_policy {
                    ErrorPolicy::Propagate => Err(e),
                    ErrorPolicy::SkipTick => {
                        warn!("element '{}': process failed, skipping tick: {e:#}", self.metrics.element_id());
                        Ok(())
                    }
                    ErrorPolicy::Isolate => {
                        self.isolated = true;
                        warn!("element '{}': process failed, isolating: {e:#}", self.metrics.element_id());
                        Ok(())
                    }
                }
            }
        }
    }
}
