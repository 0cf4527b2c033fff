use super::ElementMetrics;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub element_id: String,
    pub buffers_processed: u64,
    pub errors_count: u64,
    pub avg_latency_us: u64,
}

/// Holds the metrics handles of every element attached to a pipeline.
pub struct MetricsCollector {
    metrics: HashMap<String, Arc<ElementMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            metrics: HashMap::new(),
        }
    }

    pub fn register(&mut self, element_id: impl Into<String>, metrics: Arc<ElementMetrics>) {
        self.metrics.insert(element_id.into(), metrics);
    }

    pub fn snapshot(&self) -> HashMap<String, MetricsSnapshot> {
        self.metrics
            .iter()
            .map(|(id, metrics)| {
                (
                    id.clone(),
                    MetricsSnapshot {
                        element_id: metrics.element_id().to_string(),
                        buffers_processed: metrics.buffers_processed(),
                        errors_count: metrics.errors_count(),
                        avg_latency_us: metrics.avg_latency_us(),
                    },
                )
            })
            .collect()
    }

    pub fn element_metrics(&self, element_id: &str) -> Option<Arc<ElementMetrics>> {
        self.metrics.get(element_id).cloned()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MetricsCollector {
    fn clone(&self) -> Self {
        Self {
            metrics: self.metrics.clone(),
        }
    }
}
