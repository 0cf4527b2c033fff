use super::{Buffer, DataType};
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use tracing::warn;

/// Address of a pin: owning element name plus pin name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub element: String,
    pub pin: String,
}

impl Endpoint {
    pub fn new(element: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            pin: pin.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.element, self.pin)
    }
}

/// Directed edge from one output pin to one or more input pins.
///
/// Each destination has its own FIFO queue; a push enqueues one ownership
/// share per destination under a single lock acquisition, so consumers
/// never observe a partially-pushed fan-out. Queues are unbounded unless a
/// capacity is configured, in which case the oldest buffer is dropped on
/// overflow and counted.
#[derive(Debug)]
pub struct PinConnection {
    data_type: DataType,
    source: Endpoint,
    state: Mutex<ConnectionState>,
}

#[derive(Debug)]
struct ConnectionState {
    destinations: Vec<Destination>,
}

#[derive(Debug)]
struct Destination {
    endpoint: Endpoint,
    queue: VecDeque<Buffer>,
    capacity: Option<usize>,
    dropped: u64,
}

impl PinConnection {
    pub fn new(data_type: DataType, source: Endpoint) -> Self {
        Self {
            data_type,
            source,
            state: Mutex::new(ConnectionState {
                destinations: Vec::new(),
            }),
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn source(&self) -> &Endpoint {
        &self.source
    }

    /// Register a destination input pin. Normally called through
    /// `Pipeline::connect`.
    pub fn add_destination(&self, endpoint: Endpoint, capacity: Option<usize>) {
        let mut state = self.lock();
        state.destinations.push(Destination {
            endpoint,
            queue: VecDeque::new(),
            capacity,
            dropped: 0,
        });
    }

    /// Drop every destination owned by the given element. Returns the number
    /// of destinations left afterwards.
    pub(crate) fn remove_destinations_of(&self, element: &str) -> usize {
        let mut state = self.lock();
        state.destinations.retain(|d| d.endpoint.element != element);
        state.destinations.len()
    }

    pub fn destinations(&self) -> Vec<Endpoint> {
        self.lock()
            .destinations
            .iter()
            .map(|d| d.endpoint.clone())
            .collect()
    }

    /// Enqueue the buffer for every destination.
    ///
    /// All destinations observe the push or none do. Fails when the buffer's
    /// type tag does not match the connection's declared type.
    pub fn push(&self, buffer: Buffer) -> Result<(), PipelineError> {
        if buffer.data_type() != self.data_type {
            return Err(PipelineError::TypeMismatch {
                expected: self.data_type,
                actual: buffer.data_type(),
            });
        }

        let mut state = self.lock();
        for dest in state.destinations.iter_mut() {
            if let Some(capacity) = dest.capacity {
                if dest.queue.len() >= capacity {
                    dest.queue.pop_front();
                    dest.dropped += 1;
                    warn!(
                        "connection {} -> {}: queue full, dropped oldest buffer ({} total)",
                        self.source, dest.endpoint, dest.dropped
                    );
                }
            }
            dest.queue.push_back(buffer.clone());
        }
        Ok(())
    }

    /// Dequeue the oldest buffer for a specific destination. Never blocks.
    pub fn pop(&self, dst: &Endpoint) -> Option<Buffer> {
        let mut state = self.lock();
        state
            .destinations
            .iter_mut()
            .find(|d| &d.endpoint == dst)
            .and_then(|d| d.queue.pop_front())
    }

    pub fn pending(&self, dst: &Endpoint) -> usize {
        self.lock()
            .destinations
            .iter()
            .find(|d| &d.endpoint == dst)
            .map(|d| d.queue.len())
            .unwrap_or(0)
    }

    pub fn total_pending(&self) -> usize {
        self.lock().destinations.iter().map(|d| d.queue.len()).sum()
    }

    /// Buffers discarded at this destination due to a full queue.
    pub fn dropped(&self, dst: &Endpoint) -> u64 {
        self.lock()
            .destinations
            .iter()
            .find(|d| &d.endpoint == dst)
            .map(|d| d.dropped)
            .unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
