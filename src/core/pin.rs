use super::connection::{Endpoint, PinConnection};
use super::{Buffer, DataType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Direction of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    Input,
    Output,
}

/// Named, typed endpoint receiving buffers into an element.
///
/// An input pin accepts at most one incoming connection.
#[derive(Debug)]
pub struct InputPin {
    name: String,
    data_type: DataType,
    binding: Option<InputBinding>,
}

#[derive(Debug)]
struct InputBinding {
    connection: Arc<PinConnection>,
    endpoint: Endpoint,
}

impl InputPin {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            binding: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn direction(&self) -> PinDirection {
        PinDirection::Input
    }

    pub fn is_connected(&self) -> bool {
        self.binding.is_some()
    }

    /// Buffers currently queued for this pin. Zero when unconnected.
    pub fn pending(&self) -> usize {
        self.binding
            .as_ref()
            .map(|b| b.connection.pending(&b.endpoint))
            .unwrap_or(0)
    }

    /// Dequeue the oldest queued buffer, releasing this pin's ownership
    /// share when the returned handle is dropped. Never blocks.
    pub fn pop(&self) -> Option<Buffer> {
        self.binding
            .as_ref()
            .and_then(|b| b.connection.pop(&b.endpoint))
    }

    pub(crate) fn bind(&mut self, connection: Arc<PinConnection>, endpoint: Endpoint) {
        self.binding = Some(InputBinding {
            connection,
            endpoint,
        });
    }

    pub(crate) fn unbind(&mut self) {
        self.binding = None;
    }

    pub(crate) fn connection(&self) -> Option<&Arc<PinConnection>> {
        self.binding.as_ref().map(|b| &b.connection)
    }
}

/// Named, typed endpoint sending buffers out of an element.
///
/// An output pin fans out through a single connection to any number of
/// matching-type input pins.
#[derive(Debug)]
pub struct OutputPin {
    name: String,
    data_type: DataType,
    connection: Option<Arc<PinConnection>>,
}

impl OutputPin {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            connection: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn direction(&self) -> PinDirection {
        PinDirection::Output
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub(crate) fn connection(&self) -> Option<&Arc<PinConnection>> {
        self.connection.as_ref()
    }

    pub(crate) fn set_connection(&mut self, connection: Arc<PinConnection>) {
        self.connection = Some(connection);
    }

    pub(crate) fn clear_connection(&mut self) {
        self.connection = None;
    }
}
