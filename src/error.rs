use crate::core::DataType;
use thiserror::Error;

/// Result type alias for graph and scheduler operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors surfaced by graph mutations, the registry, and the scheduler.
///
/// Structural errors (duplicate, not-found, type, direction) are returned
/// synchronously by the mutating operation and leave the graph unchanged.
/// `Initialization` and `Processing` carry the failing element's name so a
/// caller can tell an element-internal failure apart from a rejected
/// operation. `Stall` is a scheduler diagnostic, not necessarily fatal.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A name is already taken (element in a pipeline, pin on an element).
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// An element type id is already registered.
    #[error("duplicate element type: {0}")]
    DuplicateType(String),

    /// An element, pin, or registered type does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Buffer or pin payload types do not match.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: DataType, actual: DataType },

    /// Pins cannot be connected in the requested direction.
    #[error("direction error: {0}")]
    Direction(String),

    /// The input pin already has an incoming connection.
    #[error("input pin {element}.{pin} is already connected")]
    PinOccupied { element: String, pin: String },

    /// Element initialization failed, or was attempted twice.
    #[error("initialization of element '{element}' failed")]
    Initialization {
        element: String,
        #[source]
        source: anyhow::Error,
    },

    /// An element's process() call failed.
    #[error("element '{element}' failed during processing")]
    Processing {
        element: String,
        #[source]
        source: anyhow::Error,
    },

    /// No element was ready for the configured number of consecutive ticks
    /// while buffers remained queued.
    #[error("pipeline stalled: no element ready for {ticks} ticks, {pending} buffers pending")]
    Stall { ticks: u64, pending: usize },

    /// The pipeline lifecycle state machine rejected a transition.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}
