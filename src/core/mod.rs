pub mod buffer;
pub mod connection;
pub mod element;
pub mod pin;

pub use buffer::{now_micros, AudioBlock, Buffer, DataType, Payload, VideoFrame};
pub use connection::{Endpoint, PinConnection};
pub use element::{ElementIo, ElementState, PinSet, PipelineElement, ProcessingElement};
pub use pin::{InputPin, OutputPin, PinDirection};
