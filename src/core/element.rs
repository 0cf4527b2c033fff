use super::pin::{InputPin, OutputPin};
use super::Buffer;
use crate::error::PipelineError;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Lifecycle state of a pipeline element.
///
/// `Uninitialized` is the only state from which `process()` must never be
/// invoked; the scheduler enforces this. After a successful `init()` the
/// element moves between `NotReady` and `Ready` per tick, driven by its
/// readiness predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementState {
    Uninitialized,
    NotReady,
    Ready,
}

/// Behavior contract for all processing elements in a pipeline.
#[async_trait]
pub trait ProcessingElement: Send + Sync {
    /// Called once when the element is instantiated with config from JSON.
    async fn on_create(&mut self, _config: Value) -> Result<()> {
        Ok(())
    }

    /// One-time setup; returns the resulting lifecycle state. Called at
    /// most once per element. The default needs no resources.
    async fn init(&mut self) -> Result<ElementState> {
        Ok(ElementState::Ready)
    }

    /// Pure readiness predicate, queried by the scheduler every tick.
    ///
    /// The default returns true only when every input pin has at least one
    /// buffer queued. Sources and state-machine elements override this to
    /// surface asynchronous or partial-input readiness.
    fn is_ready_for_processing(&self, io: &ElementIo<'_>) -> bool {
        io.all_inputs_pending()
    }

    /// Consume available input buffers, stage zero or more output buffers.
    ///
    /// Must return promptly; blocking I/O belongs in a concrete element's
    /// own internal buffering, never in this call.
    async fn process(&mut self, io: &mut ElementIo<'_>) -> Result<()>;
}

/// Pin registry of an element, input and output pins indexed by name.
#[derive(Debug, Default)]
pub struct PinSet {
    inputs: HashMap<String, InputPin>,
    outputs: HashMap<String, OutputPin>,
}

impl PinSet {
    pub fn input(&self, name: &str) -> Option<&InputPin> {
        self.inputs.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&OutputPin> {
        self.outputs.get(name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &InputPin> {
        self.inputs.values()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &OutputPin> {
        self.outputs.values()
    }

    pub fn input_names(&self) -> Vec<String> {
        self.inputs.keys().cloned().collect()
    }

    pub fn output_names(&self) -> Vec<String> {
        self.outputs.keys().cloned().collect()
    }

    pub(crate) fn input_mut(&mut self, name: &str) -> Option<&mut InputPin> {
        self.inputs.get_mut(name)
    }

    pub(crate) fn output_mut(&mut self, name: &str) -> Option<&mut OutputPin> {
        self.outputs.get_mut(name)
    }

    fn add_input(&mut self, pin: InputPin) -> Result<(), PipelineError> {
        if self.inputs.contains_key(pin.name()) {
            return Err(PipelineError::DuplicateName(format!(
                "input pin '{}'",
                pin.name()
            )));
        }
        self.inputs.insert(pin.name().to_string(), pin);
        Ok(())
    }

    fn add_output(&mut self, pin: OutputPin) -> Result<(), PipelineError> {
        if self.outputs.contains_key(pin.name()) {
            return Err(PipelineError::DuplicateName(format!(
                "output pin '{}'",
                pin.name()
            )));
        }
        self.outputs.insert(pin.name().to_string(), pin);
        Ok(())
    }
}

/// Per-invocation view of an element's pins.
///
/// `process()` pops inputs directly from connection queues and stages its
/// outputs here; the scheduler propagates staged buffers to connections
/// only after every `process()` call of the tick has returned, so a tick
/// observes only buffers produced in strictly earlier ticks.
pub struct ElementIo<'a> {
    pins: &'a PinSet,
    staged: Vec<(String, Buffer)>,
}

impl<'a> ElementIo<'a> {
    pub(crate) fn new(pins: &'a PinSet) -> Self {
        Self {
            pins,
            staged: Vec::new(),
        }
    }

    /// Dequeue the oldest buffer queued on the named input pin. Returns
    /// `None` for an empty queue, an unconnected pin, or an unknown name;
    /// never blocks.
    pub fn pop(&self, pin: &str) -> Option<Buffer> {
        self.pins.input(pin).and_then(|p| p.pop())
    }

    /// Buffers currently queued on the named input pin.
    pub fn pending(&self, pin: &str) -> usize {
        self.pins.input(pin).map(|p| p.pending()).unwrap_or(0)
    }

    /// True when every input pin has at least one buffer queued.
    pub fn all_inputs_pending(&self) -> bool {
        self.pins.inputs().all(|p| p.pending() > 0)
    }

    /// Stage a buffer for the named output pin, checked against the pin's
    /// declared type. The buffer reaches the connection at end of tick.
    pub fn push(&mut self, pin: &str, buffer: Buffer) -> Result<(), PipelineError> {
        let out = self
            .pins
            .output(pin)
            .ok_or_else(|| PipelineError::NotFound(format!("output pin '{pin}'")))?;
        if buffer.data_type() != out.data_type() {
            return Err(PipelineError::TypeMismatch {
                expected: out.data_type(),
                actual: buffer.data_type(),
            });
        }
        self.staged.push((pin.to_string(), buffer));
        Ok(())
    }

    /// Drop everything staged so far (used when a process() call fails).
    pub(crate) fn discard_staged(&mut self) {
        self.staged.clear();
    }

    pub(crate) fn into_staged(self) -> Vec<(String, Buffer)> {
        self.staged
    }
}

/// Named processing node: lifecycle state, pin registry, and behavior.
///
/// Owned by exactly one `Pipeline` at a time (ownership moves into the
/// pipeline on attach); pins and their connections are torn down when the
/// element is removed.
pub struct PipelineElement {
    name: String,
    state: ElementState,
    pins: PinSet,
    behavior: Box<dyn ProcessingElement>,
}

impl PipelineElement {
    pub fn new(name: impl Into<String>, behavior: Box<dyn ProcessingElement>) -> Self {
        Self {
            name: name.into(),
            state: ElementState::Uninitialized,
            pins: PinSet::default(),
            behavior,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ElementState {
        self.state
    }

    /// Register an input pin under its name.
    pub fn add_input_pin(&mut self, pin: InputPin) -> Result<(), PipelineError> {
        self.pins.add_input(pin)
    }

    /// Register an output pin under its name.
    pub fn add_output_pin(&mut self, pin: OutputPin) -> Result<(), PipelineError> {
        self.pins.add_output(pin)
    }

    /// The input pin with that name, or `None` if none exists.
    pub fn input_pin(&self, name: &str) -> Option<&InputPin> {
        self.pins.input(name)
    }

    /// The output pin with that name, or `None` if none exists.
    pub fn output_pin(&self, name: &str) -> Option<&OutputPin> {
        self.pins.output(name)
    }

    pub fn input_pin_names(&self) -> Vec<String> {
        self.pins.input_names()
    }

    pub fn output_pin_names(&self) -> Vec<String> {
        self.pins.output_names()
    }

    /// Run the element's one-time setup. A second call is an error.
    pub async fn initialize(&mut self) -> Result<ElementState, PipelineError> {
        if self.state != ElementState::Uninitialized {
            return Err(PipelineError::Initialization {
                element: self.name.clone(),
                source: anyhow::anyhow!("init() already called"),
            });
        }
        match self.behavior.init().await {
            Ok(state) => {
                self.state = state;
                Ok(state)
            }
            Err(source) => Err(PipelineError::Initialization {
                element: self.name.clone(),
                source,
            }),
        }
    }

    pub(crate) fn pins(&self) -> &PinSet {
        &self.pins
    }

    pub(crate) fn pins_mut(&mut self) -> &mut PinSet {
        &mut self.pins
    }

    pub(crate) fn set_state(&mut self, state: ElementState) {
        self.state = state;
    }

    pub(crate) fn ready(&self) -> bool {
        if self.state == ElementState::Uninitialized {
            return false;
        }
        let io = ElementIo::new(&self.pins);
        self.behavior.is_ready_for_processing(&io)
    }

    /// Invoke process() and hand back whatever it staged.
    pub(crate) async fn invoke_process(&mut self) -> Result<Vec<(String, Buffer)>> {
        let mut io = ElementIo::new(&self.pins);
        self.behavior.process(&mut io).await?;
        Ok(io.into_staged())
    }

    pub(crate) fn wrap_behavior(
        &mut self,
        wrap: impl FnOnce(Box<dyn ProcessingElement>) -> Box<dyn ProcessingElement>,
    ) {
        let inner = std::mem::replace(&mut self.behavior, Box::new(Detached));
        self.behavior = wrap(inner);
    }
}

impl std::fmt::Debug for PipelineElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineElement")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("inputs", &self.pins.input_names())
            .field("outputs", &self.pins.output_names())
            .finish()
    }
}

/// Placeholder behavior held only inside `wrap_behavior`.
struct Detached;

#[async_trait]
impl ProcessingElement for Detached {
    async fn process(&mut self, _io: &mut ElementIo<'_>) -> Result<()> {
        anyhow::bail!("element behavior is detached")
    }
}
