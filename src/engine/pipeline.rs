use crate::core::{
    Buffer, DataType, ElementState, Endpoint, InputPin, OutputPin, PinConnection, PipelineElement,
};
use crate::engine::state::PipelineState;
use crate::error::{PipelineError, Result};
use crate::observability::{ElementMetrics, MetricsCollector, PipelineMonitor};
use crate::registry::ElementRegistry;
use crate::resilience::{ErrorPolicy, ResilientElement};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Scheduler and graph configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Consecutive idle ticks (no element ready, buffers pending) before a
    /// stall is reported.
    pub stall_threshold: u64,
    /// Per-destination queue bound; unbounded when None. Overflow drops the
    /// oldest buffer and counts it.
    pub queue_capacity: Option<usize>,
    /// Abort init() on the first element failure instead of aggregating.
    pub require_all_init: bool,
    /// What to do when an element's process() call fails.
    pub error_policy: ErrorPolicy,
    /// Delay between ticks in run().
    pub tick_interval_ms: u64,
    /// Make run() return the stall error instead of logging and continuing.
    pub stop_on_stall: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stall_threshold: 100,
            queue_capacity: None,
            require_all_init: false,
            error_policy: ErrorPolicy::Propagate,
            tick_interval_ms: 10,
            stop_on_stall: false,
        }
    }
}

impl PipelineConfig {
    /// Read the "pipeline_config" object of a pipeline description,
    /// falling back to defaults for missing fields.
    pub fn from_json(config: &Value) -> Self {
        let defaults = Self::default();
        let section = &config["pipeline_config"];
        Self {
            stall_threshold: section["stall_threshold"]
                .as_u64()
                .unwrap_or(defaults.stall_threshold),
            queue_capacity: section["queue_capacity"].as_u64().map(|n| n as usize),
            require_all_init: section["require_all_init"]
                .as_bool()
                .unwrap_or(defaults.require_all_init),
            error_policy: match section["error_policy"].as_str() {
                Some("skip_tick") => ErrorPolicy::SkipTick,
                Some("isolate") => ErrorPolicy::Isolate,
                _ => defaults.error_policy,
            },
            tick_interval_ms: section["tick_interval_ms"]
                .as_u64()
                .unwrap_or(defaults.tick_interval_ms),
            stop_on_stall: section["stop_on_stall"]
                .as_bool()
                .unwrap_or(defaults.stop_on_stall),
        }
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// Elements whose process() ran this tick.
    pub processed: usize,
    /// Buffers queued across all connections after propagation.
    pub pending: usize,
}

/// Aggregated element initialization outcome.
#[derive(Debug, Default)]
pub struct InitReport {
    pub initialized: Vec<String>,
    /// (element name, error) for elements whose init() failed; those
    /// elements are never scheduled, the rest of the graph is unaffected.
    pub failures: Vec<(String, String)>,
}

impl InitReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of a run() loop.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub ticks: u64,
    pub processed: u64,
    pub stalls: u64,
}

/// Serializable description of the graph, for external persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineTopology {
    pub elements: Vec<ElementTopology>,
    pub connections: Vec<ConnectionTopology>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementTopology {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionTopology {
    pub from: Endpoint,
    pub to: Vec<Endpoint>,
    pub data_type: DataType,
}

/// Owning graph of elements and connections plus the tick scheduler.
///
/// Elements and connections never outlive the pipeline. Scheduling is
/// sequential within a tick, so no process() call is in flight between
/// ticks and graph mutations between ticks are race-free.
pub struct Pipeline {
    elements: HashMap<String, PipelineElement>,
    connections: Vec<Arc<PinConnection>>,
    config: PipelineConfig,
    state: PipelineState,
    collector: MetricsCollector,
    idle_ticks: u64,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            elements: HashMap::new(),
            connections: Vec::new(),
            config,
            state: PipelineState::Idle,
            collector: MetricsCollector::new(),
            idle_ticks: 0,
        }
    }

    /// Build a pipeline from a JSON description, instantiating elements
    /// through the registry.
    ///
    /// Expected shape: optional "pipeline_config", an "elements" array of
    /// `{id, type, config}` objects, and a "connections" array of
    /// `{"from": "element.pin", "to": "element.pin"}` objects. Pins are
    /// registered from the element type's metadata.
    pub async fn from_json(config: Value, registry: &ElementRegistry) -> anyhow::Result<Self> {
        let mut pipeline = Self::with_config(PipelineConfig::from_json(&config));

        if let Some(elements) = config["elements"].as_array() {
            for element_config in elements {
                let id = element_config["id"]
                    .as_str()
                    .ok_or(anyhow!("Element missing id"))?;
                let type_id = element_config["type"]
                    .as_str()
                    .ok_or(anyhow!("Element missing type"))?;

                let meta = registry.metadata(type_id)?;
                let mut behavior = meta.create_instance();
                behavior.on_create(element_config["config"].clone()).await?;

                let mut element = PipelineElement::new(id, behavior);
                for pin in &meta.inputs {
                    let data_type = DataType::parse(&pin.data_type)
                        .ok_or_else(|| anyhow!("Unknown data type: {}", pin.data_type))?;
                    element.add_input_pin(InputPin::new(&pin.id, data_type))?;
                }
                for pin in &meta.outputs {
                    let data_type = DataType::parse(&pin.data_type)
                        .ok_or_else(|| anyhow!("Unknown data type: {}", pin.data_type))?;
                    element.add_output_pin(OutputPin::new(&pin.id, data_type))?;
                }
                pipeline.add_element(element)?;
            }
        }

        if let Some(connections) = config["connections"].as_array() {
            for conn in connections {
                let from = conn["from"]
                    .as_str()
                    .ok_or(anyhow!("Connection missing from"))?;
                let to = conn["to"].as_str().ok_or(anyhow!("Connection missing to"))?;
                let (src_el, src_pin) = from
                    .split_once('.')
                    .ok_or_else(|| anyhow!("Connection endpoint '{from}' is not element.pin"))?;
                let (dst_el, dst_pin) = to
                    .split_once('.')
                    .ok_or_else(|| anyhow!("Connection endpoint '{to}' is not element.pin"))?;
                pipeline.connect(src_el, src_pin, dst_el, dst_pin)?;
            }
        }

        Ok(pipeline)
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn element(&self, name: &str) -> Option<&PipelineElement> {
        self.elements.get(name)
    }

    pub fn element_names(&self) -> Vec<String> {
        self.elements.keys().cloned().collect()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn monitor(&self) -> PipelineMonitor {
        PipelineMonitor::new(self.collector.clone())
    }

    /// Take ownership of an element. Its behavior is wrapped with metrics
    /// recording and the configured error policy.
    pub fn add_element(&mut self, mut element: PipelineElement) -> Result<()> {
        if self.elements.contains_key(element.name()) {
            return Err(PipelineError::DuplicateName(format!(
                "element '{}'",
                element.name()
            )));
        }

        let metrics = Arc::new(ElementMetrics::new(element.name()));
        self.collector.register(element.name(), metrics.clone());
        let policy = self.config.error_policy;
        element.wrap_behavior(|inner| Box::new(ResilientElement::new(inner, metrics, policy)));

        debug!("element '{}' attached", element.name());
        self.elements.insert(element.name().to_string(), element);
        Ok(())
    }

    /// Remove an element and every connection touching its pins. A missing
    /// name is a no-op. Scheduling is sequential, so no process() call can
    /// be in flight here; queued buffers on torn-down connections are
    /// released with them.
    pub fn remove_element(&mut self, name: &str) {
        let Some(element) = self.elements.remove(name) else {
            return;
        };

        let mut retained = Vec::new();
        for conn in self.connections.drain(..) {
            if conn.source().element == name {
                // detach the input pins this connection fed
                for dst in conn.destinations() {
                    if let Some(pin) = self
                        .elements
                        .get_mut(&dst.element)
                        .and_then(|el| el.pins_mut().input_mut(&dst.pin))
                    {
                        pin.unbind();
                    }
                }
                continue;
            }

            if conn.remove_destinations_of(name) == 0 {
                if let Some(pin) = self
                    .elements
                    .get_mut(&conn.source().element)
                    .and_then(|el| el.pins_mut().output_mut(&conn.source().pin))
                {
                    pin.clear_connection();
                }
                continue;
            }

            retained.push(conn);
        }
        self.connections = retained;

        debug!("element '{}' removed", element.name());
    }

    /// Connect an output pin to an input pin, creating a new connection or
    /// extending the output pin's existing fan-out.
    ///
    /// All validation happens before any mutation, so a failed connect
    /// leaves the graph unchanged.
    pub fn connect(
        &mut self,
        src_el: &str,
        src_pin: &str,
        dst_el: &str,
        dst_pin: &str,
    ) -> Result<()> {
        if src_el == dst_el {
            return Err(PipelineError::Direction(format!(
                "cannot connect element '{src_el}' to itself: zero-length cycle"
            )));
        }

        let src_type = {
            let src = self
                .elements
                .get(src_el)
                .ok_or_else(|| PipelineError::NotFound(format!("element '{src_el}'")))?;
            match src.output_pin(src_pin) {
                Some(pin) => pin.data_type(),
                None if src.input_pin(src_pin).is_some() => {
                    return Err(PipelineError::Direction(format!(
                        "{src_el}.{src_pin} is an input pin, expected an output"
                    )))
                }
                None => {
                    return Err(PipelineError::NotFound(format!("pin '{src_el}.{src_pin}'")))
                }
            }
        };

        {
            let dst = self
                .elements
                .get(dst_el)
                .ok_or_else(|| PipelineError::NotFound(format!("element '{dst_el}'")))?;
            let pin = match dst.input_pin(dst_pin) {
                Some(pin) => pin,
                None if dst.output_pin(dst_pin).is_some() => {
                    return Err(PipelineError::Direction(format!(
                        "{dst_el}.{dst_pin} is an output pin, expected an input"
                    )))
                }
                None => {
                    return Err(PipelineError::NotFound(format!("pin '{dst_el}.{dst_pin}'")))
                }
            };
            if pin.data_type() != src_type {
                return Err(PipelineError::TypeMismatch {
                    expected: src_type,
                    actual: pin.data_type(),
                });
            }
            if pin.is_connected() {
                return Err(PipelineError::PinOccupied {
                    element: dst_el.to_string(),
                    pin: dst_pin.to_string(),
                });
            }
        }

        let existing = self
            .elements
            .get(src_el)
            .and_then(|el| el.output_pin(src_pin))
            .and_then(|pin| pin.connection())
            .cloned();
        let conn = match existing {
            Some(conn) => conn,
            None => {
                let conn = Arc::new(PinConnection::new(
                    src_type,
                    Endpoint::new(src_el, src_pin),
                ));
                if let Some(pin) = self
                    .elements
                    .get_mut(src_el)
                    .and_then(|el| el.pins_mut().output_mut(src_pin))
                {
                    pin.set_connection(conn.clone());
                }
                self.connections.push(conn.clone());
                conn
            }
        };

        let endpoint = Endpoint::new(dst_el, dst_pin);
        conn.add_destination(endpoint.clone(), self.config.queue_capacity);
        if let Some(pin) = self
            .elements
            .get_mut(dst_el)
            .and_then(|el| el.pins_mut().input_mut(dst_pin))
        {
            pin.bind(conn, endpoint);
        }

        debug!("connected {src_el}.{src_pin} -> {dst_el}.{dst_pin}");
        Ok(())
    }

    /// Initialize every uninitialized element, producers before consumers
    /// where the graph is acyclic. Failures are aggregated per element
    /// unless `require_all_init` is set; a failed element is never
    /// scheduled but the rest of the graph keeps operating.
    pub async fn init(&mut self) -> Result<InitReport> {
        self.transition_to(PipelineState::Initializing)?;

        let mut report = InitReport::default();
        for name in self.init_order() {
            let Some(element) = self.elements.get_mut(&name) else {
                continue;
            };
            if element.state() != ElementState::Uninitialized {
                debug!("element '{name}' already initialized, skipping");
                continue;
            }
            match element.initialize().await {
                Ok(state) => {
                    debug!("element '{name}' initialized: {state:?}");
                    report.initialized.push(name);
                }
                Err(e) => {
                    warn!("element '{name}' failed to initialize: {e}");
                    if self.config.require_all_init {
                        self.state = PipelineState::Error {
                            error_msg: e.to_string(),
                            recoverable: false,
                        };
                        return Err(e);
                    }
                    report.failures.push((name, e.to_string()));
                }
            }
        }

        self.transition_to(PipelineState::Running {
            start_time: Some(Instant::now()),
            ticks: 0,
        })?;
        Ok(report)
    }

    /// Initialize a single element, for elements attached while the
    /// pipeline is already running.
    pub async fn init_element(&mut self, name: &str) -> Result<ElementState> {
        match self.elements.get_mut(name) {
            Some(element) => element.initialize().await,
            None => Err(PipelineError::NotFound(format!("element '{name}'"))),
        }
    }

    /// Run one scheduling tick.
    ///
    /// Readiness is snapshotted first; every ready element's process() is
    /// then invoked, and staged outputs are propagated to connection
    /// queues only after the last one returns. An element therefore only
    /// ever observes buffers produced in strictly earlier ticks; callers
    /// needing cross-element ordering within a tick must express it as a
    /// pin dependency.
    pub async fn tick(&mut self) -> Result<TickReport> {
        if !matches!(self.state, PipelineState::Running { .. }) {
            return Err(PipelineError::InvalidTransition {
                from: self.state.name().to_string(),
                to: "Running".to_string(),
            });
        }

        let mut ready = Vec::new();
        for (name, element) in self.elements.iter_mut() {
            if element.state() == ElementState::Uninitialized {
                continue;
            }
            let is_ready = element.ready();
            element.set_state(if is_ready {
                ElementState::Ready
            } else {
                ElementState::NotReady
            });
            if is_ready {
                ready.push(name.clone());
            }
        }

        let mut staged: Vec<(Arc<PinConnection>, Buffer)> = Vec::new();
        let mut processed = 0;
        for name in &ready {
            let Some(element) = self.elements.get_mut(name) else {
                continue;
            };
            match element.invoke_process().await {
                Ok(outputs) => {
                    processed += 1;
                    for (pin, buffer) in outputs {
                        match element.output_pin(&pin).and_then(|p| p.connection()) {
                            Some(conn) => staged.push((conn.clone(), buffer)),
                            None => debug!(
                                "element '{name}': output pin '{pin}' not connected, buffer dropped"
                            ),
                        }
                    }
                }
                Err(source) => {
                    self.state = PipelineState::Error {
                        error_msg: source.to_string(),
                        recoverable: false,
                    };
                    return Err(PipelineError::Processing {
                        element: name.clone(),
                        source,
                    });
                }
            }
        }

        for (conn, buffer) in staged {
            conn.push(buffer)?;
        }

        if let PipelineState::Running { ticks, .. } = &mut self.state {
            *ticks += 1;
        }

        let pending = self.pending_buffers();
        if processed == 0 && pending > 0 {
            self.idle_ticks += 1;
            if self.idle_ticks >= self.config.stall_threshold {
                let ticks = self.idle_ticks;
                self.idle_ticks = 0;
                warn!("pipeline stalled: no element ready for {ticks} ticks, {pending} buffers pending");
                return Err(PipelineError::Stall { ticks, pending });
            }
        } else {
            self.idle_ticks = 0;
        }

        Ok(TickReport { processed, pending })
    }

    /// Drive the scheduler for a fixed number of ticks.
    ///
    /// Stalls are surfaced to the log and counted but do not stop the
    /// loop unless `stop_on_stall` is configured; external input may
    /// resolve them.
    pub async fn run(&mut self, ticks: u64) -> Result<RunReport> {
        let mut report = RunReport::default();
        for _ in 0..ticks {
            match self.tick().await {
                Ok(t) => report.processed += t.processed as u64,
                Err(PipelineError::Stall { ticks, pending }) => {
                    report.stalls += 1;
                    if self.config.stop_on_stall {
                        return Err(PipelineError::Stall { ticks, pending });
                    }
                }
                Err(e) => return Err(e),
            }
            report.ticks += 1;
            tokio::time::sleep(Duration::from_millis(self.config.tick_interval_ms)).await;
        }
        Ok(report)
    }

    /// Stop scheduling and mark the pipeline completed.
    pub fn stop(&mut self) -> Result<()> {
        if let PipelineState::Running { start_time, ticks } = &self.state {
            let duration = start_time.map(|t| t.elapsed());
            let total_ticks = *ticks;
            self.transition_to(PipelineState::Completed {
                duration,
                total_ticks,
            })?;
        }
        Ok(())
    }

    /// Buffers currently queued across all connections.
    pub fn pending_buffers(&self) -> usize {
        self.connections.iter().map(|c| c.total_pending()).sum()
    }

    /// Serializable view of the graph: element names, pin names, and
    /// connection endpoints.
    pub fn topology(&self) -> PipelineTopology {
        let mut elements: Vec<ElementTopology> = self
            .elements
            .values()
            .map(|el| {
                let mut inputs = el.input_pin_names();
                let mut outputs = el.output_pin_names();
                inputs.sort();
                outputs.sort();
                ElementTopology {
                    name: el.name().to_string(),
                    inputs,
                    outputs,
                }
            })
            .collect();
        elements.sort_by(|a, b| a.name.cmp(&b.name));

        let mut connections: Vec<ConnectionTopology> = self
            .connections
            .iter()
            .map(|conn| ConnectionTopology {
                from: conn.source().clone(),
                to: conn.destinations(),
                data_type: conn.data_type(),
            })
            .collect();
        connections.sort_by(|a, b| (&a.from.element, &a.from.pin).cmp(&(&b.from.element, &b.from.pin)));

        PipelineTopology {
            elements,
            connections,
        }
    }

    fn transition_to(&mut self, new_state: PipelineState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(PipelineError::InvalidTransition {
                from: self.state.name().to_string(),
                to: new_state.name().to_string(),
            });
        }
        self.state = new_state;
        Ok(())
    }

    /// Element names in producer-before-consumer order for the acyclic
    /// part of the graph; elements on cycles follow in arbitrary order.
    fn init_order(&self) -> Vec<String> {
        let mut indegree: HashMap<String, usize> =
            self.elements.keys().map(|name| (name.clone(), 0)).collect();
        let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
        let mut seen_edges = HashSet::new();

        for conn in &self.connections {
            let src = conn.source().element.clone();
            for dst in conn.destinations() {
                if seen_edges.insert((src.clone(), dst.element.clone())) {
                    adjacency.entry(src.clone()).or_default().push(dst.element.clone());
                    if let Some(count) = indegree.get_mut(&dst.element) {
                        *count += 1;
                    }
                }
            }
        }

        let mut queue: VecDeque<String> = indegree
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(name, _)| name.clone())
            .collect();
        let mut order = Vec::with_capacity(self.elements.len());

        while let Some(name) = queue.pop_front() {
            order.push(name.clone());
            for next in adjacency.get(&name).into_iter().flatten() {
                if let Some(count) = indegree.get_mut(next) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(next.clone());
                    }
                }
            }
        }

        // cycles: whatever Kahn's algorithm could not order
        let placed: HashSet<&String> = order.iter().collect();
        let remaining: Vec<String> = self
            .elements
            .keys()
            .filter(|name| !placed.contains(name))
            .cloned()
            .collect();
        order.extend(remaining);

        order
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
