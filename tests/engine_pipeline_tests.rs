use anyhow::Result;
use async_trait::async_trait;
use framewire::core::{
    DataType, ElementIo, InputPin, OutputPin, PipelineElement, ProcessingElement,
};
use framewire::engine::Pipeline;
use framewire::error::PipelineError;
use framewire::registry::ElementRegistry;

struct Noop;

#[async_trait]
impl ProcessingElement for Noop {
    async fn process(&mut self, _io: &mut ElementIo<'_>) -> Result<()> {
        Ok(())
    }
}

fn element(name: &str, inputs: &[(&str, DataType)], outputs: &[(&str, DataType)]) -> PipelineElement {
    let mut el = PipelineElement::new(name, Box::new(Noop));
    for (pin, data_type) in inputs {
        el.add_input_pin(InputPin::new(*pin, *data_type)).unwrap();
    }
    for (pin, data_type) in outputs {
        el.add_output_pin(OutputPin::new(*pin, *data_type)).unwrap();
    }
    el
}

fn frame_pair() -> Pipeline {
    let mut pipeline = Pipeline::new();
    pipeline
        .add_element(element("a", &[], &[("out", DataType::Frame)]))
        .unwrap();
    pipeline
        .add_element(element("b", &[("in", DataType::Frame)], &[]))
        .unwrap();
    pipeline
}

#[test]
fn test_add_element_duplicate_name_rejected() {
    let mut pipeline = Pipeline::new();
    pipeline.add_element(element("a", &[], &[])).unwrap();

    let err = pipeline.add_element(element("a", &[], &[])).unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateName(_)));
    assert_eq!(pipeline.element_count(), 1);
}

#[test]
fn test_connect_resolves_pins() {
    let mut pipeline = frame_pair();
    pipeline.connect("a", "out", "b", "in").unwrap();

    assert_eq!(pipeline.connection_count(), 1);
    assert!(pipeline.element("b").unwrap().input_pin("in").unwrap().is_connected());
    assert!(pipeline.element("a").unwrap().output_pin("out").unwrap().is_connected());
}

#[test]
fn test_connect_missing_element_or_pin() {
    let mut pipeline = frame_pair();

    let err = pipeline.connect("ghost", "out", "b", "in").unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));

    let err = pipeline.connect("a", "ghost", "b", "in").unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));

    let err = pipeline.connect("a", "out", "b", "ghost").unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));

    assert_eq!(pipeline.connection_count(), 0);
}

#[test]
fn test_connect_direction_errors() {
    let mut pipeline = frame_pair();

    // input pin offered as source
    let err = pipeline.connect("b", "in", "a", "out").unwrap_err();
    assert!(matches!(err, PipelineError::Direction(_)));

    assert_eq!(pipeline.connection_count(), 0);
}

#[test]
fn test_connect_self_loop_rejected() {
    let mut pipeline = Pipeline::new();
    pipeline
        .add_element(element(
            "loopy",
            &[("in", DataType::Frame)],
            &[("out", DataType::Frame)],
        ))
        .unwrap();

    let err = pipeline.connect("loopy", "out", "loopy", "in").unwrap_err();
    assert!(matches!(err, PipelineError::Direction(_)));
    assert_eq!(pipeline.connection_count(), 0);
}

#[test]
fn test_multi_element_cycle_allowed() {
    let mut pipeline = Pipeline::new();
    pipeline
        .add_element(element(
            "a",
            &[("in", DataType::Frame)],
            &[("out", DataType::Frame)],
        ))
        .unwrap();
    pipeline
        .add_element(element(
            "b",
            &[("in", DataType::Frame)],
            &[("out", DataType::Frame)],
        ))
        .unwrap();

    pipeline.connect("a", "out", "b", "in").unwrap();
    pipeline.connect("b", "out", "a", "in").unwrap();
    assert_eq!(pipeline.connection_count(), 2);
}

#[test]
fn test_connect_type_mismatch_leaves_graph_unchanged() {
    let mut pipeline = Pipeline::new();
    pipeline
        .add_element(element("a", &[], &[("out", DataType::Frame)]))
        .unwrap();
    pipeline
        .add_element(element("b", &[("in", DataType::Audio)], &[]))
        .unwrap();

    let err = pipeline.connect("a", "out", "b", "in").unwrap_err();
    assert!(matches!(err, PipelineError::TypeMismatch { .. }));

    // no partial connection
    assert_eq!(pipeline.connection_count(), 0);
    assert!(!pipeline.element("b").unwrap().input_pin("in").unwrap().is_connected());
    assert!(!pipeline.element("a").unwrap().output_pin("out").unwrap().is_connected());
}

#[test]
fn test_connect_occupied_input_pin_rejected() {
    let mut pipeline = frame_pair();
    pipeline
        .add_element(element("c", &[], &[("out", DataType::Frame)]))
        .unwrap();

    pipeline.connect("a", "out", "b", "in").unwrap();
    let err = pipeline.connect("c", "out", "b", "in").unwrap_err();
    assert!(matches!(err, PipelineError::PinOccupied { .. }));
    assert_eq!(pipeline.connection_count(), 1);
}

#[test]
fn test_fanout_extends_existing_connection() {
    let mut pipeline = frame_pair();
    pipeline
        .add_element(element("c", &[("in", DataType::Frame)], &[]))
        .unwrap();

    pipeline.connect("a", "out", "b", "in").unwrap();
    pipeline.connect("a", "out", "c", "in").unwrap();

    // one connection, two destinations
    assert_eq!(pipeline.connection_count(), 1);
    let topology = pipeline.topology();
    assert_eq!(topology.connections.len(), 1);
    assert_eq!(topology.connections[0].to.len(), 2);
}

#[test]
fn test_remove_element_tears_down_connections() {
    let mut pipeline = frame_pair();
    pipeline.connect("a", "out", "b", "in").unwrap();

    pipeline.remove_element("a");

    assert!(pipeline.element("a").is_none());
    assert_eq!(pipeline.connection_count(), 0);
    assert_eq!(pipeline.topology().connections.len(), 0);

    // the surviving element is intact, its pin just unbound
    let b = pipeline.element("b").unwrap();
    assert!(!b.input_pin("in").unwrap().is_connected());
}

#[test]
fn test_remove_destination_side_drops_connection() {
    let mut pipeline = frame_pair();
    pipeline.connect("a", "out", "b", "in").unwrap();

    pipeline.remove_element("b");

    assert_eq!(pipeline.connection_count(), 0);
    assert!(!pipeline.element("a").unwrap().output_pin("out").unwrap().is_connected());
}

#[test]
fn test_remove_absent_element_is_noop() {
    let mut pipeline = frame_pair();
    pipeline.remove_element("ghost");
    assert_eq!(pipeline.element_count(), 2);
}

#[test]
fn test_remove_unconnected_element_leaves_other_untouched() {
    let mut pipeline = frame_pair();

    pipeline.remove_element("a");

    let b = pipeline.element("b").unwrap();
    assert_eq!(b.name(), "b");
    assert_eq!(b.input_pin_names(), vec!["in"]);
}

#[tokio::test]
async fn test_from_json_builds_graph() {
    let registry = ElementRegistry::discover().unwrap();
    let config = serde_json::json!({
        "elements": [
            {"id": "src", "type": "testframesource", "config": {"width": 8, "height": 8, "frame_limit": 2}},
            {"id": "bright", "type": "brightness", "config": {"offset": 10.0}},
            {"id": "sink", "type": "framestats", "config": {"label": "Test"}}
        ],
        "connections": [
            {"from": "src.out", "to": "bright.in"},
            {"from": "bright.out", "to": "sink.in"}
        ]
    });

    let pipeline = Pipeline::from_json(config, &registry).await.unwrap();
    assert_eq!(pipeline.element_count(), 3);
    assert_eq!(pipeline.connection_count(), 2);
}

#[tokio::test]
async fn test_from_json_unknown_type_fails() {
    let registry = ElementRegistry::discover().unwrap();
    let config = serde_json::json!({
        "elements": [
            {"id": "x", "type": "does_not_exist", "config": {}}
        ]
    });

    let result = Pipeline::from_json(config, &registry).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_from_json_config_file_roundtrip() {
    let config = serde_json::json!({
        "pipeline_config": {"stall_threshold": 25},
        "elements": [
            {"id": "src", "type": "testframesource", "config": {"width": 4, "height": 4}}
        ],
        "connections": []
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let registry = ElementRegistry::discover().unwrap();
    let pipeline = Pipeline::from_json(loaded, &registry).await.unwrap();

    assert_eq!(pipeline.element_count(), 1);
    assert_eq!(pipeline.config().stall_threshold, 25);
}

#[test]
fn test_topology_serializes() {
    let mut pipeline = frame_pair();
    pipeline.connect("a", "out", "b", "in").unwrap();

    let topology = pipeline.topology();
    assert_eq!(topology.elements.len(), 2);
    assert_eq!(topology.elements[0].name, "a");
    assert_eq!(topology.connections[0].from.element, "a");
    assert_eq!(topology.connections[0].to[0].element, "b");

    let json = serde_json::to_string(&topology).unwrap();
    assert!(json.contains("\"a\""));
    assert!(json.contains("\"out\""));
}
