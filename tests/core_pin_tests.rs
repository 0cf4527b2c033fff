use anyhow::Result;
use async_trait::async_trait;
use framewire::core::{
    DataType, ElementIo, InputPin, OutputPin, PinDirection, PipelineElement, ProcessingElement,
};
use framewire::error::PipelineError;

struct Noop;

#[async_trait]
impl ProcessingElement for Noop {
    async fn process(&mut self, _io: &mut ElementIo<'_>) -> Result<()> {
        Ok(())
    }
}

#[test]
fn test_pin_attributes() {
    let input = InputPin::new("in", DataType::Frame);
    assert_eq!(input.name(), "in");
    assert_eq!(input.data_type(), DataType::Frame);
    assert_eq!(input.direction(), PinDirection::Input);
    assert!(!input.is_connected());

    let output = OutputPin::new("out", DataType::Audio);
    assert_eq!(output.name(), "out");
    assert_eq!(output.data_type(), DataType::Audio);
    assert_eq!(output.direction(), PinDirection::Output);
    assert!(!output.is_connected());
}

#[test]
fn test_unconnected_input_pin_is_empty() {
    let input = InputPin::new("in", DataType::Frame);
    assert_eq!(input.pending(), 0);
    assert!(input.pop().is_none());
}

#[test]
fn test_add_pins_and_lookup() {
    let mut element = PipelineElement::new("node", Box::new(Noop));
    element
        .add_input_pin(InputPin::new("in", DataType::Frame))
        .unwrap();
    element
        .add_output_pin(OutputPin::new("out", DataType::Frame))
        .unwrap();

    assert!(element.input_pin("in").is_some());
    assert!(element.output_pin("out").is_some());

    // missing names report None, never an error
    assert!(element.input_pin("nonexistent").is_none());
    assert!(element.output_pin("nonexistent").is_none());
}

#[test]
fn test_duplicate_pin_name_rejected() {
    let mut element = PipelineElement::new("node", Box::new(Noop));
    element
        .add_input_pin(InputPin::new("in", DataType::Frame))
        .unwrap();

    let err = element
        .add_input_pin(InputPin::new("in", DataType::Audio))
        .unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateName(_)));
}

#[test]
fn test_same_name_allowed_across_directions() {
    let mut element = PipelineElement::new("node", Box::new(Noop));
    element
        .add_input_pin(InputPin::new("data", DataType::Frame))
        .unwrap();
    element
        .add_output_pin(OutputPin::new("data", DataType::Frame))
        .unwrap();

    assert!(element.input_pin("data").is_some());
    assert!(element.output_pin("data").is_some());
}

#[test]
fn test_pin_name_lists() {
    let mut element = PipelineElement::new("node", Box::new(Noop));
    element
        .add_input_pin(InputPin::new("a", DataType::Frame))
        .unwrap();
    element
        .add_input_pin(InputPin::new("b", DataType::Frame))
        .unwrap();
    element
        .add_output_pin(OutputPin::new("out", DataType::Frame))
        .unwrap();

    let mut inputs = element.input_pin_names();
    inputs.sort();
    assert_eq!(inputs, vec!["a", "b"]);
    assert_eq!(element.output_pin_names(), vec!["out"]);
}
