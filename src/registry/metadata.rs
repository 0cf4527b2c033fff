use crate::core::ProcessingElement;
use serde::{Deserialize, Serialize};

/// Metadata describing a pin (input or output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinMetadata {
    pub id: String,
    pub name: String,
    pub data_type: String,
}

/// Schema for a configurable parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub default: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Factory function type for creating element instances
pub type ElementFactory = fn() -> Box<dyn ProcessingElement>;

/// Complete metadata for an element type
#[derive(Clone)]
pub struct ElementMetadata {
    pub id: String,
    pub name: String,
    pub category: String,
    pub inputs: Vec<PinMetadata>,
    pub outputs: Vec<PinMetadata>,
    pub parameters: Vec<ParameterSchema>,
    pub factory: ElementFactory,
}

impl ElementMetadata {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
            factory: || panic!("No factory set"),
        }
    }

    pub fn with_factory(mut self, factory: ElementFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn add_input(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        self.inputs.push(PinMetadata {
            id: id.into(),
            name: name.into(),
            data_type: data_type.into(),
        });
        self
    }

    pub fn add_output(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        self.outputs.push(PinMetadata {
            id: id.into(),
            name: name.into(),
            data_type: data_type.into(),
        });
        self
    }

    pub fn add_parameter(mut self, param: ParameterSchema) -> Self {
        self.parameters.push(param);
        self
    }

    /// Create a new instance of this element type
    pub fn create_instance(&self) -> Box<dyn ProcessingElement> {
        (self.factory)()
    }
}

// Factory type for creating element metadata at runtime
pub type ElementMetadataFactory = fn() -> ElementMetadata;

// Wrapper for inventory collection
pub struct ElementMetadataFactoryWrapper(pub ElementMetadataFactory);

// Inventory submission type
inventory::collect!(ElementMetadataFactoryWrapper);
