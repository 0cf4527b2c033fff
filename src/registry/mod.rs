pub mod metadata;

pub use metadata::{
    ElementFactory, ElementMetadata, ElementMetadataFactory, ElementMetadataFactoryWrapper,
    ParameterSchema, PinMetadata,
};

use crate::core::ProcessingElement;
use crate::error::PipelineError;
use std::collections::HashMap;

/// Registry of element types available for instantiation by name.
pub struct ElementRegistry {
    types: HashMap<String, ElementMetadata>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Build a registry from every type submitted through the
    /// `FlowElement` derive.
    pub fn discover() -> Result<Self, PipelineError> {
        let mut registry = Self::new();
        for wrapper in inventory::iter::<ElementMetadataFactoryWrapper> {
            registry.register((wrapper.0)())?;
        }
        Ok(registry)
    }

    /// Register an element type. Fails when the type id is already taken.
    pub fn register(&mut self, metadata: ElementMetadata) -> Result<(), PipelineError> {
        if self.types.contains_key(&metadata.id) {
            return Err(PipelineError::DuplicateType(metadata.id));
        }
        self.types.insert(metadata.id.clone(), metadata);
        Ok(())
    }

    /// Instantiate a registered element type by id.
    pub fn create(&self, type_id: &str) -> Result<Box<dyn ProcessingElement>, PipelineError> {
        self.metadata(type_id).map(|meta| meta.create_instance())
    }

    pub fn metadata(&self, type_id: &str) -> Result<&ElementMetadata, PipelineError> {
        self.types
            .get(type_id)
            .ok_or_else(|| PipelineError::NotFound(format!("element type '{type_id}'")))
    }

    pub fn list_types(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}
