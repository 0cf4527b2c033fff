use framewire::elements::TestFrameSource;
use framewire::error::PipelineError;
use framewire::registry::{ElementMetadata, ElementMetadataFactoryWrapper, ElementRegistry};

#[test]
fn test_inventory_collects_all_elements() {
    let mut elements = Vec::new();
    for wrapper in inventory::iter::<ElementMetadataFactoryWrapper> {
        elements.push((wrapper.0)());
    }

    assert!(
        elements.len() >= 4,
        "Expected at least 4 elements, found {}",
        elements.len()
    );

    let ids: Vec<&str> = elements.iter().map(|e| e.id.as_str()).collect();
    assert!(ids.contains(&"testframesource"), "TestFrameSource not found");
    assert!(ids.contains(&"brightness"), "Brightness not found");
    assert!(ids.contains(&"framestats"), "FrameStats not found");
    assert!(ids.contains(&"passivetap"), "PassiveTap not found");
}

#[test]
fn test_discover_builds_registry() {
    let registry = ElementRegistry::discover().unwrap();
    assert!(registry.len() >= 4);
    assert!(registry.metadata("brightness").is_ok());
}

#[test]
fn test_metadata_has_correct_structure() {
    let registry = ElementRegistry::discover().unwrap();
    let brightness = registry.metadata("brightness").unwrap();

    assert_eq!(brightness.name, "Brightness");
    assert_eq!(brightness.category, "Processors");
    assert_eq!(brightness.inputs.len(), 1);
    assert_eq!(brightness.outputs.len(), 1);
    assert_eq!(brightness.inputs[0].id, "in");
    assert_eq!(brightness.inputs[0].data_type, "frame");

    let offset = brightness
        .parameters
        .iter()
        .find(|p| p.name == "offset")
        .expect("offset parameter not found");
    assert_eq!(offset.param_type, "number");
}

#[test]
fn test_factory_creates_instance() {
    let registry = ElementRegistry::discover().unwrap();
    let instance = registry.create("testframesource");
    assert!(instance.is_ok());
}

#[test]
fn test_create_unknown_type_fails() {
    let registry = ElementRegistry::discover().unwrap();
    let err = match registry.create("does_not_exist") {
        Ok(_) => panic!("expected lookup to fail"),
        Err(e) => e,
    };
    assert!(matches!(err, PipelineError::NotFound(_)));
}

#[test]
fn test_duplicate_type_rejected() {
    let mut registry = ElementRegistry::new();
    let metadata = ElementMetadata::new("dup", "Duplicate", "Test")
        .with_factory(|| Box::new(TestFrameSource::default()));

    registry.register(metadata.clone()).unwrap();
    let err = registry.register(metadata).unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateType(_)));
    assert_eq!(registry.len(), 1);
}
