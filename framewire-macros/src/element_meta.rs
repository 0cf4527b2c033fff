use darling::{FromAttributes, FromField};
use syn::{DeriveInput, Fields};

/// Parsed attributes from #[element_meta(...)]
#[derive(Debug, FromAttributes)]
#[darling(attributes(element_meta))]
pub struct ElementMetaArgs {
    pub name: String,
    pub category: String,
}

/// Parsed attributes from #[param(...)]
#[derive(Debug, FromField)]
#[darling(attributes(param))]
pub struct ParamField {
    pub ident: Option<syn::Ident>,
    pub ty: syn::Type,

    #[darling(default)]
    pub default: Option<String>,

    #[darling(default)]
    pub min: Option<f64>,

    #[darling(default)]
    pub max: Option<f64>,
}

/// Parsed attributes from #[input(...)] / #[output(...)]
#[derive(Debug, FromField)]
#[darling(attributes(input, output))]
pub struct PinField {
    pub ident: Option<syn::Ident>,

    #[darling(default)]
    pub name: Option<String>,

    #[darling(default)]
    pub data_type: Option<String>,
}

pub fn parse_element_info(input: &DeriveInput) -> darling::Result<ElementMetaArgs> {
    ElementMetaArgs::from_attributes(&input.attrs)
}

pub fn parse_params(input: &DeriveInput) -> Vec<ParamField> {
    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    fields
        .iter()
        .filter(|f| f.attrs.iter().any(|attr| attr.path().is_ident("param")))
        .filter_map(|f| ParamField::from_field(f).ok())
        .collect()
}

pub fn parse_pins(input: &DeriveInput) -> (Vec<PinField>, Vec<PinField>) {
    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return (Vec::new(), Vec::new()),
        },
        _ => return (Vec::new(), Vec::new()),
    };

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();

    for field in fields.iter() {
        if field.attrs.iter().any(|attr| attr.path().is_ident("input")) {
            if let Ok(pin) = PinField::from_field(field) {
                inputs.push(pin);
            }
        }

        if field.attrs.iter().any(|attr| attr.path().is_ident("output")) {
            if let Ok(pin) = PinField::from_field(field) {
                outputs.push(pin);
            }
        }
    }

    (inputs, outputs)
}
