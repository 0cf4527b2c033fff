use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

mod element_meta;
use element_meta::{parse_element_info, parse_params, parse_pins};

#[proc_macro_derive(FlowElement, attributes(element_meta, param, input, output))]
pub fn derive_flow_element(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let element_info = match parse_element_info(&input) {
        Ok(info) => info,
        Err(e) => return e.write_errors().into(),
    };

    let params = parse_params(&input);
    let (inputs, outputs) = parse_pins(&input);

    let struct_name = &input.ident;
    let element_id = struct_name.to_string().to_lowercase();
    let element_name = &element_info.name;
    let category = &element_info.category;

    // Generate parameter schemas
    let param_schemas = params.iter().filter_map(|f| {
        let field_name = f.ident.as_ref()?.to_string();
        let default_val = f.default.as_ref()?.as_str();
        let type_name = extract_type_name(&f.ty);

        let (min, max) = match (f.min, f.max) {
            (Some(min), Some(max)) => (quote! { Some(#min) }, quote! { Some(#max) }),
            _ => (quote! { None }, quote! { None }),
        };

        Some(quote! {
            crate::registry::ParameterSchema {
                name: #field_name.to_string(),
                param_type: #type_name.to_string(),
                default: serde_json::json!(#default_val),
                min: #min,
                max: #max,
            }
        })
    });

    // Generate input pin metadata
    let input_metas = inputs.iter().map(|pin| {
        let pin_id = pin.ident.as_ref().unwrap().to_string().trim_start_matches('_').to_string();
        let pin_name = pin.name.clone().unwrap_or_else(|| pin_id.clone());
        let data_type = pin.data_type.as_deref().unwrap_or("frame");

        quote! {
            crate::registry::PinMetadata {
                id: #pin_id.to_string(),
                name: #pin_name.to_string(),
                data_type: #data_type.to_string(),
            }
        }
    });

    // Generate output pin metadata
    let output_metas = outputs.iter().map(|pin| {
        let pin_id = pin.ident.as_ref().unwrap().to_string().trim_start_matches('_').to_string();
        let pin_name = pin.name.clone().unwrap_or_else(|| pin_id.clone());
        let data_type = pin.data_type.as_deref().unwrap_or("frame");

        quote! {
            crate::registry::PinMetadata {
                id: #pin_id.to_string(),
                name: #pin_name.to_string(),
                data_type: #data_type.to_string(),
            }
        }
    });

    let mod_name = syn::Ident::new(
        &format!("__element_registration_{}", struct_name.to_string().to_lowercase()),
        struct_name.span(),
    );

    let factory_fn_name = syn::Ident::new(
        &format!("create_metadata_{}", struct_name.to_string().to_lowercase()),
        struct_name.span(),
    );

    let expanded = quote! {
        mod #mod_name {
            use super::*;

            fn #factory_fn_name() -> crate::registry::ElementMetadata {
                crate::registry::ElementMetadata {
                    id: #element_id.to_string(),
                    name: #element_name.to_string(),
                    category: #category.to_string(),
                    inputs: vec![#(#input_metas),*],
                    outputs: vec![#(#output_metas),*],
                    parameters: vec![#(#param_schemas),*],
                    factory: || Box::new(#struct_name::default()),
                }
            }

            ::inventory::submit! {
                crate::registry::ElementMetadataFactoryWrapper(#factory_fn_name)
            }
        }
    };

    TokenStream::from(expanded)
}

fn extract_type_name(ty: &syn::Type) -> &'static str {
    let type_str = quote!(#ty).to_string();

    if type_str.contains("f64") || type_str.contains("f32") {
        "number"
    } else if type_str.contains("u32") || type_str.contains("i32")
        || type_str.contains("u64") || type_str.contains("i64")
        || type_str.contains("u8") || type_str.contains("usize") || type_str.contains("isize") {
        "number"
    } else if type_str.contains("String") || type_str.contains("str") {
        "string"
    } else if type_str.contains("bool") {
        "boolean"
    } else {
        "unknown"
    }
}
