//! Model derive macro implementation

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr, Result, parse_quote};

/// Field-level `#[bond(...)]` options.
#[derive(Default)]
struct FieldAttr {
    id: bool,
    skip: bool,
    column: Option<String>,
}

/// Store name from `#[bond(store = "...")]`, or the snake_case type name.
fn get_store_name(input: &DeriveInput) -> Result<String> {
    let mut store = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("bond") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("store") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(syn::Error::new_spanned(&value, "store name must not be empty"));
                }
                store = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported bond attribute, expected `store = \"...\"`"))
            }
        })?;
    }
    Ok(store.unwrap_or_else(|| input.ident.to_string().to_snake_case()))
}

fn get_field_attr(field: &Field) -> Result<FieldAttr> {
    let mut parsed = FieldAttr::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("bond") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                parsed.id = true;
            } else if meta.path.is_ident("skip") {
                parsed.skip = true;
            } else if meta.path.is_ident("column") {
                let value: LitStr = meta.value()?.parse()?;
                parsed.column = Some(value.value());
            } else {
                return Err(meta.error("unsupported bond field attribute"));
            }
            Ok(())
        })?;
    }
    if parsed.id && parsed.skip {
        return Err(syn::Error::new_spanned(
            field,
            "a field cannot be both #[bond(id)] and #[bond(skip)]",
        ));
    }
    Ok(parsed)
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let store_name = get_store_name(&input)?;

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unnamed(_) | Fields::Unit => Vec::new(),
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Model can only be derived for structs",
            ));
        }
    };

    let mut keys = Vec::new();
    let mut columns = Vec::new();
    for field in fields {
        let attr = get_field_attr(field)?;
        if attr.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let column = attr.column.unwrap_or_else(|| ident.to_string());
        let pair = quote! {
            (
                ::std::string::String::from(#column),
                ::std::convert::Into::<::sqlbond::Param>::into(::std::clone::Clone::clone(&self.#ident)),
            )
        };
        if attr.id {
            keys.push(pair);
        } else {
            columns.push(pair);
        }
    }

    let primary_key_fn = (!keys.is_empty()).then(|| {
        quote! {
            fn primary_key(&self) -> ::std::vec::Vec<(::std::string::String, ::sqlbond::Param)> {
                ::std::vec![#(#keys),*]
            }
        }
    });
    let fields_fn = (!columns.is_empty()).then(|| {
        quote! {
            fn fields(&self) -> ::std::vec::Vec<(::std::string::String, ::sqlbond::Param)> {
                ::std::vec![#(#columns),*]
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut item_generics = input.generics.clone();
    item_generics.params.insert(0, parse_quote!('__bond));
    let (item_impl_generics, _, _) = item_generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::sqlbond::Model for #name #ty_generics #where_clause {
            fn store(&self, sess: &::sqlbond::Session) -> ::sqlbond::Store {
                sess.store(#store_name)
            }

            #primary_key_fn
            #fields_fn
        }

        impl #item_impl_generics ::std::convert::From<&'__bond #name #ty_generics>
            for ::sqlbond::Item<'__bond> #where_clause
        {
            fn from(model: &'__bond #name #ty_generics) -> Self {
                ::sqlbond::Item::model(model)
            }
        }
    })
}
