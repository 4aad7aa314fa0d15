use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Expr, Fields, Ident, LitBool, LitStr, Type, parse_macro_input, spanned::Spanned};

#[proc_macro_derive(FormEntity, attributes(form, meta))]
pub fn derive_form_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_form_entity(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[proc_macro_derive(FormEnum, attributes(form))]
pub fn derive_form_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_form_enum(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct EntityOptions {
    name: Option<String>,
    display: Option<(String, proc_macro2::Span)>,
    id: Option<(String, proc_macro2::Span)>,
    color: Option<(String, proc_macro2::Span)>,
}

#[derive(Default)]
struct FieldFormOptions {
    base: bool,
    skip: bool,
}

struct DescribedField {
    ident: Ident,
    ty: Type,
    meta: Option<TokenStream2>,
}

struct BaseField {
    ident: Ident,
    ty: Type,
}

fn expand_form_entity(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "FormEntity does not support generic structs",
        ));
    }

    let options = parse_entity_options(&input.attrs)?;

    let Data::Struct(data_struct) = input.data else {
        return Err(syn::Error::new(
            struct_name.span(),
            "FormEntity can only be derived for structs",
        ));
    };
    let Fields::Named(named_fields) = data_struct.fields else {
        return Err(syn::Error::new(
            struct_name.span(),
            "FormEntity requires named fields",
        ));
    };

    let entity_name = options
        .name
        .clone()
        .unwrap_or_else(|| struct_name.to_string());

    let mut described = Vec::<DescribedField>::new();
    let mut bases = Vec::<BaseField>::new();
    // descriptors in declaration order; base fields are spliced in place
    let mut descriptor_pushes = Vec::<TokenStream2>::new();

    for field in named_fields.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "FormEntity requires named fields"))?;
        let form_options = parse_field_form_options(&field.attrs)?;
        let meta = parse_meta_attr(&field.attrs, &ident)?;

        if form_options.skip {
            if meta.is_some() || form_options.base {
                return Err(syn::Error::new(
                    ident.span(),
                    "#[form(skip)] cannot be combined with #[form(base)] or #[meta(...)]",
                ));
            }
            continue;
        }

        if form_options.base {
            if meta.is_some() {
                return Err(syn::Error::new(
                    ident.span(),
                    "#[form(base)] fields take their metadata from the base type",
                ));
            }
            let ty = field.ty;
            descriptor_pushes.push(quote! {
                fields.extend(<#ty as ::metaform::meta::EntityModel>::fields().iter().cloned());
            });
            bases.push(BaseField { ident, ty });
            continue;
        }

        let ty = field.ty;
        let field_name = ident.to_string();
        let with_meta = meta.as_ref().map(|meta| quote!(.with_meta(#meta)));
        descriptor_pushes.push(quote! {
            fields.push(
                ::metaform::meta::FieldDescriptor::new(
                    #field_name,
                    #entity_name,
                    <#ty as ::metaform::meta::FieldValue>::field_type(),
                    <#ty as ::metaform::meta::FieldValue>::NULLABLE,
                )
                #with_meta
            );
        });
        described.push(DescribedField { ident, ty, meta });
    }

    for (label, option) in [("display", &options.display), ("id", &options.id), ("color", &options.color)] {
        if let Some((field, span)) = option {
            if !described.iter().any(|described| described.ident == field) {
                return Err(syn::Error::new(
                    *span,
                    format!("#[form({label} = \"{field}\")] does not name a described field of {struct_name}"),
                ));
            }
        }
    }

    let get_arms = described.iter().map(|field| {
        let ident = &field.ident;
        let name = ident.to_string();
        quote! {
            #name => ::std::result::Result::Ok(::metaform::meta::FieldValue::to_value(&self.#ident)),
        }
    });

    let set_arms = described.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let name = ident.to_string();
        quote! {
            #name => {
                self.#ident = <#ty as ::metaform::meta::FieldValue>::from_value(value)
                    .map_err(|err| err.for_field(#name))?;
                ::std::result::Result::Ok(())
            }
        }
    });

    let check_arms = described.iter().map(|field| {
        let ty = &field.ty;
        let name = field.ident.to_string();
        quote! {
            #name => <#ty as ::metaform::meta::FieldValue>::from_value(value.clone())
                .map(|_| ())
                .map_err(|err| err.for_field(#name)),
        }
    });

    let base_check = bases.iter().map(|base| {
        let ty = &base.ty;
        quote! {
            if <#ty as ::metaform::meta::EntityModel>::has_field(name) {
                return <#ty as ::metaform::meta::EntityModel>::check_field(name, value);
            }
        }
    });

    let base_get = bases.iter().map(|base| {
        let ident = &base.ident;
        let ty = &base.ty;
        quote! {
            if <#ty as ::metaform::meta::EntityModel>::has_field(name) {
                return ::metaform::meta::EntityModel::get_field(&self.#ident, name);
            }
        }
    });

    let base_set = bases.iter().map(|base| {
        let ident = &base.ident;
        let ty = &base.ty;
        quote! {
            if <#ty as ::metaform::meta::EntityModel>::has_field(name) {
                return ::metaform::meta::EntityModel::set_field(&mut self.#ident, name, value);
            }
        }
    });

    let display_field = options
        .display
        .as_ref()
        .map(|(field, _)| field.clone())
        .or_else(|| {
            described
                .iter()
                .any(|field| field.ident == "name")
                .then(|| "name".to_string())
        });
    let display_body = match (display_field, bases.first()) {
        (Some(field), _) => {
            let ident = Ident::new(&field, struct_name.span());
            quote!(::metaform::meta::FieldValue::to_value(&self.#ident).display_text())
        }
        (None, Some(base)) => {
            let ident = &base.ident;
            quote!(::metaform::meta::EntityModel::display_text(&self.#ident))
        }
        (None, None) => quote!(#entity_name.to_string()),
    };

    let id_field = options
        .id
        .as_ref()
        .map(|(field, _)| field.clone())
        .or_else(|| {
            described
                .iter()
                .any(|field| field.ident == "id")
                .then(|| "id".to_string())
        });
    let id_body = match (id_field, bases.first()) {
        (Some(field), _) => {
            let ident = Ident::new(&field, struct_name.span());
            quote!(::metaform::meta::FieldValue::to_value(&self.#ident).as_i64())
        }
        (None, Some(base)) => {
            let ident = &base.ident;
            quote!(::metaform::meta::EntityModel::entity_id(&self.#ident))
        }
        (None, None) => quote!(::std::option::Option::None),
    };

    let color_body = match (&options.color, bases.first()) {
        (Some((field, _)), _) => {
            let ident = Ident::new(field, struct_name.span());
            quote! {
                ::metaform::meta::FieldValue::to_value(&self.#ident)
                    .as_str()
                    .filter(|color| !color.is_empty())
                    .map(::std::string::ToString::to_string)
            }
        }
        (None, Some(base)) => {
            let ident = &base.ident;
            quote!(::metaform::meta::EntityModel::color(&self.#ident))
        }
        (None, None) => quote!(::std::option::Option::None),
    };

    Ok(quote! {
        impl ::metaform::meta::EntityModel for #struct_name {
            fn entity_name() -> &'static str {
                #entity_name
            }

            fn fields() -> &'static [::metaform::meta::FieldDescriptor] {
                static FIELDS: ::std::sync::OnceLock<::std::vec::Vec<::metaform::meta::FieldDescriptor>> =
                    ::std::sync::OnceLock::new();
                FIELDS
                    .get_or_init(|| {
                        let mut fields = ::std::vec::Vec::new();
                        #(#descriptor_pushes)*
                        fields
                    })
                    .as_slice()
            }

            fn get_field(&self, name: &str) -> ::metaform::Result<::metaform::Value> {
                match name {
                    #(#get_arms)*
                    _ => {
                        #(#base_get)*
                        ::std::result::Result::Err(::metaform::FormError::FieldNotFound {
                            entity: #entity_name.to_string(),
                            field: name.to_string(),
                        })
                    }
                }
            }

            fn set_field(&mut self, name: &str, value: ::metaform::Value) -> ::metaform::Result<()> {
                match name {
                    #(#set_arms)*
                    _ => {
                        #(#base_set)*
                        ::std::result::Result::Err(::metaform::FormError::FieldNotFound {
                            entity: #entity_name.to_string(),
                            field: name.to_string(),
                        })
                    }
                }
            }

            fn check_field(name: &str, value: &::metaform::Value) -> ::metaform::Result<()> {
                match name {
                    #(#check_arms)*
                    _ => {
                        #(#base_check)*
                        ::std::result::Result::Err(::metaform::FormError::FieldNotFound {
                            entity: #entity_name.to_string(),
                            field: name.to_string(),
                        })
                    }
                }
            }

            fn display_text(&self) -> ::std::string::String {
                #display_body
            }

            fn entity_id(&self) -> ::std::option::Option<i64> {
                #id_body
            }

            fn color(&self) -> ::std::option::Option<::std::string::String> {
                #color_body
            }
        }

        impl ::metaform::meta::FieldValue for #struct_name {
            fn field_type() -> ::metaform::FieldType {
                ::metaform::FieldType::Entity { type_name: #entity_name }
            }

            fn to_value(&self) -> ::metaform::Value {
                ::metaform::Value::Entity(::metaform::EntityValue::from_model(self))
            }

            fn from_value(
                value: ::metaform::Value,
            ) -> ::std::result::Result<Self, ::metaform::ConversionError> {
                match value {
                    ::metaform::Value::Entity(entity) => entity.to_model::<Self>(),
                    other => ::std::result::Result::Err(
                        ::metaform::ConversionError::mismatch(#entity_name, other.type_name()),
                    ),
                }
            }
        }
    })
}

fn expand_form_enum(input: DeriveInput) -> syn::Result<TokenStream2> {
    let enum_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "FormEnum does not support generic enums",
        ));
    }

    let Data::Enum(data_enum) = input.data else {
        return Err(syn::Error::new(
            enum_name.span(),
            "FormEnum can only be derived for enums",
        ));
    };

    if data_enum.variants.is_empty() {
        return Err(syn::Error::new(
            enum_name.span(),
            "FormEnum requires at least one variant",
        ));
    }

    let mut idents = Vec::new();
    let mut labels = Vec::new();
    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "FormEnum variants cannot carry data",
            ));
        }
        idents.push(variant.ident.clone());
        labels.push(variant.ident.to_string());
    }

    let type_name = enum_name.to_string();

    Ok(quote! {
        impl ::metaform::meta::FieldValue for #enum_name {
            fn field_type() -> ::metaform::FieldType {
                ::metaform::FieldType::Enum {
                    type_name: #type_name,
                    constants: &[#(#labels),*],
                }
            }

            fn to_value(&self) -> ::metaform::Value {
                let label = match self {
                    #(Self::#idents => #labels,)*
                };
                ::metaform::Value::Enum(label.to_string())
            }

            fn from_value(
                value: ::metaform::Value,
            ) -> ::std::result::Result<Self, ::metaform::ConversionError> {
                match value {
                    ::metaform::Value::Enum(label) | ::metaform::Value::Text(label) => match label.as_str() {
                        #(#labels => ::std::result::Result::Ok(Self::#idents),)*
                        other => ::std::result::Result::Err(::metaform::ConversionError::new(
                            format!("'{}' is not a constant of {}", other, #type_name),
                        )),
                    },
                    other => ::std::result::Result::Err(
                        ::metaform::ConversionError::mismatch(#type_name, other.type_name()),
                    ),
                }
            }
        }
    })
}

fn parse_entity_options(attrs: &[syn::Attribute]) -> syn::Result<EntityOptions> {
    let mut options = EntityOptions::default();

    for attr in attrs {
        if !path_ends_with_ident(attr.path(), "form") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let key = if meta.path.is_ident("name") {
                "name"
            } else if meta.path.is_ident("display") {
                "display"
            } else if meta.path.is_ident("id") {
                "id"
            } else if meta.path.is_ident("color") {
                "color"
            } else {
                return Err(meta.error(
                    "Unsupported #[form(...)] option. Supported: name, display, id, color",
                ));
            };

            let lit: LitStr = meta.value()?.parse()?;
            let entry = (lit.value(), lit.span());
            match key {
                "name" => options.name = Some(entry.0),
                "display" => options.display = Some(entry),
                "id" => options.id = Some(entry),
                _ => options.color = Some(entry),
            }
            Ok(())
        })?;
    }

    Ok(options)
}

fn parse_field_form_options(attrs: &[syn::Attribute]) -> syn::Result<FieldFormOptions> {
    let mut options = FieldFormOptions::default();

    for attr in attrs {
        if !path_ends_with_ident(attr.path(), "form") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("base") {
                options.base = true;
                return Ok(());
            }

            if meta.path.is_ident("skip") {
                options.skip = true;
                return Ok(());
            }

            Err(meta.error("Unsupported field #[form(...)] option. Supported: base, skip"))
        })?;
    }

    Ok(options)
}

const STRING_KEYS: &[&str] = &[
    "default_value",
    "description",
    "placeholder",
    "width",
    "data_provider_bean",
    "data_provider_method",
    "data_provider_param_method",
    "filter_method",
    "data_provider_class",
];

const FLAG_KEYS: &[&str] = &[
    "hidden",
    "required",
    "read_only",
    "use_radio_buttons",
    "allow_custom_value",
    "auto_select_first",
    "clear_on_empty_data",
    "combobox_read_only",
];

/// Parse `#[meta(...)]` into a `FieldMeta` builder expression.
fn parse_meta_attr(attrs: &[syn::Attribute], field: &Ident) -> syn::Result<Option<TokenStream2>> {
    let mut found: Option<TokenStream2> = None;

    for attr in attrs {
        if !path_ends_with_ident(attr.path(), "meta") {
            continue;
        }

        if found.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "Duplicate #[meta(...)] attribute on field",
            ));
        }

        let mut display_name = field.to_string();
        let mut calls = Vec::<TokenStream2>::new();

        if let syn::Meta::NameValue(_) = &attr.meta {
            return Err(syn::Error::new(
                attr.span(),
                "Unsupported #[meta = ...] syntax. Use #[meta] or #[meta(order = 1, required)]",
            ));
        }

        if let syn::Meta::List(_) = &attr.meta {
            attr.parse_nested_meta(|meta| {
                let Some(key) = meta.path.get_ident().map(Ident::to_string) else {
                    return Err(meta.error("expected a #[meta(...)] option name"));
                };
                let method = Ident::new(&key, meta.path.span());

                if key == "display_name" {
                    let lit: LitStr = meta.value()?.parse()?;
                    display_name = lit.value();
                    return Ok(());
                }

                if STRING_KEYS.contains(&key.as_str()) {
                    let lit: LitStr = meta.value()?.parse()?;
                    calls.push(quote!(.#method(#lit)));
                    return Ok(());
                }

                if FLAG_KEYS.contains(&key.as_str()) {
                    let flag = if meta.input.peek(syn::Token![=]) {
                        let lit: LitBool = meta.value()?.parse()?;
                        lit.value
                    } else {
                        true
                    };
                    calls.push(quote!(.#method(#flag)));
                    return Ok(());
                }

                match key.as_str() {
                    "order" | "max_length" => {
                        let expr: Expr = meta.value()?.parse()?;
                        calls.push(quote!(.#method((#expr) as i32)));
                        Ok(())
                    }
                    "min" | "max" => {
                        let expr: Expr = meta.value()?.parse()?;
                        calls.push(quote!(.#method((#expr) as f64)));
                        Ok(())
                    }
                    _ => Err(meta.error(format!("Unsupported #[meta(...)] option '{key}'"))),
                }
            })?;
        }

        found = Some(quote! {
            ::metaform::meta::FieldMeta::named(#display_name) #(#calls)*
        });
    }

    Ok(found)
}

fn path_ends_with_ident(path: &syn::Path, ident: &str) -> bool {
    path.segments
        .last()
        .map(|segment| segment.ident == ident)
        .unwrap_or(false)
}
