//! Procedural macros for rowmap.
//!
//! `rowmap-macros` is the compile-time metadata layer. `#[derive(Entity)]`
//! turns a struct into a fully described entity: static field metadata,
//! static relation declarations, value extraction, and checked column
//! binding. This replaces runtime reflection entirely — the running engine
//! only ever sees the generated, typed implementation.

use proc_macro::TokenStream;
use quote::quote;

mod infer;
mod parse;

use parse::{EntityDef, RelationKindAttr, parse_entity};

/// Derive macro for the `Entity` trait.
///
/// The deriving struct must also implement `Default` (the binder creates
/// fresh records through it).
///
/// # Attributes
///
/// Struct level:
/// - `#[entity(table = "name")]` — override the table name (defaults to the
///   pluralized snake_case struct name)
/// - `#[entity(connection = "name")]` — named connection (defaults to
///   `"default"`)
///
/// Field level:
/// - `#[entity(column = "name")]` — override the column name
/// - `#[entity(primary_key)]` — mark the primary key (a field named `id` is
///   the primary key by convention)
/// - `#[entity(virtual)]` — exclude from stored columns
/// - `#[entity(has_one)]`, `#[entity(has_many(...))]`,
///   `#[entity(belongs_to(...))]`, `#[entity(belongs_to_many(junction = "..."))]`
///   — declare a relation; key overrides are optional, the junction table
///   for belongs-to-many is not
///
/// # Example
///
/// ```ignore
/// use rowmap::Entity;
///
/// #[derive(Entity, Default)]
/// struct Post {
///     id: i64,
///     title: String,
///     #[entity(has_many)]
///     comments: Vec<Comment>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let def = match parse_entity(&input) {
        Ok(def) => def,
        Err(e) => return e.to_compile_error().into(),
    };

    if let Err(e) = validate_entity(&input, &def) {
        return e.to_compile_error().into();
    }

    generate_entity_impl(&def).into()
}

/// Reject definitions the runtime would also refuse, at compile time.
fn validate_entity(input: &syn::DeriveInput, def: &EntityDef) -> syn::Result<()> {
    let pk_count = def.fields.iter().filter(|f| f.primary_key).count();
    if pk_count > 1 {
        return Err(syn::Error::new_spanned(
            input,
            format!("entity marks {pk_count} fields as primary key; at most one is allowed"),
        ));
    }

    for field in &def.fields {
        if field.primary_key && field.is_virtual() {
            return Err(syn::Error::new(
                field.name.span(),
                "a virtual field cannot be the primary key",
            ));
        }

        let Some(relation) = &field.relation else {
            continue;
        };
        match relation.kind {
            RelationKindAttr::HasOne | RelationKindAttr::BelongsTo => {
                if !infer::is_option(&field.ty) {
                    return Err(syn::Error::new(
                        field.name.span(),
                        "has_one/belongs_to fields must be Option<RelatedEntity>",
                    ));
                }
            }
            RelationKindAttr::HasMany => {
                if !infer::is_vec(&field.ty) {
                    return Err(syn::Error::new(
                        field.name.span(),
                        "has_many fields must be Vec<RelatedEntity>",
                    ));
                }
            }
            RelationKindAttr::BelongsToMany => {
                if !infer::is_vec(&field.ty) {
                    return Err(syn::Error::new(
                        field.name.span(),
                        "belongs_to_many fields must be Vec<RelatedEntity>",
                    ));
                }
                if relation.junction.is_none() {
                    return Err(syn::Error::new(
                        field.name.span(),
                        "belongs_to_many requires a junction table: \
                         #[entity(belongs_to_many(junction = \"...\"))]",
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Generate the `Entity` trait implementation.
fn generate_entity_impl(def: &EntityDef) -> proc_macro2::TokenStream {
    let name = &def.name;
    let table = &def.table;
    let connection = &def.connection;

    let field_infos = generate_field_infos(def);
    let relations = generate_relations(def);
    let column_values = generate_column_values(def);
    let bind_arms = generate_bind_arms(def);
    let nested_binds = generate_nested_binds(def);
    let pk_value = generate_primary_key_value(def);

    quote! {
        impl rowmap_core::Entity for #name {
            const TABLE: &'static str = #table;
            const CONNECTION: &'static str = #connection;
            const RELATIONS: &'static [rowmap_core::RelationDef] = &[
                #(#relations),*
            ];

            fn fields() -> &'static [rowmap_core::FieldInfo] {
                static FIELDS: &[rowmap_core::FieldInfo] = &[
                    #(#field_infos),*
                ];
                FIELDS
            }

            fn column_values(&self) -> Vec<(&'static str, rowmap_core::Value)> {
                vec![
                    #(#column_values),*
                ]
            }

            fn bind_column(
                &mut self,
                column: &str,
                value: &rowmap_core::Value,
            ) -> rowmap_core::Result<bool> {
                let own = match column.split_once('.') {
                    Some((table, rest)) => {
                        if table == <Self as rowmap_core::Entity>::TABLE {
                            Some(rest)
                        } else {
                            None
                        }
                    }
                    None => Some(column),
                };
                if let Some(col) = own {
                    match col {
                        #(#bind_arms)*
                        _ => {}
                    }
                }
                #(#nested_binds)*
                let _ = value;
                Ok(false)
            }

            fn primary_key_value(&self) -> rowmap_core::Value {
                #pk_value
            }
        }
    }
}

/// One `FieldInfo` const expression per field.
fn generate_field_infos(def: &EntityDef) -> Vec<proc_macro2::TokenStream> {
    def.fields
        .iter()
        .map(|field| {
            let name = field.name.to_string();
            let column = &field.column;
            let scalar = infer::scalar_kind(&field.ty);

            let mut tokens = quote! {
                rowmap_core::FieldInfo::new(#name, #column, #scalar)
            };
            if field.primary_key {
                tokens = quote! { #tokens.primary_key(true) };
            }
            if infer::is_nullable_scalar(&field.ty) {
                tokens = quote! { #tokens.nullable(true) };
            }
            if field.is_virtual() {
                tokens = quote! { #tokens.virtual_(true) };
            }
            tokens
        })
        .collect()
}

/// One `RelationDef` const expression per relation field.
fn generate_relations(def: &EntityDef) -> Vec<proc_macro2::TokenStream> {
    def.fields
        .iter()
        .filter_map(|field| {
            let relation = field.relation.as_ref()?;
            let inner = infer::relation_inner(&field.ty)?;
            let name = field.name.to_string();

            let kind = match relation.kind {
                RelationKindAttr::HasOne => quote!(rowmap_core::RelationKind::HasOne),
                RelationKindAttr::HasMany => quote!(rowmap_core::RelationKind::HasMany),
                RelationKindAttr::BelongsTo => quote!(rowmap_core::RelationKind::BelongsTo),
                RelationKindAttr::BelongsToMany => {
                    quote!(rowmap_core::RelationKind::BelongsToMany)
                }
            };

            let mut tokens = quote! {
                rowmap_core::RelationDef::new(
                    #name,
                    <#inner as rowmap_core::Entity>::TABLE,
                    #kind,
                )
            };
            if let Some(key) = &relation.foreign_key {
                tokens = quote! { #tokens.foreign_key(#key) };
            }
            if let Some(key) = &relation.local_key {
                tokens = quote! { #tokens.local_key(#key) };
            }
            if let Some(key) = &relation.related_key {
                tokens = quote! { #tokens.related_key(#key) };
            }
            if let Some(table) = &relation.junction {
                tokens = quote! { #tokens.junction_table(#table) };
            }
            if let Some(key) = &relation.junction_owner_key {
                tokens = quote! { #tokens.junction_owner_key(#key) };
            }
            if let Some(key) = &relation.junction_related_key {
                tokens = quote! { #tokens.junction_related_key(#key) };
            }
            tokens = quote! {
                #tokens.related_fields(<#inner as rowmap_core::Entity>::fields)
            };
            Some(tokens)
        })
        .collect()
}

/// `(column, value)` pairs for the stored fields.
fn generate_column_values(def: &EntityDef) -> Vec<proc_macro2::TokenStream> {
    def.fields
        .iter()
        .filter(|f| !f.is_virtual())
        .map(|field| {
            let ident = &field.name;
            let column = &field.column;
            quote! {
                (#column, rowmap_core::Value::from(self.#ident.clone()))
            }
        })
        .collect()
}

/// Match arms applying one result column to one stored field.
fn generate_bind_arms(def: &EntityDef) -> Vec<proc_macro2::TokenStream> {
    def.fields
        .iter()
        .filter(|f| !f.is_virtual())
        .map(|field| {
            let ident = &field.name;
            let column = &field.column;
            quote! {
                #column => {
                    self.#ident = rowmap_core::bind_value(column, value)?;
                    return Ok(true);
                }
            }
        })
        .collect()
}

/// Delegations offering qualified columns to nested relation records.
///
/// Only single-record slots (has_one / belongs_to, `Option<Related>`) take
/// part in join-flattening; sequence relations are loaded by their own
/// query.
fn generate_nested_binds(def: &EntityDef) -> Vec<proc_macro2::TokenStream> {
    def.fields
        .iter()
        .filter_map(|field| {
            let relation = field.relation.as_ref()?;
            if !matches!(
                relation.kind,
                RelationKindAttr::HasOne | RelationKindAttr::BelongsTo
            ) {
                return None;
            }
            let inner = infer::relation_inner(&field.ty)?;
            let ident = &field.name;
            Some(quote! {
                if rowmap_core::bind_nested::<#inner>(&mut self.#ident, column, value)? {
                    return Ok(true);
                }
            })
        })
        .collect()
}

/// The primary-key accessor body.
fn generate_primary_key_value(def: &EntityDef) -> proc_macro2::TokenStream {
    match def.fields.iter().find(|f| f.primary_key) {
        Some(field) => {
            let ident = &field.name;
            quote! { rowmap_core::Value::from(self.#ident.clone()) }
        }
        None => quote! { rowmap_core::Value::Null },
    }
}
