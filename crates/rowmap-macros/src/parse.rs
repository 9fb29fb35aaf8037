//! Parsing logic for the Entity derive macro.
//!
//! This module walks the derive input's `#[entity(...)]` attributes and
//! builds the `EntityDef`/`FieldDef` structures the code generator consumes.

use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Error, Fields, Ident, LitStr, Result, Type};

use crate::infer;

/// Parsed entity definition from a struct with `#[derive(Entity)]`.
pub struct EntityDef {
    /// The struct name (e.g. `Post`).
    pub name: Ident,
    /// The SQL table name (e.g. `"posts"`).
    pub table: String,
    /// The named connection this entity executes against.
    pub connection: String,
    /// Parsed field definitions, in declaration order.
    pub fields: Vec<FieldDef>,
}

/// Parsed field definition.
pub struct FieldDef {
    /// The Rust field name.
    pub name: Ident,
    /// The SQL column name (snake_case field name or explicit override).
    pub column: String,
    /// The field's declared type.
    pub ty: Type,
    /// Explicitly marked primary key.
    pub primary_key: bool,
    /// Explicitly marked virtual.
    pub explicit_virtual: bool,
    /// Relation declared on this field.
    pub relation: Option<RelationAttr>,
}

/// The relation kinds a field attribute can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKindAttr {
    HasOne,
    HasMany,
    BelongsTo,
    BelongsToMany,
}

/// A relation declaration parsed from a field attribute, e.g.
/// `#[entity(has_many(foreign_key = "post_id"))]`.
pub struct RelationAttr {
    pub kind: RelationKindAttr,
    pub foreign_key: Option<String>,
    pub local_key: Option<String>,
    pub related_key: Option<String>,
    pub junction: Option<String>,
    pub junction_owner_key: Option<String>,
    pub junction_related_key: Option<String>,
}

impl RelationAttr {
    fn new(kind: RelationKindAttr) -> Self {
        Self {
            kind,
            foreign_key: None,
            local_key: None,
            related_key: None,
            junction: None,
            junction_owner_key: None,
            junction_related_key: None,
        }
    }
}

/// Parse the derive input into an `EntityDef`.
pub fn parse_entity(input: &DeriveInput) -> Result<EntityDef> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            input,
            "#[derive(Entity)] only supports structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(Error::new_spanned(
            input,
            "#[derive(Entity)] requires named fields",
        ));
    };

    let mut table: Option<String> = None;
    let mut connection: Option<String> = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                table = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("connection") {
                let lit: LitStr = meta.value()?.parse()?;
                connection = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unknown entity attribute; expected `table` or `connection`"))
            }
        })?;
    }

    let mut fields = Vec::new();
    for field in &named.named {
        fields.push(parse_field(field)?);
    }

    // Convention: a field literally named `id` is the primary key when no
    // field carries an explicit marker.
    if !fields.iter().any(|f| f.primary_key) {
        if let Some(id_field) = fields
            .iter_mut()
            .find(|f| f.name.unraw().to_string().eq_ignore_ascii_case("id"))
        {
            if !id_field.explicit_virtual && id_field.relation.is_none() {
                id_field.primary_key = true;
            }
        }
    }

    let name = input.ident.clone();
    let table = table.unwrap_or_else(|| derive_table_name(&name.to_string()));

    Ok(EntityDef {
        name,
        table,
        connection: connection.unwrap_or_else(|| "default".to_string()),
        fields,
    })
}

fn parse_field(field: &syn::Field) -> Result<FieldDef> {
    let name = field
        .ident
        .clone()
        .ok_or_else(|| Error::new_spanned(field, "expected a named field"))?;

    let mut column: Option<String> = None;
    let mut primary_key = false;
    let mut explicit_virtual = false;
    let mut relation: Option<RelationAttr> = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                column = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("primary_key") {
                primary_key = true;
                Ok(())
            } else if meta.path.is_ident("virtual") {
                explicit_virtual = true;
                Ok(())
            } else if meta.path.is_ident("has_one") {
                relation = Some(parse_relation(&meta, RelationKindAttr::HasOne)?);
                Ok(())
            } else if meta.path.is_ident("has_many") {
                relation = Some(parse_relation(&meta, RelationKindAttr::HasMany)?);
                Ok(())
            } else if meta.path.is_ident("belongs_to") {
                relation = Some(parse_relation(&meta, RelationKindAttr::BelongsTo)?);
                Ok(())
            } else if meta.path.is_ident("belongs_to_many") {
                relation = Some(parse_relation(&meta, RelationKindAttr::BelongsToMany)?);
                Ok(())
            } else {
                Err(meta.error(
                    "unknown entity attribute; expected `column`, `primary_key`, `virtual`, \
                     `has_one`, `has_many`, `belongs_to`, or `belongs_to_many`",
                ))
            }
        })?;
    }

    let column = column.unwrap_or_else(|| to_snake_case(&name.unraw().to_string()));

    Ok(FieldDef {
        name,
        column,
        ty: field.ty.clone(),
        primary_key,
        explicit_virtual,
        relation,
    })
}

fn parse_relation(
    meta: &syn::meta::ParseNestedMeta<'_>,
    kind: RelationKindAttr,
) -> Result<RelationAttr> {
    let mut rel = RelationAttr::new(kind);

    // Bare marker (`has_one`) or a list of key overrides.
    if !meta.input.peek(syn::token::Paren) {
        return Ok(rel);
    }

    meta.parse_nested_meta(|nested| {
        let lit: LitStr = nested.value()?.parse()?;
        let value = lit.value();
        if nested.path.is_ident("foreign_key") {
            rel.foreign_key = Some(value);
            Ok(())
        } else if nested.path.is_ident("local_key") {
            rel.local_key = Some(value);
            Ok(())
        } else if nested.path.is_ident("related_key") {
            rel.related_key = Some(value);
            Ok(())
        } else if nested.path.is_ident("junction") {
            rel.junction = Some(value);
            Ok(())
        } else if nested.path.is_ident("junction_owner_key") {
            rel.junction_owner_key = Some(value);
            Ok(())
        } else if nested.path.is_ident("junction_related_key") {
            rel.junction_related_key = Some(value);
            Ok(())
        } else {
            Err(nested.error("unknown relation attribute"))
        }
    })?;

    Ok(rel)
}

impl FieldDef {
    /// Whether this field is excluded from stored columns.
    pub fn is_virtual(&self) -> bool {
        self.explicit_virtual || self.relation.is_some() || infer::is_composite(&self.ty)
    }
}

/// Derive table name from struct name: snake_case, then pluralize.
///
/// Examples: `Post` -> `posts`, `TeamMember` -> `team_members`,
/// `Category` -> `categories`.
pub fn derive_table_name(struct_name: &str) -> String {
    pluralize(&to_snake_case(struct_name))
}

/// Convert PascalCase to snake_case, keeping acronym runs together
/// (`HTTPServer` -> `http_server`).
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next = chars.get(i + 1).copied();
                let boundary = prev.is_lowercase()
                    || (prev.is_uppercase() && next.is_some_and(char::is_lowercase));
                if boundary {
                    result.push('_');
                }
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// Simple English pluralization: irregular nouns, then suffix rules.
pub fn pluralize(word: &str) -> String {
    match word {
        "person" => return "people".to_string(),
        "child" => return "children".to_string(),
        "man" => return "men".to_string(),
        "woman" => return "women".to_string(),
        "datum" => return "data".to_string(),
        "index" => return "indices".to_string(),
        _ => {}
    }

    if word.is_empty() {
        return String::new();
    }

    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }

    if let Some(stem) = word.strip_suffix('y') {
        let preceded_by_consonant = stem
            .chars()
            .next_back()
            .is_some_and(|c| !"aeiou".contains(c));
        if preceded_by_consonant {
            return format!("{stem}ies");
        }
    }

    format!("{word}s")
}
