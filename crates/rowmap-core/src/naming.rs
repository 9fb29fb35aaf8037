//! Table-name inflection.
//!
//! Relation conventions derive key columns from table names
//! (`<singularized-owner-table>_id`), and table names from type names
//! (pluralized snake_case), so both directions live here.

/// Irregular singular/plural pairs handled before the suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("mouse", "mice"),
    ("datum", "data"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("analysis", "analyses"),
    ("crisis", "crises"),
    ("axis", "axes"),
];

/// Simple English pluralization.
///
/// Rules:
/// - irregular nouns from the table above
/// - words ending in 's', 'x', 'z', 'ch', 'sh' -> add 'es'
/// - words ending in 'y' preceded by a consonant -> 'ies'
/// - default: add 's'
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == word) {
        return (*plural).to_string();
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

/// Inverse of [`pluralize`] for the same rule set.
///
/// Words that do not look plural are returned unchanged, so overridden
/// singular table names still produce a usable key prefix.
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == word) {
        return (*singular).to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }

    if let Some(stem) = word.strip_suffix("es") {
        if stem.ends_with('s')
            || stem.ends_with('x')
            || stem.ends_with('z')
            || stem.ends_with("ch")
            || stem.ends_with("sh")
        {
            return stem.to_string();
        }
    }

    if let Some(stem) = word.strip_suffix('s') {
        return stem.to_string();
    }

    word.to_string()
}

/// Conventional foreign-key column for a table: `<singular>_id`.
pub fn foreign_key_for(table: &str) -> String {
    format!("{}_id", singularize(table))
}
