//! Console form layout derived from attribute format hints.

use crate::manifest::Attribute;
use serde::Serialize;

#[derive(Debug, Serialize)]
/// Attributes rendered under one category heading.
pub struct FormSection<'a> {
    pub category: Option<&'a str>,
    pub attributes: Vec<&'a Attribute>,
}

/// Group attributes by category.
///
/// Categories sort by their numeric prefix (`2.State` before `10.Extra`),
/// then by label; uncategorized attributes come last. Inside a section,
/// attributes sort by `order` and keep declaration order on ties.
pub fn form_sections(attributes: &[Attribute]) -> Vec<FormSection<'_>> {
    let mut sections: Vec<FormSection<'_>> = Vec::new();
    for attr in attributes {
        let category = attr.category();
        match sections.iter_mut().find(|s| s.category == category) {
            Some(section) => section.attributes.push(attr),
            None => sections.push(FormSection {
                category,
                attributes: vec![attr],
            }),
        }
    }

    sections.sort_by(|a, b| category_rank(a.category).cmp(&category_rank(b.category)));
    for section in &mut sections {
        section
            .attributes
            .sort_by_key(|attr| (attr.order().is_none(), attr.order()));
    }
    sections
}

fn category_rank(category: Option<&str>) -> (bool, bool, u64, &str) {
    let Some(label) = category else {
        return (true, true, 0, "");
    };
    let digits: String = label.chars().take_while(char::is_ascii_digit).collect();
    match digits.parse::<u64>() {
        Ok(prefix) => (false, false, prefix, label),
        Err(_) => (false, true, 0, label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes(value: serde_json::Value) -> Vec<Attribute> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn categories_sort_numerically_then_uncategorized() {
        let attrs = attributes(json!([
            {"key": "extra", "default": "", "format": {"category": "10.Extra"}},
            {"key": "loose", "default": ""},
            {"key": "state", "default": "", "format": {"category": "2.State"}},
            {"key": "misc", "default": "", "format": {"category": "Misc"}}
        ]));
        let sections = form_sections(&attrs);
        let labels: Vec<_> = sections.iter().map(|s| s.category).collect();
        assert_eq!(
            labels,
            [Some("2.State"), Some("10.Extra"), Some("Misc"), None]
        );
    }

    #[test]
    fn order_then_declaration_within_section() {
        let attrs = attributes(json!([
            {"key": "c", "default": "", "format": {"category": "1.Config"}},
            {"key": "b", "default": "", "format": {"category": "1.Config", "order": 2}},
            {"key": "a", "default": "", "format": {"category": "1.Config", "order": 1}},
            {"key": "d", "default": "", "format": {"category": "1.Config", "order": 1}}
        ]));
        let sections = form_sections(&attrs);
        assert_eq!(sections.len(), 1);
        let keys: Vec<_> = sections[0]
            .attributes
            .iter()
            .map(|a| a.key.0.as_str())
            .collect();
        assert_eq!(keys, ["a", "d", "b", "c"]);
    }

    #[test]
    fn sections_serialize_for_rendering() {
        let attrs = attributes(json!([
            {"key": "enabled", "default": "true", "format": {"category": "2.State"}}
        ]));
        let value = serde_json::to_value(form_sections(&attrs)).unwrap();
        assert_eq!(value[0]["category"], "2.State");
        assert_eq!(value[0]["attributes"][0]["key"], "enabled");
    }
}
