use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use mg_core::{MapgenError, MgValue};
use roxmltree::{Document, Node, NodeType, ParsingOptions};

/// Prefix marking a field that came from an XML attribute.
pub const ATTRIBUTE_PREFIX: &str = "@_";
/// Field holding the text of an element that also has attributes or children.
pub const TEXT_KEY: &str = "#text";

/// Parses an XML document into `{ <root tag>: <root value> }`.
///
/// Attributes become `@_name` string fields, child elements become fields keyed
/// by tag name (repeated siblings collapse into an array) and an element without
/// attributes or children collapses to its trimmed, type-coerced text.
pub fn parse_xml_document(source: &str, document_name: &str) -> Result<MgValue, MapgenError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(source, options)
        .map_err(|error| MapgenError::document_parse(document_name, error.to_string()))?;

    let root = document.root_element();
    let mut wrapper = BTreeMap::new();
    wrapper.insert(root.tag_name().name().to_string(), element_value(root));
    Ok(MgValue::Map(wrapper))
}

fn element_value(node: Node<'_, '_>) -> MgValue {
    let mut fields = BTreeMap::new();
    for attribute in node.attributes() {
        fields.insert(
            format!("{}{}", ATTRIBUTE_PREFIX, attribute.name()),
            MgValue::String(attribute.value().to_string()),
        );
    }

    let mut text = String::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => {
                let value = element_value(child);
                match fields.entry(child.tag_name().name().to_string()) {
                    Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                    Entry::Occupied(mut slot) => match slot.get_mut() {
                        MgValue::Array(values) => values.push(value),
                        existing => {
                            let first = std::mem::replace(existing, MgValue::Null);
                            *existing = MgValue::Array(vec![first, value]);
                        }
                    },
                }
            }
            NodeType::Text => text.push_str(child.text().unwrap_or_default()),
            _ => {}
        }
    }

    let text = text.trim();
    if fields.is_empty() {
        return coerce_text(text);
    }
    if !text.is_empty() {
        fields.insert(TEXT_KEY.to_string(), coerce_text(text));
    }
    MgValue::Map(fields)
}

fn coerce_text(text: &str) -> MgValue {
    match text {
        "true" => return MgValue::Bool(true),
        "false" => return MgValue::Bool(false),
        _ => {}
    }
    if looks_numeric(text) {
        if let Ok(number) = text.parse::<f64>() {
            return MgValue::Number(number);
        }
    }
    MgValue::String(text.to_string())
}

// `str::parse::<f64>` also accepts "inf" and "NaN", which must stay strings.
fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    digits.starts_with(|ch: char| ch.is_ascii_digit() || ch == '.')
        && digits
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '-' | '+'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(value: &MgValue) -> &MgValue {
        value.get("Entity").expect("root Entity should exist")
    }

    #[test]
    fn parse_xml_document_prefixes_attributes() {
        let parsed = parse_xml_document(
            r#"<Entity parent="template_unit"><Health max="100"/></Entity>"#,
            "unit.xml",
        )
        .expect("xml should parse");
        let root = entity(&parsed);
        assert_eq!(root.get("@_parent"), Some(&MgValue::from("template_unit")));
        assert_eq!(
            root.get("Health").and_then(|health| health.get("@_max")),
            Some(&MgValue::from("100"))
        );
    }

    #[test]
    fn parse_xml_document_coerces_leaf_text() {
        let parsed = parse_xml_document(
            r#"<Entity><Cost>  50 </Cost><Visible>true</Visible><Name>Hoplite</Name><Empty/><Ratio>-0.5</Ratio><Code>NaN</Code></Entity>"#,
            "unit.xml",
        )
        .expect("xml should parse");
        let root = entity(&parsed);
        assert_eq!(root.get("Cost"), Some(&MgValue::Number(50.0)));
        assert_eq!(root.get("Visible"), Some(&MgValue::Bool(true)));
        assert_eq!(root.get("Name"), Some(&MgValue::from("Hoplite")));
        assert_eq!(root.get("Empty"), Some(&MgValue::from("")));
        assert_eq!(root.get("Ratio"), Some(&MgValue::Number(-0.5)));
        assert_eq!(root.get("Code"), Some(&MgValue::from("NaN")));
    }

    #[test]
    fn parse_xml_document_collapses_repeated_siblings_into_array() {
        let parsed = parse_xml_document(
            r#"<Entity><Class>Infantry</Class><Class>Melee</Class><Class>Citizen</Class></Entity>"#,
            "unit.xml",
        )
        .expect("xml should parse");
        assert_eq!(
            entity(&parsed).get("Class"),
            Some(&MgValue::Array(vec![
                MgValue::from("Infantry"),
                MgValue::from("Melee"),
                MgValue::from("Citizen"),
            ]))
        );
    }

    #[test]
    fn parse_xml_document_keeps_text_next_to_attributes() {
        let parsed = parse_xml_document(
            r#"<Entity><Identity datatype="tokens">Foot <!-- note -->Soldier</Identity></Entity>"#,
            "unit.xml",
        )
        .expect("xml should parse");
        let identity = entity(&parsed).get("Identity").expect("identity");
        assert_eq!(identity.get("@_datatype"), Some(&MgValue::from("tokens")));
        assert_eq!(identity.get(TEXT_KEY), Some(&MgValue::from("Foot Soldier")));
    }

    #[test]
    fn parse_xml_document_accepts_declaration_and_cdata() {
        let parsed = parse_xml_document(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Entity><Note><![CDATA[a < b]]></Note></Entity>",
            "unit.xml",
        )
        .expect("xml should parse");
        assert_eq!(entity(&parsed).get("Note"), Some(&MgValue::from("a < b")));
    }

    #[test]
    fn parse_xml_document_returns_parse_error_for_invalid_xml() {
        let error = parse_xml_document("<Entity>", "broken.xml").expect_err("invalid xml should fail");
        assert_eq!(error.code(), "DOCUMENT_PARSE_ERROR");
        assert!(error.to_string().contains("broken.xml"));
    }
}
