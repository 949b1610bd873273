mod json;
mod xml;

pub use json::parse_json_document;
pub use xml::{parse_xml_document, ATTRIBUTE_PREFIX, TEXT_KEY};
