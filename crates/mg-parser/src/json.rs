use mg_core::{MapgenError, MgValue};

pub fn parse_json_document(source: &str, document_name: &str) -> Result<MgValue, MapgenError> {
    let parsed: serde_json::Value = serde_json::from_str(source)
        .map_err(|error| MapgenError::document_parse(document_name, error.to_string()))?;
    Ok(MgValue::from(parsed))
}
