use std::collections::BTreeMap;

use mg_core::{MapgenError, MgValue};
use rhai::{Array, Dynamic, EvalAltResult, ImmutableString, Map, Position, FLOAT, INT};

/// Integral numbers cross into scripts as `INT` so they work as indices and
/// range bounds; everything else stays `FLOAT`.
pub(crate) fn mgvalue_to_dynamic(value: &MgValue) -> Dynamic {
    match value {
        MgValue::Null => Dynamic::UNIT,
        MgValue::Bool(value) => Dynamic::from_bool(*value),
        MgValue::Number(value) => {
            if value.fract() == 0.0 && value.abs() < INT::MAX as f64 {
                Dynamic::from_int(*value as INT)
            } else {
                Dynamic::from_float(*value as FLOAT)
            }
        }
        MgValue::String(value) => Dynamic::from(value.clone()),
        MgValue::Array(values) => {
            Dynamic::from_array(values.iter().map(mgvalue_to_dynamic).collect::<Array>())
        }
        MgValue::Map(values) => {
            let mut map = Map::new();
            for (key, value) in values {
                map.insert(key.as_str().into(), mgvalue_to_dynamic(value));
            }
            Dynamic::from_map(map)
        }
    }
}

pub(crate) fn dynamic_to_mgvalue(value: Dynamic) -> Result<MgValue, MapgenError> {
    if value.is_unit() {
        return Ok(MgValue::Null);
    }
    if value.is::<bool>() {
        return Ok(MgValue::Bool(value.cast::<bool>()));
    }
    if value.is::<INT>() {
        return Ok(MgValue::Number(value.cast::<INT>() as f64));
    }
    if value.is::<FLOAT>() {
        return Ok(MgValue::Number(value.cast::<FLOAT>()));
    }
    if value.is::<ImmutableString>() {
        return Ok(MgValue::String(value.cast::<ImmutableString>().to_string()));
    }
    if value.is::<char>() {
        return Ok(MgValue::String(value.cast::<char>().to_string()));
    }
    if value.is::<Array>() {
        let array = value.cast::<Array>();
        let mut out = Vec::with_capacity(array.len());
        for item in array {
            out.push(dynamic_to_mgvalue(item)?);
        }
        return Ok(MgValue::Array(out));
    }
    if value.is::<Map>() {
        let map = value.cast::<Map>();
        let mut out = BTreeMap::new();
        for (key, value) in map {
            out.insert(key.to_string(), dynamic_to_mgvalue(value)?);
        }
        return Ok(MgValue::Map(out));
    }

    Err(MapgenError::host(
        "SCRIPT_VALUE_UNSUPPORTED",
        format!("Unsupported script value of type {}.", value.type_name()),
    ))
}

/// Wraps a host failure so it surfaces inside the calling script.
pub(crate) fn runtime_error(error: MapgenError) -> Box<EvalAltResult> {
    Box::new(EvalAltResult::ErrorRuntime(
        Dynamic::from(error.to_string()),
        Position::NONE,
    ))
}
