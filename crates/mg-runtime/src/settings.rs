use mg_core::MgValue;
use serde_json::json;

pub const MAP_SETTINGS_BINDING: &str = "g_MapSettings";

/// Settings a map script sees when no settings file is given: the largest map
/// size with eight players, one per civilisation.
pub fn default_map_settings() -> MgValue {
    MgValue::from(json!({
        "Name": "Unnamed map",
        "Description": "Give an interesting description of your map.",
        "Size": 512,
        "PlayerData": [
            { "Civ": "athen" },
            { "Civ": "cart" },
            { "Civ": "gaul" },
            { "Civ": "iber" },
            { "Civ": "mace" },
            { "Civ": "pers" },
            { "Civ": "rome" },
            { "Civ": "spart" }
        ],
        "CircularMap": true,
        "VictoryConditions": ["conquest"]
    }))
}
