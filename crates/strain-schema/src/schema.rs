//! # Strain Schema Model
//!
//! Builds the JSON Schema describing a strain file's top-level shape.
//!
//! | Key role | Shape | Required |
//! |---|---|---|
//! | platform version | string matching `^v\d+\.\d+\.\d+$` | yes |
//! | package declarations (by pattern) | mapping with `name`, `repo`, `version` | no |
//! | themes | non-empty list of package-shaped mappings | no |
//! | theme names | non-empty list of non-empty strings | no |
//! | theme directories | non-empty list of non-empty strings | no |
//!
//! Every other key is accepted as-is so that strains can carry settings
//! for plugins this tool does not know about.

use serde_json::{json, Value};

use strain_core::StrainKeys;

/// Pattern for the platform version field.
pub const PLATFORM_VERSION_PATTERN: &str = r"^v\d+\.\d+\.\d+$";

/// Sub-fields every package or theme declaration must carry.
pub const SOURCED_PACKAGE_FIELDS: [&str; 3] = ["name", "repo", "version"];

/// Builder for the strain JSON Schema.
pub struct StrainSchema;

impl StrainSchema {
    /// Build the schema for the given key table.
    pub fn build(keys: &StrainKeys) -> Value {
        let mut properties = serde_json::Map::new();
        properties.insert(
            keys.platform_version.clone(),
            json!({ "type": "string", "pattern": PLATFORM_VERSION_PATTERN }),
        );
        properties.insert(
            keys.themes.clone(),
            json!({
                "type": "array",
                "minItems": 1,
                "items": { "$ref": "#/$defs/sourcedPackage" }
            }),
        );
        properties.insert(
            keys.themes_name.clone(),
            json!({ "$ref": "#/$defs/nonEmptyStringList" }),
        );
        properties.insert(
            keys.theme_dirs.clone(),
            json!({ "$ref": "#/$defs/nonEmptyStringList" }),
        );

        let mut pattern_properties = serde_json::Map::new();
        pattern_properties.insert(
            keys.package_pattern.clone(),
            json!({ "$ref": "#/$defs/sourcedPackage" }),
        );

        let package_properties: serde_json::Map<String, Value> = SOURCED_PACKAGE_FIELDS
            .iter()
            .map(|field| {
                (
                    (*field).to_string(),
                    json!({ "$ref": "#/$defs/nonEmptyString" }),
                )
            })
            .collect();

        json!({
            "title": "strain configuration",
            "type": "object",
            "required": [keys.platform_version],
            "properties": properties,
            "patternProperties": pattern_properties,
            "additionalProperties": true,
            "$defs": {
                "nonEmptyString": { "type": "string", "minLength": 1 },
                "nonEmptyStringList": {
                    "type": "array",
                    "minItems": 1,
                    "items": { "$ref": "#/$defs/nonEmptyString" }
                },
                "sourcedPackage": {
                    "type": "object",
                    "required": SOURCED_PACKAGE_FIELDS,
                    "properties": package_properties
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_uses_key_table_names() {
        let keys = StrainKeys {
            platform_version: "RELEASE".into(),
            themes: "THEMES".into(),
            ..StrainKeys::default()
        };
        let schema = StrainSchema::build(&keys);

        assert_eq!(schema["required"][0], "RELEASE");
        assert!(schema["properties"]["RELEASE"].is_object());
        assert!(schema["properties"]["THEMES"].is_object());
        assert!(schema["properties"].get("TUTOR_VERSION").is_none());
    }

    #[test]
    fn package_pattern_is_pattern_keyed() {
        let schema = StrainSchema::build(&StrainKeys::default());
        let pattern_props = schema["patternProperties"].as_object().unwrap();
        assert_eq!(pattern_props.len(), 1);
        assert!(pattern_props.contains_key("^PICASSO_.+_DPKG$"));
    }

    #[test]
    fn unknown_keys_are_permitted() {
        let schema = StrainSchema::build(&StrainKeys::default());
        assert_eq!(schema["additionalProperties"], true);
    }
}
