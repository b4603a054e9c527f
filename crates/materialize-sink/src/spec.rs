//! Plugin specification advertised to the pipeline host.

use crate::config::{KEY_KEY, KEY_TABLE, KEY_URL};
use serde::Serialize;
use std::collections::BTreeMap;

/// Description of one destination setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub default: String,
    pub required: bool,
    pub description: String,
}

impl Parameter {
    fn required(description: &str) -> Self {
        Self {
            default: String::new(),
            required: true,
            description: description.to_string(),
        }
    }
}

/// Name, version and settings of the connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Specification {
    pub name: String,
    pub summary: String,
    pub version: String,
    pub author: String,
    pub destination_params: BTreeMap<String, Parameter>,
}

/// The specification of the Materialize destination.
pub fn specification() -> Specification {
    Specification {
        name: "materialize".to_string(),
        summary: "A Materialize destination connector written in Rust.".to_string(),
        version: format!("v{}", env!("CARGO_PKG_VERSION")),
        author: "Meroxa, Inc.".to_string(),
        destination_params: BTreeMap::from([
            (
                KEY_URL.to_string(),
                Parameter::required("The connection URL for Materialize instance."),
            ),
            (
                KEY_TABLE.to_string(),
                Parameter::required(
                    "The table name of the table in Materialize that the connector should write to, by default.",
                ),
            ),
            (
                KEY_KEY.to_string(),
                Parameter::required("The column name used when updating and deleting records."),
            ),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specification() {
        let spec = specification();
        assert_eq!(spec.name, "materialize");
        assert!(spec.version.starts_with('v'));

        let params: Vec<&str> = spec.destination_params.keys().map(String::as_str).collect();
        assert_eq!(params, vec!["key", "table", "url"]);
        assert!(spec
            .destination_params
            .values()
            .all(|p| p.required && p.default.is_empty()));
    }

    #[test]
    fn test_specification_serializes() {
        let json = serde_json::to_value(specification()).unwrap();
        assert_eq!(json["name"], "materialize");
        assert_eq!(json["destination_params"]["url"]["required"], true);
    }
}
