//! Attribute value codec
//!
//! Terraform models an object's attributes as a flat `name -> string` map.
//! Assets stores a list of typed attribute records whose representation
//! depends on the attribute's type code. This module converts single values
//! in both directions.

use crate::api::{ObjectAttribute, PayloadAttribute, PayloadValue};
use crate::error::MappingError;
use crate::schema_cache::SchemaCache;
use crate::status::StatusTable;

/// Assets attribute type codes the provider understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    /// Text, numbers, dates; the raw `value` is used
    Default,
    /// Reference to another object; the `searchValue` (object key) is used
    Reference,
    /// Status type; stored as the status ID, written as its name
    Status,
    Other(i64),
}

impl From<i64> for TypeCode {
    fn from(code: i64) -> Self {
        match code {
            0 => TypeCode::Default,
            1 => TypeCode::Reference,
            7 => TypeCode::Status,
            other => TypeCode::Other(other),
        }
    }
}

impl TypeCode {
    pub fn code(self) -> i64 {
        match self {
            TypeCode::Default => 0,
            TypeCode::Reference => 1,
            TypeCode::Status => 7,
            TypeCode::Other(code) => code,
        }
    }
}

/// How Read treats attributes that fail to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Fail the whole Read
    Strict,
    /// Keep an empty value for the attribute and log a warning
    #[default]
    Lenient,
}

/// Plain string for one remote attribute record
///
/// An attribute without values decodes to "". So does a status ID missing
/// from `statuses`.
pub fn decode(attribute: &ObjectAttribute, statuses: &StatusTable) -> Result<String, MappingError> {
    let type_code = TypeCode::from(attribute.object_type_attribute.type_code);
    if let TypeCode::Other(code) = type_code {
        return Err(MappingError::UnsupportedAttributeType(code));
    }

    let Some(first) = attribute.object_attribute_values.first() else {
        return Ok(String::new());
    };

    let decoded = match type_code {
        TypeCode::Reference => first.search_value.clone(),
        TypeCode::Status => first
            .status
            .as_ref()
            .and_then(|status| status.id.as_deref())
            .and_then(|id| statuses.name_for_id(id))
            .map(str::to_string),
        _ => first.value.clone(),
    };

    Ok(decoded.unwrap_or_default())
}

/// Payload record for attribute `name` of `object_type_name`
pub fn encode(
    name: &str,
    raw_value: &str,
    object_type_name: &str,
    schema: &SchemaCache,
    statuses: &StatusTable,
) -> Result<PayloadAttribute, MappingError> {
    let definition = schema
        .resolve_attribute(name, object_type_name)
        .ok_or_else(|| MappingError::UnknownAttribute {
            name: name.to_string(),
            object_type: object_type_name.to_string(),
        })?;

    let value = match definition.type_code {
        TypeCode::Status => statuses
            .id_for_name(raw_value)
            .map(str::to_string)
            .ok_or_else(|| MappingError::UnknownStatus {
                status: raw_value.to_string(),
                available: statuses.names().collect::<Vec<_>>().join(","),
            })?,
        _ => raw_value.to_string(),
    };

    Ok(PayloadAttribute {
        object_type_attribute_id: definition.id.clone(),
        object_attribute_values: vec![PayloadValue { value }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ObjectAttributeValue, ObjectTypeAttribute, StatusRef};
    use crate::schema_cache::{AttributeDefinition, ObjectTypeDefinition};
    use crate::status::StatusOption;

    fn statuses() -> StatusTable {
        StatusTable::new(vec![
            StatusOption::new("1", "Enabled"),
            StatusOption::new("2", "Disabled"),
        ])
    }

    fn schema() -> SchemaCache {
        let definition = |id: &str, name: &str, type_code| AttributeDefinition {
            id: id.to_string(),
            name: name.to_string(),
            type_code,
            object_type_name: "Host".to_string(),
        };
        SchemaCache::new(
            vec![ObjectTypeDefinition {
                id: "23".to_string(),
                name: "Host".to_string(),
            }],
            vec![
                definition("135", "Status", TypeCode::Status),
                definition("136", "Hostname", TypeCode::Default),
                definition("137", "Owner", TypeCode::Reference),
                definition("138", "Photo", TypeCode::Other(10)),
            ],
        )
    }

    /// What Read would see after writing `payload` for `type_code`
    fn remote_record(type_code: TypeCode, payload: &PayloadAttribute) -> ObjectAttribute {
        let written = payload.object_attribute_values[0].value.clone();
        let value = match type_code {
            TypeCode::Status => ObjectAttributeValue {
                status: Some(StatusRef {
                    id: Some(written),
                    ..Default::default()
                }),
                ..Default::default()
            },
            TypeCode::Reference => ObjectAttributeValue {
                search_value: Some(written),
                ..Default::default()
            },
            _ => ObjectAttributeValue {
                value: Some(written),
                ..Default::default()
            },
        };
        record(type_code.code(), vec![value])
    }

    fn record(type_code: i64, values: Vec<ObjectAttributeValue>) -> ObjectAttribute {
        ObjectAttribute {
            object_type_attribute: ObjectTypeAttribute {
                type_code,
                ..Default::default()
            },
            object_attribute_values: values,
            ..Default::default()
        }
    }

    #[test]
    fn status_name_encodes_to_status_id() {
        let payload = encode("Status", "Enabled", "Host", &schema(), &statuses()).unwrap();
        assert_eq!(payload.object_type_attribute_id, "135");
        assert_eq!(payload.object_attribute_values[0].value, "1");
    }

    #[test]
    fn unknown_status_lists_available_names() {
        let err = encode("Status", "Unknown", "Host", &schema(), &statuses()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown status, available statuses: Enabled,Disabled"
        );
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let err = encode("Rack", "A1", "Host", &schema(), &statuses()).unwrap_err();
        assert_eq!(
            err,
            MappingError::UnknownAttribute {
                name: "Rack".to_string(),
                object_type: "Host".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "unknown attribute \"Rack\" for object type \"Host\""
        );
    }

    #[test]
    fn attributes_of_other_object_types_do_not_resolve() {
        let result = encode("Status", "Enabled", "Service", &schema(), &statuses());
        assert!(matches!(result, Err(MappingError::UnknownAttribute { .. })));
    }

    #[test]
    fn status_values_round_trip() {
        let schema = schema();
        let statuses = statuses();
        for name in statuses.names() {
            let payload = encode("Status", name, "Host", &schema, &statuses).unwrap();
            let decoded = decode(&remote_record(TypeCode::Status, &payload), &statuses).unwrap();
            assert_eq!(decoded, name);
        }
    }

    #[test]
    fn plain_values_round_trip() {
        let schema = schema();
        let statuses = statuses();
        for (attribute, type_code) in [("Hostname", TypeCode::Default), ("Owner", TypeCode::Reference)] {
            for value in ["web-01", "", "CMDB-42", "ünïcode value"] {
                let payload = encode(attribute, value, "Host", &schema, &statuses).unwrap();
                let decoded = decode(&remote_record(type_code, &payload), &statuses).unwrap();
                assert_eq!(decoded, value);
            }
        }
    }

    #[test]
    fn reference_decodes_search_value() {
        let attribute = record(
            1,
            vec![ObjectAttributeValue {
                value: Some("ignored".to_string()),
                display_value: Some("John".to_string()),
                search_value: Some("CMDB-7".to_string()),
                status: None,
            }],
        );
        assert_eq!(decode(&attribute, &statuses()).unwrap(), "CMDB-7");
    }

    #[test]
    fn unmatched_status_decodes_to_empty() {
        let attribute = record(
            7,
            vec![ObjectAttributeValue {
                status: Some(StatusRef {
                    id: Some("99".to_string()),
                    name: "Gone".to_string(),
                    category: 0,
                }),
                ..Default::default()
            }],
        );
        assert_eq!(decode(&attribute, &statuses()).unwrap(), "");
    }

    #[test]
    fn attribute_without_values_decodes_to_empty() {
        assert_eq!(decode(&record(0, vec![]), &statuses()).unwrap(), "");
    }

    #[test]
    fn unsupported_type_code_fails_decode() {
        let err = decode(&record(10, vec![]), &statuses()).unwrap_err();
        assert_eq!(err.to_string(), "unsupported attribute type: 10");
    }

    #[test]
    fn type_codes_convert_both_ways() {
        for code in [0, 1, 7, 2, 10] {
            assert_eq!(TypeCode::from(code).code(), code);
        }
        assert_eq!(TypeCode::from(7), TypeCode::Status);
    }

    #[test]
    fn lenient_is_the_default_decode_mode() {
        assert_eq!(DecodeMode::default(), DecodeMode::Lenient);
    }
}
