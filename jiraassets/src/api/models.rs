//! Request and response bodies of the Assets REST API

use serde::{Deserialize, Deserializer, Serialize};

/// Object as returned by GET/POST/PUT on /object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Object {
    pub workspace_id: String,
    pub global_id: String,
    pub id: String,
    pub label: String,
    pub object_key: String,
    pub object_type: ObjectTypeRef,
    pub created: String,
    pub updated: String,
    pub has_avatar: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectTypeRef {
    pub id: String,
    pub name: String,
}

/// One entry of GET /object/{id}/attributes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectAttribute {
    pub id: String,
    pub object_type_attribute: ObjectTypeAttribute,
    pub object_type_attribute_id: String,
    pub object_attribute_values: Vec<ObjectAttributeValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectAttributeValue {
    #[serde(deserialize_with = "scalar_as_string")]
    pub value: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub display_value: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub search_value: Option<String>,
    pub status: Option<StatusRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusRef {
    #[serde(deserialize_with = "scalar_as_string")]
    pub id: Option<String>,
    pub name: String,
    pub category: i64,
}

/// Attribute definition of an object type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectTypeAttribute {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_code: i64,
    pub object_type: Option<ObjectTypeRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectType {
    pub id: String,
    pub name: String,
    pub object_schema_id: String,
    #[serde(rename = "abstractObjectType")]
    pub is_abstract: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusType {
    #[serde(deserialize_with = "scalar_as_string")]
    pub id: Option<String>,
    pub name: String,
    pub category: i64,
    pub description: Option<String>,
    pub object_schema_id: Option<String>,
}

/// Body of POST /object/create and PUT /object/{id}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPayload {
    pub object_type_id: String,
    #[serde(rename = "avatarUUID", skip_serializing_if = "Option::is_none")]
    pub avatar_uuid: Option<String>,
    pub has_avatar: bool,
    pub attributes: Vec<PayloadAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadAttribute {
    pub object_type_attribute_id: String,
    pub object_attribute_values: Vec<PayloadValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadValue {
    pub value: String,
}

/// Assets returns most scalars as strings but some attribute types carry
/// raw numbers or booleans
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_values_accept_non_string_scalars() {
        let attr: ObjectAttribute = serde_json::from_str(
            r#"{
                "id": "900",
                "objectTypeAttributeId": "135",
                "objectTypeAttribute": {"id": "135", "name": "Cores", "type": 0},
                "objectAttributeValues": [{"value": 8, "displayValue": "8", "searchValue": null}]
            }"#,
        )
        .unwrap();

        assert_eq!(attr.object_type_attribute.name, "Cores");
        assert_eq!(attr.object_attribute_values[0].value.as_deref(), Some("8"));
        assert_eq!(attr.object_attribute_values[0].search_value, None);
    }

    #[test]
    fn status_value_carries_status_reference() {
        let value: ObjectAttributeValue = serde_json::from_str(
            r#"{"value": null, "status": {"id": "1", "name": "Enabled", "category": 1}}"#,
        )
        .unwrap();

        let status = value.status.unwrap();
        assert_eq!(status.id.as_deref(), Some("1"));
        assert_eq!(status.name, "Enabled");
    }

    #[test]
    fn payload_uses_api_field_names() {
        let payload = ObjectPayload {
            object_type_id: "23".to_string(),
            avatar_uuid: None,
            has_avatar: false,
            attributes: vec![PayloadAttribute {
                object_type_attribute_id: "135".to_string(),
                object_attribute_values: vec![PayloadValue {
                    value: "1".to_string(),
                }],
            }],
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "objectTypeId": "23",
                "hasAvatar": false,
                "attributes": [
                    {"objectTypeAttributeId": "135", "objectAttributeValues": [{"value": "1"}]}
                ]
            })
        );
    }

    #[test]
    fn payload_includes_avatar_uuid_when_set() {
        let payload = ObjectPayload {
            object_type_id: "23".to_string(),
            avatar_uuid: Some("c0ffee".to_string()),
            has_avatar: true,
            attributes: vec![],
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["avatarUUID"], "c0ffee");
    }
}
