//! Schema cache
//!
//! Object types of the configured object schema and the attribute
//! definitions of each type, fetched once in ConfigureProvider and shared
//! read-only with every resource instance afterwards.

use crate::api::{ApiError, Client};
use crate::codec::TypeCode;
use futures::future::try_join_all;

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTypeDefinition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    pub id: String,
    pub name: String,
    pub type_code: TypeCode,
    /// Name of the object type this definition was fetched for
    pub object_type_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    object_types: Vec<ObjectTypeDefinition>,
    attributes: Vec<AttributeDefinition>,
}

impl SchemaCache {
    pub fn new(
        object_types: Vec<ObjectTypeDefinition>,
        attributes: Vec<AttributeDefinition>,
    ) -> Self {
        Self {
            object_types,
            attributes,
        }
    }

    /// Fetch every object type of `object_schema_id` and the editable
    /// attributes of each, inherited ones included. Inherited attributes are
    /// recorded once per type they were fetched for.
    pub async fn build(client: &Client, object_schema_id: &str) -> Result<Self, ApiError> {
        let types = client.object_schema().object_types(object_schema_id).await?;

        let per_type = try_join_all(types.iter().map(|object_type| async move {
            client
                .object_schema()
                .object_type_attributes(&object_type.id)
                .await
                .map(|attributes| (object_type, attributes))
        }))
        .await?;

        let mut attributes = Vec::new();
        for (object_type, definitions) in per_type {
            attributes.extend(definitions.into_iter().map(|definition| AttributeDefinition {
                id: definition.id,
                name: definition.name,
                type_code: TypeCode::from(definition.type_code),
                object_type_name: object_type.name.clone(),
            }));
        }

        let object_types: Vec<ObjectTypeDefinition> = types
            .into_iter()
            .map(|object_type| ObjectTypeDefinition {
                id: object_type.id,
                name: object_type.name,
            })
            .collect();

        tracing::info!(
            object_schema_id,
            object_types = object_types.len(),
            attributes = attributes.len(),
            "Loaded Assets object schema"
        );

        Ok(Self::new(object_types, attributes))
    }

    pub fn resolve_object_type(&self, name: &str) -> Option<&ObjectTypeDefinition> {
        self.object_types.iter().find(|object_type| object_type.name == name)
    }

    pub fn resolve_attribute(
        &self,
        name: &str,
        object_type_name: &str,
    ) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|attribute| {
            attribute.name == name && attribute.object_type_name == object_type_name
        })
    }

    pub fn object_types(&self) -> &[ObjectTypeDefinition] {
        &self.object_types
    }

    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const WS_PATH: &str = "/jsm/assets/workspace/ws-1/v1";

    fn attribute(id: &str, name: &str, type_code: TypeCode, owner: &str) -> AttributeDefinition {
        AttributeDefinition {
            id: id.to_string(),
            name: name.to_string(),
            type_code,
            object_type_name: owner.to_string(),
        }
    }

    fn cache() -> SchemaCache {
        SchemaCache::new(
            vec![
                ObjectTypeDefinition {
                    id: "23".to_string(),
                    name: "Host".to_string(),
                },
                ObjectTypeDefinition {
                    id: "24".to_string(),
                    name: "Host".to_string(),
                },
            ],
            vec![
                attribute("135", "Status", TypeCode::Status, "Host"),
                attribute("136", "Status", TypeCode::Default, "Host"),
                attribute("140", "Status", TypeCode::Status, "Service"),
            ],
        )
    }

    #[test]
    fn object_type_lookup_returns_first_match() {
        assert_eq!(cache().resolve_object_type("Host").unwrap().id, "23");
    }

    #[test]
    fn attribute_lookup_is_scoped_to_object_type() {
        let cache = cache();
        assert_eq!(cache.resolve_attribute("Status", "Host").unwrap().id, "135");
        assert_eq!(
            cache.resolve_attribute("Status", "Service").unwrap().id,
            "140"
        );
    }

    #[test]
    fn missing_names_resolve_to_none() {
        let cache = cache();
        assert!(cache.resolve_object_type("Router").is_none());
        assert!(cache.resolve_attribute("Owner", "Host").is_none());
        assert!(cache.resolve_attribute("Status", "Router").is_none());
    }

    #[tokio::test]
    async fn build_fetches_attributes_per_object_type() {
        let mut server = Server::new_async().await;
        let types = server
            .mock("GET", format!("{WS_PATH}/objectschema/3/objecttypes").as_str())
            .match_query(Matcher::UrlEncoded(
                "excludeAbstract".into(),
                "false".into(),
            ))
            .with_body(
                r#"[{"id":"23","name":"Host","objectSchemaId":"3"},{"id":"24","name":"Service","objectSchemaId":"3"}]"#,
            )
            .create_async()
            .await;
        let host_attrs = server
            .mock("GET", format!("{WS_PATH}/objecttype/23/attributes").as_str())
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("onlyValueEditable".into(), "true".into()),
                Matcher::UrlEncoded("includeChildren".into(), "true".into()),
            ]))
            .with_body(
                r#"[{"id":"130","name":"Name","type":0,"objectType":{"id":"20","name":"Asset"}},{"id":"135","name":"Status","type":7}]"#,
            )
            .create_async()
            .await;
        let service_attrs = server
            .mock("GET", format!("{WS_PATH}/objecttype/24/attributes").as_str())
            .match_query(Matcher::Any)
            .with_body(r#"[{"id":"130","name":"Name","type":0},{"id":"150","name":"Host","type":1}]"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "ws-1", "user", "secret").unwrap();
        let cache = SchemaCache::build(&client, "3").await.unwrap();

        assert_eq!(cache.object_types().len(), 2);
        assert_eq!(cache.attributes().len(), 4);

        // Inherited "Name" is scoped to the type it was fetched for
        let name = cache.resolve_attribute("Name", "Host").unwrap();
        assert_eq!(name.object_type_name, "Host");
        assert_eq!(
            cache.resolve_attribute("Status", "Host").unwrap().type_code,
            TypeCode::Status
        );
        assert_eq!(
            cache.resolve_attribute("Host", "Service").unwrap().type_code,
            TypeCode::Reference
        );

        types.assert_async().await;
        host_attrs.assert_async().await;
        service_attrs.assert_async().await;
    }

    #[tokio::test]
    async fn build_fails_when_attribute_fetch_fails() {
        let mut server = Server::new_async().await;
        let _types = server
            .mock("GET", format!("{WS_PATH}/objectschema/3/objecttypes").as_str())
            .match_query(Matcher::Any)
            .with_body(r#"[{"id":"23","name":"Host"}]"#)
            .create_async()
            .await;
        let _attrs = server
            .mock("GET", format!("{WS_PATH}/objecttype/23/attributes").as_str())
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = Client::new(&server.url(), "ws-1", "user", "secret").unwrap();
        let result = SchemaCache::build(&client, "3").await;

        assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
    }
}
