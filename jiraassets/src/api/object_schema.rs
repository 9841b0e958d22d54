//! Object schema and object type endpoints

use super::client::Client;
use super::error::ApiError;
use super::models::{ObjectType, ObjectTypeAttribute};

pub struct ObjectSchemaApi<'a> {
    client: &'a Client,
}

impl<'a> ObjectSchemaApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /objectschema/{id}/objecttypes, abstract types included
    pub async fn object_types(&self, schema_id: &str) -> Result<Vec<ObjectType>, ApiError> {
        self.client
            .get(&format!(
                "/objectschema/{}/objecttypes?excludeAbstract=false",
                urlencoding::encode(schema_id)
            ))
            .await
    }

    /// GET /objecttype/{id}/attributes, editable and inherited attributes only
    pub async fn object_type_attributes(
        &self,
        object_type_id: &str,
    ) -> Result<Vec<ObjectTypeAttribute>, ApiError> {
        self.client
            .get(&format!(
                "/objecttype/{}/attributes?onlyValueEditable=true&includeChildren=true",
                urlencoding::encode(object_type_id)
            ))
            .await
    }
}
