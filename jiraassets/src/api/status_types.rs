use super::client::Client;
use super::error::ApiError;
use super::models::StatusType;

pub struct StatusTypesApi<'a> {
    client: &'a Client,
}

impl<'a> StatusTypesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /config/statustype, optionally narrowed to one object schema
    pub async fn list(&self, object_schema_id: Option<&str>) -> Result<Vec<StatusType>, ApiError> {
        let path = match object_schema_id {
            Some(id) => format!(
                "/config/statustype?objectSchemaId={}",
                urlencoding::encode(id)
            ),
            None => "/config/statustype".to_string(),
        };
        self.client.get(&path).await
    }
}
