//! Object CRUD endpoints

use super::client::Client;
use super::error::ApiError;
use super::models::{Object, ObjectAttribute, ObjectPayload};

pub struct ObjectsApi<'a> {
    client: &'a Client,
}

impl<'a> ObjectsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /object/{id}
    pub async fn get(&self, id: &str) -> Result<Object, ApiError> {
        self.client.get(&object_path(id)).await
    }

    /// GET /object/{id}/attributes
    pub async fn attributes(&self, id: &str) -> Result<Vec<ObjectAttribute>, ApiError> {
        self.client
            .get(&format!("{}/attributes", object_path(id)))
            .await
    }

    /// POST /object/create
    pub async fn create(&self, payload: &ObjectPayload) -> Result<Object, ApiError> {
        self.client.post("/object/create", payload).await
    }

    /// PUT /object/{id}
    ///
    /// Assets merges the payload into the object: attributes missing from
    /// `payload` keep their remote values.
    pub async fn update(&self, id: &str, payload: &ObjectPayload) -> Result<Object, ApiError> {
        self.client.put(&object_path(id), payload).await
    }

    /// DELETE /object/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&object_path(id)).await
    }
}

fn object_path(id: &str) -> String {
    format!("/object/{}", urlencoding::encode(id))
}
