//! Status lookup table
//!
//! Status attributes store a status type ID remotely while users write the
//! status name. The table is loaded once during provider configuration.

use crate::api::{ApiError, Client, StatusType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOption {
    pub id: String,
    pub name: String,
}

impl StatusOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Ordered (ID, name) pairs; lookups return the first match
#[derive(Debug, Clone, Default)]
pub struct StatusTable {
    options: Vec<StatusOption>,
}

impl StatusTable {
    pub fn new(options: Vec<StatusOption>) -> Self {
        Self { options }
    }

    /// Global status types followed by the ones scoped to `object_schema_id`
    pub async fn load(client: &Client, object_schema_id: &str) -> Result<Self, ApiError> {
        let mut types = client.status_types().list(None).await?;
        if !object_schema_id.is_empty() {
            types.extend(client.status_types().list(Some(object_schema_id)).await?);
        }

        let mut options: Vec<StatusOption> = Vec::with_capacity(types.len());
        for StatusType { id, name, .. } in types {
            let Some(id) = id else { continue };
            if options.iter().any(|option| option.id == id) {
                continue;
            }
            options.push(StatusOption { id, name });
        }

        tracing::debug!("Loaded {} status types", options.len());
        Ok(Self { options })
    }

    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .map(|option| option.id.as_str())
    }

    pub fn name_for_id(&self, id: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.id == id)
            .map(|option| option.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|option| option.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn table() -> StatusTable {
        StatusTable::new(vec![
            StatusOption::new("1", "Enabled"),
            StatusOption::new("2", "Disabled"),
            StatusOption::new("3", "Enabled"),
        ])
    }

    #[test]
    fn lookups_by_name_and_id() {
        let table = table();
        assert_eq!(table.id_for_name("Disabled"), Some("2"));
        assert_eq!(table.name_for_id("2"), Some("Disabled"));
        assert_eq!(table.id_for_name("Retired"), None);
        assert_eq!(table.name_for_id("99"), None);
    }

    #[test]
    fn duplicate_names_resolve_to_first_entry() {
        assert_eq!(table().id_for_name("Enabled"), Some("1"));
    }

    #[test]
    fn names_keep_table_order() {
        let table = table();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["Enabled", "Disabled", "Enabled"]);
    }

    #[tokio::test]
    async fn load_merges_global_and_schema_statuses() {
        let mut server = Server::new_async().await;
        let global = server
            .mock("GET", "/jsm/assets/workspace/ws-1/v1/config/statustype")
            .with_body(
                r#"[{"id":"1","name":"Enabled","category":1},{"id":"2","name":"Disabled","category":0}]"#,
            )
            .create_async()
            .await;
        let scoped = server
            .mock("GET", "/jsm/assets/workspace/ws-1/v1/config/statustype")
            .match_query(Matcher::UrlEncoded(
                "objectSchemaId".into(),
                "3".into(),
            ))
            .with_body(
                r#"[{"id":"2","name":"Disabled","category":0},{"id":"7","name":"Retired","category":0,"objectSchemaId":"3"}]"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "ws-1", "user", "secret").unwrap();
        let table = StatusTable::load(&client, "3").await.unwrap();

        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["Enabled", "Disabled", "Retired"]);
        assert_eq!(table.id_for_name("Retired"), Some("7"));

        global.assert_async().await;
        scoped.assert_async().await;
    }

    #[tokio::test]
    async fn load_skips_schema_query_without_schema_id() {
        let mut server = Server::new_async().await;
        let global = server
            .mock("GET", "/jsm/assets/workspace/ws-1/v1/config/statustype")
            .with_body(r#"[{"id":"1","name":"Enabled","category":1}]"#)
            .expect(1)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "ws-1", "user", "secret").unwrap();
        let table = StatusTable::load(&client, "").await.unwrap();

        assert_eq!(table.len(), 1);
        global.assert_async().await;
    }
}
