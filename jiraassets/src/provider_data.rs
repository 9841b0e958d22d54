//! Provider data structure passed to resources and data sources

use crate::api::Client;
use crate::codec::DecodeMode;
use crate::config::ProviderSettings;
use crate::schema_cache::SchemaCache;
use crate::status::StatusTable;
use std::sync::Arc;

/// Everything resources need after ConfigureProvider; never mutated afterwards
#[derive(Clone)]
pub struct AssetsProviderData {
    pub client: Arc<Client>,
    pub object_schema_id: String,
    pub ignore_keys: Arc<[String]>,
    pub schema: Arc<SchemaCache>,
    pub statuses: Arc<StatusTable>,
    pub decode_mode: DecodeMode,
}

impl AssetsProviderData {
    pub fn new(
        client: Client,
        settings: &ProviderSettings,
        schema: SchemaCache,
        statuses: StatusTable,
    ) -> Self {
        Self {
            client: Arc::new(client),
            object_schema_id: settings.object_schema_id.clone(),
            ignore_keys: settings.ignore_keys.clone().into(),
            schema: Arc::new(schema),
            statuses: Arc::new(statuses),
            decode_mode: settings.decode_mode,
        }
    }
}
