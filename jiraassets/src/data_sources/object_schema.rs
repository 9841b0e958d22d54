//! `jiraassets_object_schema` data source
//!
//! Exposes the schema cache loaded at configure time, so configurations can
//! look up object type and attribute IDs by name.

use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource,
    DataSourceMetadataRequest, DataSourceMetadataResponse, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::provider_data::AssetsProviderData;

pub const DATA_SOURCE_TYPE: &str = "jiraassets_object_schema";

#[derive(Default)]
pub struct ObjectSchemaDataSource {
    provider_data: Option<AssetsProviderData>,
}

impl ObjectSchemaDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        let string_map = || AttributeType::Map(Box::new(AttributeType::String));

        SchemaBuilder::new()
            .version(0)
            .description("Object types and attributes of the configured Assets object schema.")
            .attribute(
                AttributeBuilder::new("object_schema_id", AttributeType::String)
                    .description("ID of the object schema the provider is configured with.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("object_types", string_map())
                    .description("Object type IDs keyed by object type name.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("attributes", string_map())
                    .description("Attribute IDs keyed by \"<object type>/<attribute>\".")
                    .computed()
                    .build(),
            )
            .build()
    }

    fn state(data: &AssetsProviderData) -> tfplug::Result<DynamicValue> {
        let mut object_types = HashMap::new();
        // First definition wins, matching lookups by name
        for object_type in data.schema.object_types() {
            object_types
                .entry(object_type.name.clone())
                .or_insert_with(|| Dynamic::String(object_type.id.clone()));
        }

        let mut attributes = HashMap::new();
        for attribute in data.schema.attributes() {
            attributes
                .entry(format!("{}/{}", attribute.object_type_name, attribute.name))
                .or_insert_with(|| Dynamic::String(attribute.id.clone()));
        }

        let mut state = DynamicValue::object();
        state.set_string(
            &AttributePath::new("object_schema_id"),
            data.object_schema_id.clone(),
        )?;
        state.set_map(&AttributePath::new("object_types"), object_types)?;
        state.set_map(&AttributePath::new("attributes"), attributes)?;
        Ok(state)
    }
}

#[async_trait]
impl DataSource for ObjectSchemaDataSource {
    fn type_name(&self) -> &str {
        DATA_SOURCE_TYPE
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let Some(data) = &self.provider_data else {
            return ReadDataSourceResponse {
                state: request.config,
                diagnostics: vec![Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                )],
            };
        };

        match Self::state(data) {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(e) => ReadDataSourceResponse {
                state: request.config,
                diagnostics: vec![Diagnostic::error("Failed to set state", e.to_string())],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ObjectSchemaDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<AssetsProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Unexpected Data Source Configure Type",
                    "Failed to extract AssetsProviderData from provider data. \
                     Please report this issue to the provider developers.",
                ));
            }
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}
