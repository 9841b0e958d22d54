//! Terraform provider for Jira Service Management Assets

pub mod api;
pub mod codec;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod provider_data;
pub mod resources;
pub mod schema_cache;
pub mod status;

pub use provider_data::AssetsProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, StopProviderRequest, StopProviderResponse,
    ValidateProviderConfigRequest, ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, ServerCapabilities};

use crate::api::Client;
use crate::config::ProviderSettings;
use crate::schema_cache::SchemaCache;
use crate::status::StatusTable;

pub const PROVIDER_TYPE: &str = "jiraassets";

pub struct JiraAssetsProvider {
    version: String,
}

impl Default for JiraAssetsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl JiraAssetsProvider {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("A Terraform provider for Jira Assets.")
            .attribute(
                AttributeBuilder::new("workspace_id", AttributeType::String)
                    .description("Workspace Id of the Assets instance.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("user", AttributeType::String)
                    .description(
                        "Username of an admin or service account with access to the Jira API.",
                    )
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("Personal access token for the admin or service account.")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("object_schema_id", AttributeType::String)
                    .description("ID of the object schema to use.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "ignore_keys",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .description("Attribute names never read back into the attributes map.")
                .optional()
                .build(),
            )
            .attribute(
                AttributeBuilder::new("api_url", AttributeType::String)
                    .description("Base URL of the Assets REST API. Defaults to https://api.atlassian.com.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("strict_attribute_decoding", AttributeType::Bool)
                    .description(
                        "Fail refreshes on attributes of unsupported types instead of reading them as empty strings.",
                    )
                    .optional()
                    .build(),
            )
            .build()
    }

    fn configure_error(diagnostic: Diagnostic) -> ConfigureProviderResponse {
        ConfigureProviderResponse {
            diagnostics: vec![diagnostic],
            provider_data: None,
        }
    }
}

#[async_trait]
impl Provider for JiraAssetsProvider {
    fn type_name(&self) -> &str {
        PROVIDER_TYPE
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: PROVIDER_TYPE.to_string(),
            server_capabilities: ServerCapabilities::default(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        tracing::info!(
            version = %self.version,
            terraform_version = %request.terraform_version,
            "Configuring Jira Assets provider"
        );

        let settings = match ProviderSettings::from_config(&request.config) {
            Ok(settings) => settings,
            Err(errors) => {
                return ConfigureProviderResponse {
                    diagnostics: errors.iter().map(|e| e.to_diagnostic()).collect(),
                    provider_data: None,
                }
            }
        };

        tracing::debug!(
            workspace_id = %settings.workspace_id,
            user = %settings.user,
            object_schema_id = %settings.object_schema_id,
            api_url = %settings.api_url,
            "Creating Assets client"
        );

        let client = match Client::new(
            &settings.api_url,
            &settings.workspace_id,
            &settings.user,
            &settings.password,
        ) {
            Ok(client) => client,
            Err(e) => {
                return Self::configure_error(
                    Diagnostic::error(
                        "Unable to create Assets client",
                        format!(
                            "An unexpected error occurred when creating the Assets API client. Error: {}",
                            e
                        ),
                    )
                    .with_attribute(AttributePath::new("api_url")),
                )
            }
        };

        let mut diagnostics = vec![];
        let schema = if settings.object_schema_id.is_empty() {
            diagnostics.push(
                Diagnostic::warning(
                    "Missing Assets object schema Id",
                    "No object_schema_id is configured and JIRAASSETS_OBJECTSCHEMA_ID is unset. \
                     Object types cannot be resolved, so jiraassets_object resources will fail to apply.",
                )
                .with_attribute(AttributePath::new("object_schema_id")),
            );
            SchemaCache::default()
        } else {
            match SchemaCache::build(&client, &settings.object_schema_id).await {
                Ok(schema) => schema,
                Err(e) => {
                    return Self::configure_error(Diagnostic::error(
                        "Unable to load Assets object schema",
                        format!(
                            "Fetching object types and attributes of object schema {} failed: {}",
                            settings.object_schema_id, e
                        ),
                    ))
                }
            }
        };

        let statuses = match StatusTable::load(&client, &settings.object_schema_id).await {
            Ok(statuses) => statuses,
            Err(e) => {
                return Self::configure_error(Diagnostic::error(
                    "Unable to load Assets status types",
                    format!("Fetching status types failed: {}", e),
                ))
            }
        };

        let provider_data = AssetsProviderData::new(client, &settings, schema, statuses);

        tracing::info!(
            object_types = provider_data.schema.object_types().len(),
            statuses = provider_data.statuses.len(),
            "Configured Jira Assets client"
        );

        ConfigureProviderResponse {
            diagnostics,
            provider_data: Some(Arc::new(provider_data)),
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        let mut diagnostics = vec![];

        if let Ok(api_url) = request.config.get_string(&AttributePath::new("api_url")) {
            if let Err(e) = url::Url::parse(&api_url) {
                diagnostics.push(
                    Diagnostic::error("Invalid Assets API URL", format!("{}: {}", api_url, e))
                        .with_attribute(AttributePath::new("api_url")),
                );
            }
        }

        ValidateProviderConfigResponse { diagnostics }
    }

    async fn stop(&self, _ctx: Context, _request: StopProviderRequest) -> StopProviderResponse {
        StopProviderResponse { error: None }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            resources::object::RESOURCE_TYPE.to_string(),
            Box::new(|| {
                Box::new(resources::ObjectResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            data_sources::object_schema::DATA_SOURCE_TYPE.to_string(),
            Box::new(|| {
                Box::new(data_sources::ObjectSchemaDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories
    }
}
