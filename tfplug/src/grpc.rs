//! gRPC service implementation for Terraform Plugin Protocol v6
//!
//! Translates protocol messages into calls on the [`Provider`] trait and the
//! resources/data sources it hands out. Resources are created from their
//! factory on every call and configured with the data captured during
//! ConfigureProvider, so no resource state outlives a single RPC.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::error::TfplugError;
use crate::proto;
use crate::provider::{
    ConfigureProviderRequest, Provider, ProviderMetadataRequest, ProviderSchemaRequest,
    StopProviderRequest, ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, ResourceSchemaRequest, ResourceWithConfigure,
    UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::schema::{DefaultRequest, PlanModifierRequest, Schema, StringKind};
use crate::types::{
    has_errors, AttributePath, AttributePathStep, Diagnostic, DiagnosticSeverity, Dynamic,
    DynamicValue,
};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Request, Response, Status};
use tracing::Instrument;

type ProviderData = Option<Arc<dyn Any + Send + Sync>>;

pub struct GrpcProviderServer<P: Provider> {
    provider: Arc<RwLock<P>>,
    provider_data: Arc<RwLock<ProviderData>>,
}

impl<P: Provider + 'static> GrpcProviderServer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(RwLock::new(provider)),
            provider_data: Arc::new(RwLock::new(None)),
        }
    }

    async fn new_resource(&self, type_name: &str) -> Option<Box<dyn ResourceWithConfigure>> {
        let provider = self.provider.read().await;
        let factories = provider.resources();
        factories.get(type_name).map(|factory| factory())
    }

    async fn new_data_source(&self, type_name: &str) -> Option<Box<dyn DataSourceWithConfigure>> {
        let provider = self.provider.read().await;
        let factories = provider.data_sources();
        factories.get(type_name).map(|factory| factory())
    }

    /// Fresh resource instance configured with the current provider data
    async fn resource(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> std::result::Result<Box<dyn ResourceWithConfigure>, Vec<Diagnostic>> {
        let mut resource = self.new_resource(type_name).await.ok_or_else(|| {
            vec![Diagnostic::error(
                "Unknown resource type",
                TfplugError::ResourceNotFound(type_name.to_string()).to_string(),
            )]
        })?;

        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(ctx.clone(), ConfigureResourceRequest { provider_data })
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }

        Ok(resource)
    }

    /// Fresh data source instance configured with the current provider data
    async fn data_source(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> std::result::Result<Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>> {
        let mut data_source = self.new_data_source(type_name).await.ok_or_else(|| {
            vec![Diagnostic::error(
                "Unknown data source type",
                TfplugError::DataSourceNotFound(type_name.to_string()).to_string(),
            )]
        })?;

        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }

        Ok(data_source)
    }
}

#[tonic::async_trait]
impl<P: Provider + 'static> proto::ProviderService for GrpcProviderServer<P> {
    async fn get_metadata(
        &self,
        _request: Request<proto::get_metadata::Request>,
    ) -> std::result::Result<Response<proto::get_metadata::Response>, Status> {
        let ctx = Context::for_rpc("GetMetadata");
        let provider = self.provider.read().await;
        let metadata = provider.metadata(ctx, ProviderMetadataRequest).await;

        let mut resources: Vec<String> = provider.resources().into_keys().collect();
        resources.sort();
        let mut data_sources: Vec<String> = provider.data_sources().into_keys().collect();
        data_sources.sort();

        Ok(Response::new(proto::get_metadata::Response {
            server_capabilities: Some(server_capabilities_to_proto(
                &metadata.server_capabilities,
            )),
            diagnostics: vec![],
            data_sources: data_sources
                .into_iter()
                .map(|type_name| proto::get_metadata::DataSourceMetadata { type_name })
                .collect(),
            resources: resources
                .into_iter()
                .map(|type_name| proto::get_metadata::ResourceMetadata { type_name })
                .collect(),
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<proto::get_provider_schema::Request>,
    ) -> std::result::Result<Response<proto::get_provider_schema::Response>, Status> {
        let ctx = Context::for_rpc("GetProviderSchema");
        let provider = self.provider.read().await;
        let mut diagnostics = Vec::new();

        let provider_schema = provider.schema(ctx.clone(), ProviderSchemaRequest).await;
        diagnostics.extend(provider_schema.diagnostics);
        let metadata = provider
            .metadata(ctx.clone(), ProviderMetadataRequest)
            .await;

        let mut resource_schemas = std::collections::HashMap::new();
        for (name, factory) in provider.resources() {
            let response = factory()
                .schema(ctx.clone(), ResourceSchemaRequest)
                .await;
            diagnostics.extend(response.diagnostics);
            resource_schemas.insert(name, schema_to_proto(&response.schema));
        }

        let mut data_source_schemas = std::collections::HashMap::new();
        for (name, factory) in provider.data_sources() {
            let response = factory()
                .schema(ctx.clone(), DataSourceSchemaRequest)
                .await;
            diagnostics.extend(response.diagnostics);
            data_source_schemas.insert(name, schema_to_proto(&response.schema));
        }

        Ok(Response::new(proto::get_provider_schema::Response {
            provider: Some(schema_to_proto(&provider_schema.schema)),
            resource_schemas,
            data_source_schemas,
            diagnostics: diagnostics_to_proto(diagnostics),
            provider_meta: None,
            server_capabilities: Some(server_capabilities_to_proto(
                &metadata.server_capabilities,
            )),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<proto::validate_provider_config::Request>,
    ) -> std::result::Result<Response<proto::validate_provider_config::Response>, Status> {
        let ctx = Context::for_rpc("ValidateProviderConfig");
        let req = request.into_inner();

        let diagnostics = match decode_value(req.config.as_ref()) {
            Ok(config) => {
                let provider = self.provider.read().await;
                provider
                    .validate(ctx, ValidateProviderConfigRequest { config })
                    .await
                    .diagnostics
            }
            Err(diags) => diags,
        };

        Ok(Response::new(proto::validate_provider_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<proto::validate_resource_config::Request>,
    ) -> std::result::Result<Response<proto::validate_resource_config::Response>, Status> {
        let ctx = Context::for_rpc("ValidateResourceConfig");
        let req = request.into_inner();

        let diagnostics = match (
            decode_value(req.config.as_ref()),
            self.resource(&ctx, &req.type_name).await,
        ) {
            (Ok(config), Ok(resource)) => {
                resource
                    .validate(
                        ctx.clone(),
                        ValidateResourceConfigRequest {
                            type_name: req.type_name,
                            config,
                        },
                    )
                    .instrument(ctx.span())
                    .await
                    .diagnostics
            }
            (Err(diags), _) | (_, Err(diags)) => diags,
        };

        Ok(Response::new(proto::validate_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<proto::validate_data_resource_config::Request>,
    ) -> std::result::Result<Response<proto::validate_data_resource_config::Response>, Status>
    {
        let ctx = Context::for_rpc("ValidateDataResourceConfig");
        let req = request.into_inner();

        let diagnostics = match (
            decode_value(req.config.as_ref()),
            self.data_source(&ctx, &req.type_name).await,
        ) {
            (Ok(config), Ok(data_source)) => {
                data_source
                    .validate(
                        ctx.clone(),
                        ValidateDataSourceConfigRequest {
                            type_name: req.type_name,
                            config,
                        },
                    )
                    .instrument(ctx.span())
                    .await
                    .diagnostics
            }
            (Err(diags), _) | (_, Err(diags)) => diags,
        };

        Ok(Response::new(proto::validate_data_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<proto::upgrade_resource_state::Request>,
    ) -> std::result::Result<Response<proto::upgrade_resource_state::Response>, Status> {
        let ctx = Context::for_rpc("UpgradeResourceState");
        let req = request.into_inner();
        tracing::debug!(
            tf_req_id = %ctx.request_id(),
            type_name = %req.type_name,
            version = req.version,
            "upgrading stored state"
        );

        let Some(resource) = self.new_resource(&req.type_name).await else {
            return Ok(Response::new(proto::upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_to_proto(vec![Diagnostic::error(
                    "Unknown resource type",
                    TfplugError::ResourceNotFound(req.type_name).to_string(),
                )]),
            }));
        };
        let schema = resource.schema(ctx, ResourceSchemaRequest).await.schema;

        let json = req.raw_state.map(|raw| raw.json).unwrap_or_default();
        let upgraded = DynamicValue::decode_json(&json)
            .map(|state| retain_schema_attributes(state, &schema))
            .and_then(|state| encode_value(&state));

        let response = match upgraded {
            Ok(upgraded_state) => proto::upgrade_resource_state::Response {
                upgraded_state: Some(upgraded_state),
                diagnostics: vec![],
            },
            Err(e) => proto::upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_to_proto(vec![Diagnostic::error(
                    "Unable to upgrade resource state",
                    e.to_string(),
                )]),
            },
        };

        Ok(Response::new(response))
    }

    async fn configure_provider(
        &self,
        request: Request<proto::configure_provider::Request>,
    ) -> std::result::Result<Response<proto::configure_provider::Response>, Status> {
        let ctx = Context::for_rpc("ConfigureProvider");
        let req = request.into_inner();

        let config = match decode_value(req.config.as_ref()) {
            Ok(config) => config,
            Err(diags) => {
                return Ok(Response::new(proto::configure_provider::Response {
                    diagnostics: diagnostics_to_proto(diags),
                }))
            }
        };

        let response = {
            let mut provider = self.provider.write().await;
            provider
                .configure(
                    ctx.clone(),
                    ConfigureProviderRequest {
                        terraform_version: req.terraform_version,
                        config,
                    },
                )
                .instrument(ctx.span())
                .await
        };

        if !has_errors(&response.diagnostics) {
            *self.provider_data.write().await = response.provider_data;
        }

        Ok(Response::new(proto::configure_provider::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<proto::read_resource::Request>,
    ) -> std::result::Result<Response<proto::read_resource::Response>, Status> {
        let ctx = Context::for_rpc("ReadResource");
        let req = request.into_inner();

        let current_state = match decode_value(req.current_state.as_ref()) {
            Ok(state) => state,
            Err(diags) => return Ok(Response::new(read_failure(req.current_state, diags))),
        };
        let resource = match self.resource(&ctx, &req.type_name).await {
            Ok(resource) => resource,
            Err(diags) => return Ok(Response::new(read_failure(req.current_state, diags))),
        };

        let response = resource
            .read(
                ctx.clone(),
                ReadResourceRequest {
                    type_name: req.type_name,
                    current_state,
                    private: req.private,
                    provider_meta: decode_optional(req.provider_meta.as_ref()),
                },
            )
            .instrument(ctx.span())
            .await;

        let new_state = match response.new_state {
            Some(state) => Some(encode_value(&state).map_err(internal)?),
            // Keep what Terraform sent so a failed refresh doesn't drop the resource
            None if has_errors(&response.diagnostics) => req.current_state,
            None => Some(encode_value(&DynamicValue::null()).map_err(internal)?),
        };

        Ok(Response::new(proto::read_resource::Response {
            new_state,
            diagnostics: diagnostics_to_proto(response.diagnostics),
            private: response.private,
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<proto::plan_resource_change::Request>,
    ) -> std::result::Result<Response<proto::plan_resource_change::Response>, Status> {
        let ctx = Context::for_rpc("PlanResourceChange");
        let req = request.into_inner();

        let decoded = decode_value(req.prior_state.as_ref()).and_then(|prior| {
            Ok((
                prior,
                decode_value(req.proposed_new_state.as_ref())?,
                decode_value(req.config.as_ref())?,
            ))
        });
        let (prior_state, proposed_new_state, config) = match decoded {
            Ok(values) => values,
            Err(diags) => return Ok(Response::new(plan_failure(diags))),
        };

        // Destroy plans pass through untouched
        if proposed_new_state.is_null() {
            return Ok(Response::new(proto::plan_resource_change::Response {
                planned_state: req.proposed_new_state,
                requires_replace: vec![],
                planned_private: req.prior_private,
                diagnostics: vec![],
                legacy_type_system: false,
            }));
        }

        let Some(resource) = self.new_resource(&req.type_name).await else {
            return Ok(Response::new(plan_failure(vec![Diagnostic::error(
                "Unknown resource type",
                TfplugError::ResourceNotFound(req.type_name).to_string(),
            )])));
        };
        let schema = resource
            .schema(ctx.clone(), ResourceSchemaRequest)
            .await
            .schema;

        let plan = plan_attributes(&schema, &prior_state, proposed_new_state, &config);
        tracing::debug!(
            tf_req_id = %ctx.request_id(),
            type_name = %req.type_name,
            requires_replace = plan.requires_replace.len(),
            "planned resource change"
        );

        Ok(Response::new(proto::plan_resource_change::Response {
            planned_state: Some(encode_value(&plan.planned_state).map_err(internal)?),
            requires_replace: plan
                .requires_replace
                .into_iter()
                .map(path_to_proto)
                .collect(),
            planned_private: req.prior_private,
            diagnostics: diagnostics_to_proto(plan.diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<proto::apply_resource_change::Request>,
    ) -> std::result::Result<Response<proto::apply_resource_change::Response>, Status> {
        let ctx = Context::for_rpc("ApplyResourceChange");
        let req = request.into_inner();

        let decoded = decode_value(req.prior_state.as_ref()).and_then(|prior| {
            Ok((
                prior,
                decode_value(req.planned_state.as_ref())?,
                decode_value(req.config.as_ref())?,
            ))
        });
        let (prior_state, planned_state, config) = match decoded {
            Ok(values) => values,
            Err(diags) => return Ok(Response::new(apply_failure(req.prior_state, diags))),
        };
        let resource = match self.resource(&ctx, &req.type_name).await {
            Ok(resource) => resource,
            Err(diags) => return Ok(Response::new(apply_failure(req.prior_state, diags))),
        };
        let provider_meta = decode_optional(req.provider_meta.as_ref());

        let (new_state, private, diagnostics) = if planned_state.is_null() {
            let response = resource
                .delete(
                    ctx.clone(),
                    DeleteResourceRequest {
                        type_name: req.type_name,
                        prior_state: prior_state.clone(),
                        planned_private: req.planned_private,
                        provider_meta,
                    },
                )
                .instrument(ctx.span())
                .await;
            let new_state = if has_errors(&response.diagnostics) {
                prior_state
            } else {
                DynamicValue::null()
            };
            (new_state, Vec::new(), response.diagnostics)
        } else if prior_state.is_null() {
            let response = resource
                .create(
                    ctx.clone(),
                    CreateResourceRequest {
                        type_name: req.type_name,
                        planned_state,
                        config,
                        planned_private: req.planned_private,
                        provider_meta,
                    },
                )
                .instrument(ctx.span())
                .await;
            let new_state = if has_errors(&response.diagnostics) {
                DynamicValue::null()
            } else {
                response.new_state
            };
            (new_state, response.private, response.diagnostics)
        } else {
            let response = resource
                .update(
                    ctx.clone(),
                    UpdateResourceRequest {
                        type_name: req.type_name,
                        prior_state: prior_state.clone(),
                        planned_state,
                        config,
                        planned_private: req.planned_private,
                        provider_meta,
                    },
                )
                .instrument(ctx.span())
                .await;
            let new_state = if has_errors(&response.diagnostics) {
                prior_state
            } else {
                response.new_state
            };
            (new_state, response.private, response.diagnostics)
        };

        Ok(Response::new(proto::apply_resource_change::Response {
            new_state: Some(encode_value(&new_state).map_err(internal)?),
            private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<proto::import_resource_state::Request>,
    ) -> std::result::Result<Response<proto::import_resource_state::Response>, Status> {
        let ctx = Context::for_rpc("ImportResourceState");
        let req = request.into_inner();

        let resource = match self.resource(&ctx, &req.type_name).await {
            Ok(resource) => resource,
            Err(diags) => {
                return Ok(Response::new(proto::import_resource_state::Response {
                    imported_resources: vec![],
                    diagnostics: diagnostics_to_proto(diags),
                }))
            }
        };

        let response = resource
            .import_state(
                ctx.clone(),
                ImportResourceStateRequest {
                    type_name: req.type_name,
                    id: req.id,
                },
            )
            .instrument(ctx.span())
            .await;

        let mut imported_resources = Vec::with_capacity(response.imported_resources.len());
        for imported in response.imported_resources {
            imported_resources.push(proto::import_resource_state::ImportedResource {
                type_name: imported.type_name,
                state: Some(encode_value(&imported.state).map_err(internal)?),
                private: imported.private,
            });
        }

        Ok(Response::new(proto::import_resource_state::Response {
            imported_resources,
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<proto::read_data_source::Request>,
    ) -> std::result::Result<Response<proto::read_data_source::Response>, Status> {
        let ctx = Context::for_rpc("ReadDataSource");
        let req = request.into_inner();

        let config = match decode_value(req.config.as_ref()) {
            Ok(config) => config,
            Err(diags) => return Ok(Response::new(data_source_failure(diags))),
        };
        let data_source = match self.data_source(&ctx, &req.type_name).await {
            Ok(data_source) => data_source,
            Err(diags) => return Ok(Response::new(data_source_failure(diags))),
        };

        let response = data_source
            .read(
                ctx.clone(),
                ReadDataSourceRequest {
                    type_name: req.type_name,
                    config,
                    provider_meta: decode_optional(req.provider_meta.as_ref()),
                },
            )
            .instrument(ctx.span())
            .await;

        let state = if has_errors(&response.diagnostics) && response.state.is_null() {
            None
        } else {
            Some(encode_value(&response.state).map_err(internal)?)
        };

        Ok(Response::new(proto::read_data_source::Response {
            state,
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<proto::stop_provider::Request>,
    ) -> std::result::Result<Response<proto::stop_provider::Response>, Status> {
        let ctx = Context::for_rpc("StopProvider");
        let provider = self.provider.read().await;
        let response = provider.stop(ctx, StopProviderRequest).await;

        Ok(Response::new(proto::stop_provider::Response {
            error: response.error.unwrap_or_default(),
        }))
    }
}

/// Result of the framework's planning pass for one resource
pub struct PlannedChange {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Applies defaults, unknown-marking and plan modifiers to a proposed new state
///
/// Order matters: defaults fill null optional+computed attributes first, then
/// computed attributes left null in configuration become unknown when the
/// resource is being created or changed, then plan modifiers run per attribute.
pub fn plan_attributes(
    schema: &Schema,
    prior_state: &DynamicValue,
    proposed_new_state: DynamicValue,
    config: &DynamicValue,
) -> PlannedChange {
    let mut planned_state = proposed_new_state;
    let mut requires_replace = Vec::new();
    let mut diagnostics = Vec::new();

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        let Some(default) = &attr.default else {
            continue;
        };
        if attr.optional && attr.computed && attribute_value(config, &attr.name).is_null() {
            let value = default.default_value(DefaultRequest { path: path.clone() }).value;
            if let Err(e) = planned_state.set_value(&path, value.value) {
                diagnostics.push(
                    Diagnostic::error("Unable to apply default value", e.to_string())
                        .with_attribute(path),
                );
            }
        }
    }

    if prior_state.is_null() || planned_state != *prior_state {
        for attr in &schema.block.attributes {
            if attr.computed
                && attr.default.is_none()
                && attribute_value(config, &attr.name).is_null()
            {
                let path = AttributePath::new(&attr.name);
                if let Err(e) = planned_state.mark_unknown(&path) {
                    diagnostics.push(
                        Diagnostic::error("Unable to mark value unknown", e.to_string())
                            .with_attribute(path),
                    );
                }
            }
        }
    }

    for attr in &schema.block.attributes {
        if attr.plan_modifiers.is_empty() {
            continue;
        }

        let path = AttributePath::new(&attr.name);
        let state_value = DynamicValue::new(attribute_value(prior_state, &attr.name));
        let config_value = DynamicValue::new(attribute_value(config, &attr.name));
        let mut plan_value = DynamicValue::new(attribute_value(&planned_state, &attr.name));

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifierRequest {
                config_value: config_value.clone(),
                state_value: state_value.clone(),
                plan_value,
                path: path.clone(),
            });
            plan_value = response.plan_value;
            diagnostics.extend(response.diagnostics);
            if response.requires_replace && !requires_replace.contains(&path) {
                requires_replace.push(path.clone());
            }
        }

        if let Err(e) = planned_state.set_value(&path, plan_value.value) {
            diagnostics.push(
                Diagnostic::error("Unable to apply plan modifier", e.to_string())
                    .with_attribute(path),
            );
        }
    }

    PlannedChange {
        planned_state,
        requires_replace,
        diagnostics,
    }
}

fn attribute_value(value: &DynamicValue, name: &str) -> Dynamic {
    value
        .get(&AttributePath::new(name))
        .cloned()
        .unwrap_or(Dynamic::Null)
}

/// Drops attributes the current schema no longer declares; cty rejects unknown object keys
fn retain_schema_attributes(mut state: DynamicValue, schema: &Schema) -> DynamicValue {
    if let Dynamic::Map(values) = &mut state.value {
        values.retain(|name, _| schema.attribute(name).is_some());
    }
    state
}

fn decode_value(
    value: Option<&proto::DynamicValue>,
) -> std::result::Result<DynamicValue, Vec<Diagnostic>> {
    let decoded = match value {
        None => Ok(DynamicValue::null()),
        Some(v) if !v.msgpack.is_empty() => DynamicValue::decode_msgpack(&v.msgpack),
        Some(v) if !v.json.is_empty() => DynamicValue::decode_json(&v.json),
        Some(_) => Ok(DynamicValue::null()),
    };

    decoded.map_err(|e| vec![Diagnostic::error("Unable to decode value", e.to_string())])
}

fn decode_optional(value: Option<&proto::DynamicValue>) -> Option<DynamicValue> {
    decode_value(value).ok().filter(|v| !v.is_null())
}

fn encode_value(value: &DynamicValue) -> crate::Result<proto::DynamicValue> {
    Ok(proto::DynamicValue {
        msgpack: value.encode_msgpack()?,
        json: vec![],
    })
}

fn internal(e: TfplugError) -> Status {
    Status::internal(e.to_string())
}

fn read_failure(
    current_state: Option<proto::DynamicValue>,
    diagnostics: Vec<Diagnostic>,
) -> proto::read_resource::Response {
    proto::read_resource::Response {
        new_state: current_state,
        diagnostics: diagnostics_to_proto(diagnostics),
        private: vec![],
    }
}

fn plan_failure(diagnostics: Vec<Diagnostic>) -> proto::plan_resource_change::Response {
    proto::plan_resource_change::Response {
        planned_state: None,
        requires_replace: vec![],
        planned_private: vec![],
        diagnostics: diagnostics_to_proto(diagnostics),
        legacy_type_system: false,
    }
}

fn apply_failure(
    prior_state: Option<proto::DynamicValue>,
    diagnostics: Vec<Diagnostic>,
) -> proto::apply_resource_change::Response {
    proto::apply_resource_change::Response {
        new_state: prior_state,
        private: vec![],
        diagnostics: diagnostics_to_proto(diagnostics),
        legacy_type_system: false,
    }
}

fn data_source_failure(diagnostics: Vec<Diagnostic>) -> proto::read_data_source::Response {
    proto::read_data_source::Response {
        state: None,
        diagnostics: diagnostics_to_proto(diagnostics),
    }
}

fn schema_to_proto(schema: &Schema) -> proto::Schema {
    let block = &schema.block;
    proto::Schema {
        version: schema.version,
        block: Some(proto::schema::Block {
            version: block.version,
            attributes: block
                .attributes
                .iter()
                .map(|attr| proto::schema::Attribute {
                    name: attr.name.clone(),
                    r#type: attr.r#type.to_cty_json().to_string().into_bytes(),
                    description: attr.description.clone(),
                    required: attr.required,
                    optional: attr.optional,
                    computed: attr.computed,
                    sensitive: attr.sensitive,
                    description_kind: string_kind_to_proto(block.description_kind),
                    deprecated: attr.deprecated,
                    write_only: false,
                })
                .collect(),
            block_types: vec![],
            description: block.description.clone(),
            description_kind: string_kind_to_proto(block.description_kind),
            deprecated: block.deprecated,
        }),
    }
}

fn string_kind_to_proto(kind: StringKind) -> i32 {
    match kind {
        StringKind::Plain => proto::StringKind::Plain as i32,
        StringKind::Markdown => proto::StringKind::Markdown as i32,
    }
}

fn server_capabilities_to_proto(
    capabilities: &crate::types::ServerCapabilities,
) -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: capabilities.plan_destroy,
        get_provider_schema_optional: capabilities.get_provider_schema_optional,
        move_resource_state: capabilities.move_resource_state,
    }
}

fn path_to_proto(path: AttributePath) -> proto::AttributePath {
    use proto::attribute_path::step::Selector;

    proto::AttributePath {
        steps: path
            .steps
            .into_iter()
            .map(|step| proto::attribute_path::Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name),
                    AttributePathStep::ElementKeyString(key) => Selector::ElementKeyString(key),
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(idx),
                }),
            })
            .collect(),
    }
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<proto::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|diag| proto::Diagnostic {
            severity: match diag.severity {
                DiagnosticSeverity::Invalid => proto::diagnostic::Severity::Invalid as i32,
                DiagnosticSeverity::Error => proto::diagnostic::Severity::Error as i32,
                DiagnosticSeverity::Warning => proto::diagnostic::Severity::Warning as i32,
            },
            summary: diag.summary,
            detail: diag.detail,
            attribute: diag.attribute.map(path_to_proto),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::defaults::StaticDefault;
    use crate::plan_modifier::UseStateForUnknown;
    use crate::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
    use std::collections::HashMap;

    fn object_schema() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .plan_modifier(UseStateForUnknown::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("updated", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("type", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("has_avatar", AttributeType::Bool)
                    .optional()
                    .computed()
                    .default(StaticDefault::bool(false))
                    .build(),
            )
            .build()
    }

    fn object(values: &[(&str, Dynamic)]) -> DynamicValue {
        DynamicValue::new(Dynamic::Map(
            values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        ))
    }

    fn string(s: &str) -> Dynamic {
        Dynamic::String(s.to_string())
    }

    #[test]
    fn create_plan_marks_computed_unknown_and_applies_default() {
        let config = object(&[
            ("id", Dynamic::Null),
            ("updated", Dynamic::Null),
            ("type", string("Host")),
            ("has_avatar", Dynamic::Null),
        ]);

        let plan = plan_attributes(&object_schema(), &DynamicValue::null(), config.clone(), &config);

        let state = plan.planned_state;
        assert!(state.get(&AttributePath::new("id")).unwrap().is_unknown());
        assert!(state.get(&AttributePath::new("updated")).unwrap().is_unknown());
        assert!(!state.get_bool(&AttributePath::new("has_avatar")).unwrap());
        assert_eq!(state.get_string(&AttributePath::new("type")).unwrap(), "Host");
        assert!(plan.diagnostics.is_empty());
    }

    #[test]
    fn update_plan_keeps_ids_but_refreshes_updated() {
        let prior = object(&[
            ("id", string("1001")),
            ("updated", string("2024-01-01")),
            ("type", string("Host")),
            ("has_avatar", Dynamic::Bool(false)),
        ]);
        let config = object(&[
            ("id", Dynamic::Null),
            ("updated", Dynamic::Null),
            ("type", string("Server")),
            ("has_avatar", Dynamic::Null),
        ]);
        let proposed = object(&[
            ("id", string("1001")),
            ("updated", string("2024-01-01")),
            ("type", string("Server")),
            ("has_avatar", Dynamic::Bool(false)),
        ]);

        let plan = plan_attributes(&object_schema(), &prior, proposed, &config);

        let state = plan.planned_state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "1001");
        assert!(state.get(&AttributePath::new("updated")).unwrap().is_unknown());
        assert!(plan.requires_replace.is_empty());
    }

    #[test]
    fn unchanged_plan_is_left_alone() {
        let prior = object(&[
            ("id", string("1001")),
            ("updated", string("2024-01-01")),
            ("type", string("Host")),
            ("has_avatar", Dynamic::Bool(false)),
        ]);
        let config = object(&[
            ("id", Dynamic::Null),
            ("updated", Dynamic::Null),
            ("type", string("Host")),
            ("has_avatar", Dynamic::Null),
        ]);

        let plan = plan_attributes(&object_schema(), &prior, prior.clone(), &config);

        assert_eq!(plan.planned_state, prior);
    }

    #[test]
    fn upgrade_drops_undeclared_attributes() {
        let state = object(&[("type", string("Host")), ("legacy", string("x"))]);

        let upgraded = retain_schema_attributes(state, &object_schema());

        assert!(upgraded.get(&AttributePath::new("legacy")).is_err());
        assert_eq!(upgraded.get_string(&AttributePath::new("type")).unwrap(), "Host");
    }

    #[test]
    fn diagnostics_keep_attribute_path() {
        let diags = diagnostics_to_proto(vec![Diagnostic::error("Missing", "detail")
            .with_attribute(AttributePath::new("workspace_id"))]);

        assert_eq!(diags[0].severity, proto::diagnostic::Severity::Error as i32);
        let step = &diags[0].attribute.as_ref().unwrap().steps[0];
        assert_eq!(
            step.selector,
            Some(proto::attribute_path::step::Selector::AttributeName(
                "workspace_id".to_string()
            ))
        );
    }

    #[test]
    fn empty_dynamic_value_decodes_to_null() {
        let value = proto::DynamicValue {
            msgpack: vec![],
            json: vec![],
        };
        assert!(decode_value(Some(&value)).unwrap().is_null());
        assert!(decode_value(None).unwrap().is_null());
    }
}
