//! `jiraassets_object` resource
//!
//! Terraform models an object as its type name plus a flat map of attribute
//! names to string values. Names are resolved against the schema cache of
//! the object's type and encoded before any remote call, so a bad name or
//! status never reaches the API.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::api::{Object, ObjectAttribute, ObjectPayload};
use crate::codec::{self, DecodeMode};
use crate::error::MappingError;
use crate::provider_data::AssetsProviderData;

pub const RESOURCE_TYPE: &str = "jiraassets_object";

/// Managed by Assets itself and never part of the attribute map
pub const RESERVED_ATTRIBUTES: [&str; 3] = ["Created", "Key", "Updated"];

const ATTRIBUTE_NAMES: [&str; 11] = [
    "workspace_id",
    "global_id",
    "id",
    "label",
    "object_key",
    "type",
    "attributes",
    "created",
    "updated",
    "has_avatar",
    "avatar_uuid",
];

#[derive(Default)]
pub struct ObjectResource {
    provider_data: Option<AssetsProviderData>,
}

impl ObjectResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        let computed_string = |name: &str, description: &str| {
            AttributeBuilder::new(name, AttributeType::String)
                .description(description)
                .computed()
                .plan_modifier(UseStateForUnknown::create())
                .build()
        };

        SchemaBuilder::new()
            .version(0)
            .description("A Jira Assets object.")
            .attribute(computed_string(
                "workspace_id",
                "The ID of the workspace the object belongs to.",
            ))
            .attribute(computed_string("global_id", "The global ID of the object."))
            .attribute(computed_string("id", "The ID of the object."))
            .attribute(computed_string(
                "label",
                "The name of the object, taken from the attribute marked as label for its object type.",
            ))
            .attribute(computed_string(
                "object_key",
                "The external identifier of the object.",
            ))
            .attribute(
                AttributeBuilder::new("type", AttributeType::String)
                    .description("Name of the object type.")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "attributes",
                    AttributeType::Map(Box::new(AttributeType::String)),
                )
                .description(
                    "Attribute names and values of the object. Attributes removed from this map \
                     keep their current value in Assets.",
                )
                .required()
                .build(),
            )
            .attribute(computed_string("created", "Creation timestamp."))
            .attribute(
                AttributeBuilder::new("updated", AttributeType::String)
                    .description("Last update timestamp.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("has_avatar", AttributeType::Bool)
                    .optional()
                    .computed()
                    .default(StaticDefault::bool(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("avatar_uuid", AttributeType::String)
                    .description("The UUID as retrieved by uploading an avatar.")
                    .optional()
                    .build(),
            )
            .build()
    }

    fn data(&self) -> Result<&AssetsProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })
    }
}

/// Desired object as planned by Terraform
#[derive(Debug, Clone, PartialEq)]
struct ObjectModel {
    object_type: String,
    attributes: BTreeMap<String, String>,
    has_avatar: bool,
    avatar_uuid: Option<String>,
}

impl ObjectModel {
    fn from_state(state: &DynamicValue) -> Result<Self, Diagnostic> {
        let object_type = state
            .get_string(&AttributePath::new("type"))
            .map_err(|e| {
                Diagnostic::error("Invalid object type", e.to_string())
                    .with_attribute(AttributePath::new("type"))
            })?;

        let attributes = match state.get(&AttributePath::new("attributes")) {
            Ok(Dynamic::Map(values)) => values
                .iter()
                .map(|(name, value)| match value {
                    Dynamic::String(value) => Ok((name.clone(), value.clone())),
                    Dynamic::Null => Ok((name.clone(), String::new())),
                    other => Err(Diagnostic::error(
                        "Invalid attribute value",
                        format!(
                            "Attribute \"{}\" must be a string, got {}",
                            name,
                            other.type_name()
                        ),
                    )
                    .with_attribute(AttributePath::new("attributes").key(name))),
                })
                .collect::<Result<BTreeMap<_, _>, _>>()?,
            Ok(Dynamic::Null) | Err(_) => BTreeMap::new(),
            Ok(other) => {
                return Err(Diagnostic::error(
                    "Invalid attributes",
                    format!("Expected a map of strings, got {}", other.type_name()),
                )
                .with_attribute(AttributePath::new("attributes")))
            }
        };

        Ok(Self {
            object_type,
            attributes,
            has_avatar: state
                .get_bool(&AttributePath::new("has_avatar"))
                .unwrap_or(false),
            avatar_uuid: state.get_string(&AttributePath::new("avatar_uuid")).ok(),
        })
    }

    /// Encodes every attribute up front; the first failure aborts
    fn to_payload(&self, data: &AssetsProviderData) -> Result<ObjectPayload, Diagnostic> {
        let object_type = data
            .schema
            .resolve_object_type(&self.object_type)
            .ok_or_else(|| {
                mapping_diagnostic(
                    MappingError::UnknownObjectType(self.object_type.clone()),
                    AttributePath::new("type"),
                )
            })?;

        let attributes = self
            .attributes
            .iter()
            .map(|(name, value)| {
                codec::encode(name, value, &self.object_type, &data.schema, &data.statuses)
                    .map_err(|e| {
                        mapping_diagnostic(e, AttributePath::new("attributes").key(name))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ObjectPayload {
            object_type_id: object_type.id.clone(),
            avatar_uuid: self.avatar_uuid.clone(),
            has_avatar: self.has_avatar,
            attributes,
        })
    }
}

fn mapping_diagnostic(error: MappingError, path: AttributePath) -> Diagnostic {
    tracing::error!("{}", error);
    Diagnostic::error("Error during object attributes setting", error.to_string())
        .with_attribute(path)
}

fn api_diagnostic(summary: &str, error: crate::api::ApiError) -> Diagnostic {
    Diagnostic::error(summary, format!("API error: {}", error))
}

fn state_diagnostic(error: tfplug::TfplugError) -> Diagnostic {
    Diagnostic::error("Failed to set state", error.to_string())
}

/// Adds a null for every schema attribute missing from `state`
fn fill_missing_attributes(state: &mut DynamicValue) {
    if !matches!(state.value, Dynamic::Map(_)) {
        state.value = Dynamic::Map(HashMap::new());
    }
    if let Dynamic::Map(values) = &mut state.value {
        for name in ATTRIBUTE_NAMES {
            values.entry(name.to_string()).or_insert(Dynamic::Null);
        }
    }
}

/// Copies the fields Assets computes into `state`
fn set_computed(state: &mut DynamicValue, object: &Object) -> tfplug::Result<()> {
    let strings = [
        ("workspace_id", &object.workspace_id),
        ("global_id", &object.global_id),
        ("id", &object.id),
        ("label", &object.label),
        ("object_key", &object.object_key),
        ("created", &object.created),
        ("updated", &object.updated),
    ];
    for (name, value) in strings {
        state.set_string(&AttributePath::new(name), value.clone())?;
    }
    state.set_bool(&AttributePath::new("has_avatar"), object.has_avatar)
}

/// Replaces attributes, type and computed fields with what Assets reports
fn refresh_state(
    state: &mut DynamicValue,
    object: &Object,
    attributes: HashMap<String, Dynamic>,
) -> tfplug::Result<()> {
    fill_missing_attributes(state);
    state.set_map(&AttributePath::new("attributes"), attributes)?;
    state.set_string(&AttributePath::new("type"), object.object_type.name.clone())?;
    set_computed(state, object)
}

/// Rebuilds the attribute map from the remote attribute list
fn decode_attributes(
    remote: &[ObjectAttribute],
    data: &AssetsProviderData,
) -> Result<HashMap<String, Dynamic>, Diagnostic> {
    let mut attributes = HashMap::new();

    for attribute in remote {
        let name = &attribute.object_type_attribute.name;
        if RESERVED_ATTRIBUTES.contains(&name.as_str())
            || data.ignore_keys.iter().any(|key| key == name)
        {
            continue;
        }

        let value = match codec::decode(attribute, &data.statuses) {
            Ok(value) => value,
            Err(e) if data.decode_mode == DecodeMode::Lenient => {
                tracing::warn!(
                    attribute = %name,
                    error = %e,
                    "keeping empty value for undecodable attribute"
                );
                String::new()
            }
            Err(e) => {
                return Err(Diagnostic::error(
                    "Error during object attributes reading",
                    format!("Attribute \"{}\": {}", name, e),
                )
                .with_attribute(AttributePath::new("attributes").key(name)))
            }
        };
        attributes.insert(name.clone(), Dynamic::String(value));
    }

    Ok(attributes)
}

#[async_trait]
impl Resource for ObjectResource {
    fn type_name(&self) -> &str {
        RESOURCE_TYPE
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        // Unknown during validation is fine; only a known empty name is wrong
        if let Ok(object_type) = request.config.get_string(&AttributePath::new("type")) {
            if object_type.trim().is_empty() {
                diagnostics.push(
                    Diagnostic::error("Invalid object type", "Object type must not be empty")
                        .with_attribute(AttributePath::new("type")),
                );
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let fail = |diagnostic: Diagnostic, planned_state: DynamicValue| CreateResourceResponse {
            new_state: planned_state,
            private: vec![],
            diagnostics: vec![diagnostic],
        };

        let data = match self.data() {
            Ok(data) => data,
            Err(diag) => return fail(diag, request.planned_state),
        };
        let payload = match ObjectModel::from_state(&request.planned_state)
            .and_then(|model| model.to_payload(data))
        {
            Ok(payload) => payload,
            Err(diag) => return fail(diag, request.planned_state),
        };

        tracing::info!(
            object_type_id = %payload.object_type_id,
            attributes = payload.attributes.len(),
            "Creating object"
        );

        let object = match data.client.objects().create(&payload).await {
            Ok(object) => object,
            Err(e) => {
                return fail(
                    api_diagnostic("Error during object creation", e),
                    request.planned_state,
                )
            }
        };

        let mut new_state = request.planned_state.clone();
        if let Err(e) = set_computed(&mut new_state, &object) {
            return fail(state_diagnostic(e), request.planned_state);
        }

        CreateResourceResponse {
            new_state,
            private: vec![],
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let fail = |diagnostic: Diagnostic, request: ReadResourceRequest| ReadResourceResponse {
            new_state: Some(request.current_state),
            diagnostics: vec![diagnostic],
            private: request.private,
        };

        let data = match self.data() {
            Ok(data) => data,
            Err(diag) => return fail(diag, request),
        };
        let id = match request.current_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                return fail(
                    Diagnostic::error("Missing object id", e.to_string())
                        .with_attribute(AttributePath::new("id")),
                    request,
                )
            }
        };

        let objects = data.client.objects();
        let object = match objects.get(&id).await {
            Ok(object) => object,
            Err(e) => return fail(api_diagnostic("Error during object reading", e), request),
        };
        let remote_attributes = match objects.attributes(&id).await {
            Ok(attributes) => attributes,
            Err(e) => {
                return fail(
                    api_diagnostic("Error during object attributes reading", e),
                    request,
                )
            }
        };
        let attributes = match decode_attributes(&remote_attributes, data) {
            Ok(attributes) => attributes,
            Err(diag) => return fail(diag, request),
        };

        let mut new_state = request.current_state.clone();
        if let Err(e) = refresh_state(&mut new_state, &object, attributes) {
            return fail(state_diagnostic(e), request);
        }

        ReadResourceResponse {
            new_state: Some(new_state),
            diagnostics: vec![],
            private: request.private,
        }
    }

    /// Sends only the attributes present in the plan. Assets merges them
    /// into the object, so attributes dropped from configuration are left
    /// untouched remotely.
    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        let fail = |diagnostic: Diagnostic, prior_state: DynamicValue| UpdateResourceResponse {
            new_state: prior_state,
            private: vec![],
            diagnostics: vec![diagnostic],
        };

        let data = match self.data() {
            Ok(data) => data,
            Err(diag) => return fail(diag, request.prior_state),
        };
        let id = match request
            .planned_state
            .get_string(&AttributePath::new("id"))
            .or_else(|_| request.prior_state.get_string(&AttributePath::new("id")))
        {
            Ok(id) => id,
            Err(e) => {
                return fail(
                    Diagnostic::error("Missing object id", e.to_string())
                        .with_attribute(AttributePath::new("id")),
                    request.prior_state,
                )
            }
        };
        let payload = match ObjectModel::from_state(&request.planned_state)
            .and_then(|model| model.to_payload(data))
        {
            Ok(payload) => payload,
            Err(diag) => return fail(diag, request.prior_state),
        };

        tracing::info!(id = %id, attributes = payload.attributes.len(), "Updating object");

        let object = match data.client.objects().update(&id, &payload).await {
            Ok(object) => object,
            Err(e) => {
                return fail(
                    api_diagnostic("Error during object update", e),
                    request.prior_state,
                )
            }
        };

        let mut new_state = request.planned_state;
        if let Err(e) = set_computed(&mut new_state, &object) {
            return fail(state_diagnostic(e), request.prior_state);
        }

        UpdateResourceResponse {
            new_state,
            private: vec![],
            diagnostics: vec![],
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let data = match self.data() {
            Ok(data) => data,
            Err(diag) => {
                return DeleteResourceResponse {
                    diagnostics: vec![diag],
                }
            }
        };
        let id = match request.prior_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                return DeleteResourceResponse {
                    diagnostics: vec![Diagnostic::error("Missing object id", e.to_string())
                        .with_attribute(AttributePath::new("id"))],
                }
            }
        };

        tracing::info!(id = %id, "Deleting object");

        let diagnostics = match data.client.objects().delete(&id).await {
            Ok(()) => vec![],
            Err(e) => vec![api_diagnostic("Error during object deletion", e)],
        };

        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        for imported in &mut response.imported_resources {
            fill_missing_attributes(&mut imported.state);
        }

        response
    }
}

#[async_trait]
impl ResourceWithConfigure for ObjectResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        // Validation runs before ConfigureProvider, so no data is not an error here
        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<AssetsProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Unexpected Resource Configure Type",
                    "Failed to extract AssetsProviderData from provider data. \
                     Please report this issue to the provider developers.",
                ));
            }
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Client, ObjectAttributeValue, ObjectTypeAttribute};
    use crate::codec::TypeCode;
    use crate::config::ProviderSettings;
    use crate::schema_cache::{AttributeDefinition, ObjectTypeDefinition, SchemaCache};
    use crate::status::{StatusOption, StatusTable};

    fn provider_data(ignore_keys: &[&str], decode_mode: DecodeMode) -> AssetsProviderData {
        let settings = ProviderSettings {
            workspace_id: "ws-1".to_string(),
            user: "svc".to_string(),
            password: "secret".to_string(),
            object_schema_id: "3".to_string(),
            ignore_keys: ignore_keys.iter().map(|k| k.to_string()).collect(),
            api_url: "http://localhost".to_string(),
            decode_mode,
        };
        let schema = SchemaCache::new(
            vec![ObjectTypeDefinition {
                id: "23".to_string(),
                name: "Host".to_string(),
            }],
            vec![
                AttributeDefinition {
                    id: "135".to_string(),
                    name: "Status".to_string(),
                    type_code: TypeCode::Status,
                    object_type_name: "Host".to_string(),
                },
                AttributeDefinition {
                    id: "136".to_string(),
                    name: "Hostname".to_string(),
                    type_code: TypeCode::Default,
                    object_type_name: "Host".to_string(),
                },
            ],
        );
        let statuses = StatusTable::new(vec![
            StatusOption::new("1", "Enabled"),
            StatusOption::new("2", "Disabled"),
        ]);
        let client = Client::new("http://localhost", "ws-1", "svc", "secret").unwrap();
        AssetsProviderData::new(client, &settings, schema, statuses)
    }

    fn remote(name: &str, type_code: i64, value: &str) -> ObjectAttribute {
        ObjectAttribute {
            object_type_attribute: ObjectTypeAttribute {
                name: name.to_string(),
                type_code,
                ..Default::default()
            },
            object_attribute_values: vec![ObjectAttributeValue {
                value: Some(value.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn planned(object_type: &str, attributes: &[(&str, &str)]) -> DynamicValue {
        let mut state = DynamicValue::object();
        fill_missing_attributes(&mut state);
        state
            .set_string(&AttributePath::new("type"), object_type.to_string())
            .unwrap();
        state
            .set_map(
                &AttributePath::new("attributes"),
                attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), Dynamic::String(v.to_string())))
                    .collect(),
            )
            .unwrap();
        state
            .set_bool(&AttributePath::new("has_avatar"), false)
            .unwrap();
        state
    }

    #[test]
    fn payload_translates_status_names() {
        let data = provider_data(&[], DecodeMode::Lenient);
        let state = planned("Host", &[("Status", "Enabled"), ("Hostname", "web-01")]);
        let model = ObjectModel::from_state(&state).unwrap();

        let payload = model.to_payload(&data).unwrap();

        assert_eq!(payload.object_type_id, "23");
        assert_eq!(payload.avatar_uuid, None);
        let values: Vec<(&str, &str)> = payload
            .attributes
            .iter()
            .map(|a| {
                (
                    a.object_type_attribute_id.as_str(),
                    a.object_attribute_values[0].value.as_str(),
                )
            })
            .collect();
        assert_eq!(values, vec![("136", "web-01"), ("135", "1")]);
    }

    #[test]
    fn null_attribute_value_is_sent_empty() {
        let data = provider_data(&[], DecodeMode::Lenient);
        let mut state = planned("Host", &[]);
        state
            .set_value(&AttributePath::new("attributes").key("Hostname"), Dynamic::Null)
            .unwrap();

        let model = ObjectModel::from_state(&state).unwrap();
        assert_eq!(model.attributes.get("Hostname"), Some(&String::new()));

        let payload = model.to_payload(&data).unwrap();
        assert_eq!(payload.attributes[0].object_type_attribute_id, "136");
        assert_eq!(payload.attributes[0].object_attribute_values[0].value, "");
    }

    #[test]
    fn payload_rejects_unknown_object_type() {
        let data = provider_data(&[], DecodeMode::Lenient);
        let model = ObjectModel::from_state(&planned("Router", &[])).unwrap();

        let diag = model.to_payload(&data).unwrap_err();
        assert_eq!(diag.detail, "unknown object type \"Router\"");
        assert_eq!(diag.attribute, Some(AttributePath::new("type")));
    }

    #[test]
    fn payload_error_points_at_attribute() {
        let data = provider_data(&[], DecodeMode::Lenient);
        let model = ObjectModel::from_state(&planned("Host", &[("Rack", "A1")])).unwrap();

        let diag = model.to_payload(&data).unwrap_err();
        assert_eq!(
            diag.attribute,
            Some(AttributePath::new("attributes").key("Rack"))
        );
    }

    #[test]
    fn decode_skips_reserved_and_ignored_attributes() {
        let data = provider_data(&["CI Class"], DecodeMode::Lenient);
        let remote = vec![
            remote("Created", 0, "2024-01-01"),
            remote("Key", 0, "CMDB-1"),
            remote("Updated", 0, "2024-01-02"),
            remote("CI Class", 0, "Server"),
            remote("Hostname", 0, "web-01"),
        ];

        let attributes = decode_attributes(&remote, &data).unwrap();

        assert_eq!(attributes.len(), 1);
        assert_eq!(
            attributes.get("Hostname"),
            Some(&Dynamic::String("web-01".to_string()))
        );
    }

    #[test]
    fn lenient_decode_keeps_empty_value() {
        let data = provider_data(&[], DecodeMode::Lenient);
        let attributes = decode_attributes(&[remote("Photo", 10, "x")], &data).unwrap();
        assert_eq!(
            attributes.get("Photo"),
            Some(&Dynamic::String(String::new()))
        );
    }

    #[test]
    fn strict_decode_fails_read() {
        let data = provider_data(&[], DecodeMode::Strict);
        let diag = decode_attributes(&[remote("Photo", 10, "x")], &data).unwrap_err();
        assert!(diag.detail.contains("unsupported attribute type: 10"));
    }

    #[test]
    fn filled_state_has_every_schema_attribute() {
        let schema = ObjectResource::schema_static();
        let mut state = DynamicValue::object();
        fill_missing_attributes(&mut state);

        for attribute in &schema.block.attributes {
            assert!(
                state.get(&AttributePath::new(&attribute.name)).is_ok(),
                "missing {}",
                attribute.name
            );
        }
        assert_eq!(schema.block.attributes.len(), ATTRIBUTE_NAMES.len());
    }

    #[tokio::test]
    async fn operations_require_provider_data() {
        let resource = ObjectResource::new();
        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: RESOURCE_TYPE.to_string(),
                    prior_state: planned("Host", &[]),
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }

    #[tokio::test]
    async fn configure_without_provider_data_is_allowed() {
        let mut resource = ObjectResource::new();
        let response = resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: None,
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn configure_rejects_foreign_provider_data() {
        let mut resource = ObjectResource::new();
        let response = resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(std::sync::Arc::new("not provider data".to_string())),
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn import_seeds_id_and_nulls() {
        let resource = ObjectResource::new();
        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: RESOURCE_TYPE.to_string(),
                    id: "1001".to_string(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = &response.imported_resources[0].state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "1001");
        assert_eq!(
            state.get(&AttributePath::new("type")).unwrap(),
            &Dynamic::Null
        );
    }
}
