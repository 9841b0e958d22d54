//! Provider block settings and their environment fallbacks

use crate::codec::DecodeMode;
use std::fmt;
use thiserror::Error;
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

pub const DEFAULT_API_URL: &str = "https://api.atlassian.com";

pub const ENV_WORKSPACE_ID: &str = "JIRAASSETS_WORKSPACE_ID";
pub const ENV_USER: &str = "JIRAASSETS_USER";
pub const ENV_PASSWORD: &str = "JIRAASSETS_PASSWORD";
pub const ENV_OBJECTSCHEMA_ID: &str = "JIRAASSETS_OBJECTSCHEMA_ID";
pub const ENV_API_URL: &str = "JIRAASSETS_API_URL";

/// Resolved provider configuration, immutable after ConfigureProvider
#[derive(Clone, PartialEq)]
pub struct ProviderSettings {
    pub workspace_id: String,
    pub user: String,
    pub password: String,
    pub object_schema_id: String,
    pub ignore_keys: Vec<String>,
    pub api_url: String,
    pub decode_mode: DecodeMode,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("workspace_id", &self.workspace_id)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("object_schema_id", &self.object_schema_id)
            .field("ignore_keys", &self.ignore_keys)
            .field("api_url", &self.api_url)
            .field("decode_mode", &self.decode_mode)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{summary}")]
    Unknown {
        attribute: &'static str,
        summary: &'static str,
        env_var: Option<&'static str>,
    },

    #[error("{summary}")]
    Missing {
        attribute: &'static str,
        summary: &'static str,
        env_var: &'static str,
    },

    #[error("Invalid value for {attribute}: expected {expected}")]
    InvalidType {
        attribute: &'static str,
        expected: &'static str,
    },
}

impl SettingsError {
    pub fn attribute(&self) -> &'static str {
        match self {
            SettingsError::Unknown { attribute, .. }
            | SettingsError::Missing { attribute, .. }
            | SettingsError::InvalidType { attribute, .. } => attribute,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            SettingsError::Unknown {
                attribute,
                env_var: Some(env_var),
                ..
            } => format!(
                "The provider cannot create the Assets API client as there is an unknown configuration value for {attribute}. \
                 Either target apply the source of the value first, set the value statically in the configuration, or use the {env_var} environment variable."
            ),
            SettingsError::Unknown { attribute, .. } => format!(
                "The provider cannot create the Assets API client as there is an unknown configuration value for {attribute}. \
                 Either target apply the source of the value first or set the value statically in the configuration."
            ),
            SettingsError::Missing {
                attribute, env_var, ..
            } => format!(
                "The provider cannot create the Assets API client as there is a missing or empty value for {attribute}. \
                 Set the {attribute} value in the configuration or use the {env_var} environment variable. \
                 If either is already set, ensure the value is not empty."
            ),
            SettingsError::InvalidType { .. } => self.to_string(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string(), self.detail())
            .with_attribute(AttributePath::new(self.attribute()))
    }
}

struct StringSetting {
    attribute: &'static str,
    env_var: Option<&'static str>,
    unknown_summary: &'static str,
}

const WORKSPACE_ID: StringSetting = StringSetting {
    attribute: "workspace_id",
    env_var: Some(ENV_WORKSPACE_ID),
    unknown_summary: "Unknown Assets Workspace Id",
};
const USER: StringSetting = StringSetting {
    attribute: "user",
    env_var: Some(ENV_USER),
    unknown_summary: "Unknown Assets User",
};
const PASSWORD: StringSetting = StringSetting {
    attribute: "password",
    env_var: Some(ENV_PASSWORD),
    unknown_summary: "Unknown Assets Password",
};
const OBJECT_SCHEMA_ID: StringSetting = StringSetting {
    attribute: "object_schema_id",
    env_var: Some(ENV_OBJECTSCHEMA_ID),
    unknown_summary: "Unknown Asset objectschemaId",
};
const API_URL: StringSetting = StringSetting {
    attribute: "api_url",
    env_var: Some(ENV_API_URL),
    unknown_summary: "Unknown Assets API URL",
};

impl ProviderSettings {
    /// Resolve against the process environment
    pub fn from_config(config: &DynamicValue) -> Result<Self, Vec<SettingsError>> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Configuration values win over `env`. Unknown values are reported
    /// first; missing credentials are only checked once every value is known.
    pub fn resolve<E>(config: &DynamicValue, env: E) -> Result<Self, Vec<SettingsError>>
    where
        E: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        for setting in [&WORKSPACE_ID, &USER, &PASSWORD, &OBJECT_SCHEMA_ID, &API_URL] {
            if setting_value(config, setting.attribute).is_unknown() {
                errors.push(SettingsError::Unknown {
                    attribute: setting.attribute,
                    summary: setting.unknown_summary,
                    env_var: setting.env_var,
                });
            }
        }
        for (attribute, summary) in [
            ("ignore_keys", "Unknown Assets Ignore Keys"),
            ("strict_attribute_decoding", "Unknown Assets Attribute Decoding Mode"),
        ] {
            if setting_value(config, attribute).is_unknown() {
                errors.push(SettingsError::Unknown {
                    attribute,
                    summary,
                    env_var: None,
                });
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let string = |setting: &StringSetting| -> Result<String, SettingsError> {
            match setting_value(config, setting.attribute) {
                Dynamic::String(value) => Ok(value),
                Dynamic::Null => Ok(setting.env_var.and_then(&env).unwrap_or_default()),
                _ => Err(SettingsError::InvalidType {
                    attribute: setting.attribute,
                    expected: "string",
                }),
            }
        };

        let workspace_id = string(&WORKSPACE_ID);
        let user = string(&USER);
        let password = string(&PASSWORD);
        let object_schema_id = string(&OBJECT_SCHEMA_ID);
        let api_url = string(&API_URL);
        let ignore_keys = ignore_keys(config);
        let decode_mode = decode_mode(config);

        let mut check_present = |value: &Result<String, SettingsError>,
                                 attribute: &'static str,
                                 summary: &'static str,
                                 env_var: &'static str| {
            match value {
                Ok(value) if value.is_empty() => errors.push(SettingsError::Missing {
                    attribute,
                    summary,
                    env_var,
                }),
                Ok(_) => {}
                Err(e) => errors.push(e.clone()),
            }
        };
        check_present(
            &workspace_id,
            "workspace_id",
            "Missing Assets API Workspace Id",
            ENV_WORKSPACE_ID,
        );
        check_present(&user, "user", "Missing Assets API User", ENV_USER);
        check_present(
            &password,
            "password",
            "Missing Assets API Password",
            ENV_PASSWORD,
        );

        for result in [&object_schema_id, &api_url] {
            if let Err(e) = result {
                errors.push(e.clone());
            }
        }
        if let Err(e) = &ignore_keys {
            errors.push(e.clone());
        }
        if let Err(e) = &decode_mode {
            errors.push(e.clone());
        }

        match (
            workspace_id,
            user,
            password,
            object_schema_id,
            api_url,
            ignore_keys,
            decode_mode,
        ) {
            (
                Ok(workspace_id),
                Ok(user),
                Ok(password),
                Ok(object_schema_id),
                Ok(api_url),
                Ok(ignore_keys),
                Ok(decode_mode),
            ) if errors.is_empty() => Ok(Self {
                workspace_id,
                user,
                password,
                object_schema_id,
                ignore_keys,
                api_url: if api_url.is_empty() {
                    DEFAULT_API_URL.to_string()
                } else {
                    api_url
                },
                decode_mode,
            }),
            _ => Err(errors),
        }
    }
}

fn setting_value(config: &DynamicValue, attribute: &str) -> Dynamic {
    if config.is_unknown() {
        return Dynamic::Unknown;
    }
    config
        .get(&AttributePath::new(attribute))
        .cloned()
        .unwrap_or(Dynamic::Null)
}

fn ignore_keys(config: &DynamicValue) -> Result<Vec<String>, SettingsError> {
    let invalid = || SettingsError::InvalidType {
        attribute: "ignore_keys",
        expected: "list of string",
    };

    match setting_value(config, "ignore_keys") {
        Dynamic::Null => Ok(Vec::new()),
        Dynamic::List(items) => items
            .into_iter()
            .map(|item| match item {
                Dynamic::String(key) => Ok(key),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

fn decode_mode(config: &DynamicValue) -> Result<DecodeMode, SettingsError> {
    match setting_value(config, "strict_attribute_decoding") {
        Dynamic::Null | Dynamic::Bool(false) => Ok(DecodeMode::Lenient),
        Dynamic::Bool(true) => Ok(DecodeMode::Strict),
        _ => Err(SettingsError::InvalidType {
            attribute: "strict_attribute_decoding",
            expected: "bool",
        }),
    }
}
