use thiserror::Error;

/// Failures translating between Terraform attribute maps and Assets payloads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("unknown status, available statuses: {available}")]
    UnknownStatus { status: String, available: String },

    #[error("unsupported attribute type: {0}")]
    UnsupportedAttributeType(i64),

    #[error("unknown attribute \"{name}\" for object type \"{object_type}\"")]
    UnknownAttribute { name: String, object_type: String },

    #[error("unknown object type \"{0}\"")]
    UnknownObjectType(String),
}
