//! Protocol buffer types for Terraform Plugin Protocol v6
//!
//! Generated at build time by tonic_build from `proto/tfplugin6.proto`.
//!
//! Several generated messages share names with framework types
//! (`DynamicValue`, `Diagnostic`, `Schema`, `AttributePath`). Always refer to
//! the generated ones through the `proto::` prefix.
//!
//! - RPC request/response pairs live in snake_case modules
//!   (`read_resource::Request`, `plan_resource_change::Response`)
//! - Nested messages live in sub-modules (`diagnostic::Severity`,
//!   `schema::Attribute`)

include!(concat!(env!("OUT_DIR"), "/tfplugin6.rs"));

pub use provider_server::{Provider as ProviderService, ProviderServer};
