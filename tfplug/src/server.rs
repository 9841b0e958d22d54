//! Server module for running Terraform providers
//!
//! Starts the provider's gRPC server with TLS and prints the go-plugin
//! handshake line Terraform waits for on stdout. Anything else written to
//! stdout breaks the handshake, so logging must go to stderr.

use crate::error::{Result, TfplugError};
use crate::grpc::GrpcProviderServer;
use crate::proto::ProviderServer;
use crate::provider::Provider;
use std::env;
use std::path::PathBuf;
use tonic::transport::{Certificate, Identity, Server, ServerTlsConfig};

/// go-plugin handshake values Terraform sets for provider plugins
pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";
const CLIENT_CERT_ENV: &str = "PLUGIN_CLIENT_CERT";
const CORE_PROTOCOL_VERSION: u32 = 1;
const APP_PROTOCOL_VERSION: u32 = 6;

/// Server configuration for running a Terraform provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to TLS certificate file (PEM)
    pub cert_path: PathBuf,
    /// Path to TLS key file (PEM)
    pub key_path: PathBuf,
    /// Maximum message size in bytes
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cert_path: PathBuf::from("./certs/localhost.pem"),
            key_path: PathBuf::from("./certs/localhost-key.pem"),
            max_message_size: 256 << 20, // 256MB
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by TFPLUG_CERT_PATH / TFPLUG_KEY_PATH
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = env::var_os("TFPLUG_CERT_PATH") {
            config.cert_path = PathBuf::from(path);
        }
        if let Some(path) = env::var_os("TFPLUG_KEY_PATH") {
            config.key_path = PathBuf::from(path);
        }
        config
    }

    pub fn with_cert_path(mut self, path: PathBuf) -> Self {
        self.cert_path = path;
        self
    }

    pub fn with_key_path(mut self, path: PathBuf) -> Self {
        self.key_path = path;
        self
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }
}

/// Main entry point for running a provider
pub async fn serve<P: Provider + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    verify_magic_cookie()?;

    // Another component may already have installed a provider; either way one is set
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let grpc_server = GrpcProviderServer::new(provider);
    let provider_service = ProviderServer::new(grpc_server)
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let cert = tokio::fs::read(&config.cert_path)
        .await
        .map_err(|e| TfplugError::TlsError(format!("Failed to read certificate: {}", e)))?;
    let key = tokio::fs::read(&config.key_path)
        .await
        .map_err(|e| TfplugError::TlsError(format!("Failed to read key: {}", e)))?;

    let handshake_cert = pem_body(&cert)?;
    let mut tls_config = ServerTlsConfig::new().identity(Identity::from_pem(&cert, key));
    if let Ok(client_cert) = env::var(CLIENT_CERT_ENV) {
        tls_config = tls_config.client_ca_root(Certificate::from_pem(client_cert));
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    println!("{}", handshake_line(&addr.to_string(), &handshake_cert));
    tracing::info!(address = %addr, "provider server listening");

    let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);
    Server::builder()
        .tls_config(tls_config)?
        .add_service(provider_service)
        .serve_with_incoming_shutdown(incoming, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

/// Convenience function to run a provider with default configuration
pub async fn serve_default<P: Provider + 'static>(provider: P) -> Result<()> {
    serve(provider, ServerConfig::from_env()).await
}

/// Refuses to run unless launched by Terraform
pub fn verify_magic_cookie() -> Result<()> {
    if env::var(MAGIC_COOKIE_KEY).as_deref() != Ok(MAGIC_COOKIE_VALUE) {
        return Err(TfplugError::MissingMagicCookie);
    }
    Ok(())
}

fn handshake_line(addr: &str, cert: &str) -> String {
    format!(
        "{}|{}|tcp|{}|grpc|{}",
        CORE_PROTOCOL_VERSION, APP_PROTOCOL_VERSION, addr, cert
    )
}

/// The first certificate's DER as unpadded standard base64, which is what
/// go-plugin expects in the handshake
fn pem_body(pem: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(pem)
        .map_err(|e| TfplugError::TlsError(format!("certificate is not valid PEM: {}", e)))?;

    let body: String = text
        .lines()
        .skip_while(|line| !line.starts_with("-----BEGIN CERTIFICATE-----"))
        .skip(1)
        .take_while(|line| !line.starts_with("-----END CERTIFICATE-----"))
        .map(str::trim)
        .collect();

    if body.is_empty() {
        return Err(TfplugError::TlsError(
            "no certificate found in PEM file".to_string(),
        ));
    }

    Ok(body.trim_end_matches('=').to_string())
}
