//! Transport seam between the client surface and the wire.
//!
//! [`AuthorityTransport`] is the typed operation surface of one established
//! connection; [`AuthorityConnector`] knows how to establish it. The
//! production implementations wrap the vendored gRPC stub over a TLS channel;
//! tests substitute scripted fakes.

use async_trait::async_trait;
use std::sync::Arc;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::Status;
use tracing::debug;

use crate::config::AuthorityConfig;
use crate::error::IdentityError;
use crate::proto;
use crate::proto::authority_service_client::AuthorityServiceClient;

/// One established connection to the authority, one method per RPC.
///
/// Methods take `&self`; implementations clone the underlying stub per call,
/// which is cheap and keeps the transport shareable across tasks.
#[async_trait]
pub trait AuthorityTransport: Send + Sync {
    async fn get_user_data(&self, query: proto::UserQuery)
        -> Result<proto::UserRecord, Status>;

    async fn filter_user(
        &self,
        query: proto::UserQuery,
    ) -> Result<proto::FilterUserResponse, Status>;

    async fn filter_user_serialized(
        &self,
        query: proto::UserQuery,
    ) -> Result<proto::FilterUserSerializedResponse, Status>;

    async fn verify_login(
        &self,
        request: proto::VerifyLoginRequest,
    ) -> Result<proto::VerifyLoginResponse, Status>;

    async fn create_user(
        &self,
        request: proto::CreateUserRequest,
    ) -> Result<proto::UserRecord, Status>;

    async fn update_user(
        &self,
        request: proto::UpdateUserRequest,
    ) -> Result<proto::UserRecord, Status>;

    async fn get_roles(&self, request: proto::VocabularyRequest)
        -> Result<proto::RoleList, Status>;

    async fn get_departments(
        &self,
        request: proto::VocabularyRequest,
    ) -> Result<proto::DepartmentList, Status>;
}

/// Factory for [`AuthorityTransport`] instances.
///
/// The connection manager calls this lazily on first use and again when
/// replacing a connection after a transient failure.
#[async_trait]
pub trait AuthorityConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn AuthorityTransport>, IdentityError>;
}

/// Production connector: secured channel to `https://<host>:50051`,
/// server-authenticated against the configured trust anchor.
pub struct TlsAuthorityConnector {
    endpoint_uri: String,
    host: String,
    ca_cert_path: std::path::PathBuf,
}

impl TlsAuthorityConnector {
    #[must_use]
    pub fn new(config: &AuthorityConfig) -> Self {
        Self {
            endpoint_uri: config.endpoint_uri(),
            host: config.host.clone(),
            ca_cert_path: config.ca_cert_path.clone(),
        }
    }
}

#[async_trait]
impl AuthorityConnector for TlsAuthorityConnector {
    async fn connect(&self) -> Result<Arc<dyn AuthorityTransport>, IdentityError> {
        let pem = tokio::fs::read(&self.ca_cert_path).await.map_err(|e| {
            IdentityError::connection(format!(
                "cannot read trust anchor {}: {e}",
                self.ca_cert_path.display()
            ))
        })?;

        let tls = ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(pem))
            .domain_name(self.host.clone());

        let endpoint = Endpoint::from_shared(self.endpoint_uri.clone())
            .map_err(|e| {
                IdentityError::connection(format!("invalid endpoint {}: {e}", self.endpoint_uri))
            })?
            .tls_config(tls)
            .map_err(|e| IdentityError::connection(format!("TLS configuration failed: {e}")))?;

        let channel = endpoint.connect().await.map_err(|e| {
            IdentityError::connection(format!("connect to {} failed: {e}", self.endpoint_uri))
        })?;

        debug!(endpoint = %self.endpoint_uri, "established authority channel");
        Ok(Arc::new(GrpcTransport { channel }))
    }
}

/// Transport backed by the vendored gRPC stub.
struct GrpcTransport {
    channel: Channel,
}

impl GrpcTransport {
    fn stub(&self) -> AuthorityServiceClient<Channel> {
        AuthorityServiceClient::new(self.channel.clone())
    }
}

#[async_trait]
impl AuthorityTransport for GrpcTransport {
    async fn get_user_data(
        &self,
        query: proto::UserQuery,
    ) -> Result<proto::UserRecord, Status> {
        Ok(self.stub().get_user_data(query).await?.into_inner())
    }

    async fn filter_user(
        &self,
        query: proto::UserQuery,
    ) -> Result<proto::FilterUserResponse, Status> {
        Ok(self.stub().filter_user(query).await?.into_inner())
    }

    async fn filter_user_serialized(
        &self,
        query: proto::UserQuery,
    ) -> Result<proto::FilterUserSerializedResponse, Status> {
        Ok(self.stub().filter_user_serialized(query).await?.into_inner())
    }

    async fn verify_login(
        &self,
        request: proto::VerifyLoginRequest,
    ) -> Result<proto::VerifyLoginResponse, Status> {
        Ok(self.stub().verify_login(request).await?.into_inner())
    }

    async fn create_user(
        &self,
        request: proto::CreateUserRequest,
    ) -> Result<proto::UserRecord, Status> {
        Ok(self.stub().create_user(request).await?.into_inner())
    }

    async fn update_user(
        &self,
        request: proto::UpdateUserRequest,
    ) -> Result<proto::UserRecord, Status> {
        Ok(self.stub().update_user(request).await?.into_inner())
    }

    async fn get_roles(
        &self,
        request: proto::VocabularyRequest,
    ) -> Result<proto::RoleList, Status> {
        Ok(self.stub().get_roles(request).await?.into_inner())
    }

    async fn get_departments(
        &self,
        request: proto::VocabularyRequest,
    ) -> Result<proto::DepartmentList, Status> {
        Ok(self.stub().get_departments(request).await?.into_inner())
    }
}
