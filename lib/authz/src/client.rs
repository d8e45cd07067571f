//! gRPC client for the policy service.

use crate::error::PolicyError;
use crate::types::{CheckReply, CheckRequest};
use async_trait::async_trait;
use portcullis_core::Result;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};
use tracing::{debug, instrument};

/// Fully qualified method path of the unary `Check` call.
const CHECK_PATH: &str = "/security.SecurityService/Check";

/// Anything that can answer a permission check.
///
/// The production implementation is [`PolicyClient`]. The trait is the seam
/// where tests plug in a fake.
#[async_trait]
pub trait PolicyService: Send + Sync {
    /// Evaluates `request` against the policy.
    ///
    /// A rejected or missing token must surface as
    /// [`PolicyError::Unauthenticated`]; every other failure is a transport
    /// error and is not retried here.
    async fn check(&self, request: CheckRequest) -> Result<CheckReply, PolicyError>;
}

/// Policy service client over a shared gRPC channel.
///
/// The channel multiplexes requests, so cloning the client is cheap and every
/// request gets its own handle without locking.
#[derive(Clone)]
pub struct PolicyClient {
    inner: Grpc<Channel>,
}

impl PolicyClient {
    /// Connects to the policy service.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The gRPC endpoint (e.g., "http://policy.internal:50051")
    pub async fn connect(endpoint: String) -> Result<Self, PolicyError> {
        let endpoint = Endpoint::from_shared(endpoint).map_err(|e| {
            PolicyError::ConnectionFailed {
                details: e.to_string(),
            }
        })?;

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| PolicyError::ConnectionFailed {
                details: e.to_string(),
            })?;

        Ok(Self {
            inner: Grpc::new(channel),
        })
    }
}

#[async_trait]
impl PolicyService for PolicyClient {
    #[instrument(skip(self, request), fields(permissions = ?request.permissions))]
    async fn check(&self, request: CheckRequest) -> Result<CheckReply, PolicyError> {
        let mut grpc = self.inner.clone();
        grpc.ready().await.map_err(|e| PolicyError::RequestFailed {
            details: e.to_string(),
        })?;

        let codec: ProstCodec<CheckRequest, CheckReply> = ProstCodec::default();
        let response = grpc
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static(CHECK_PATH),
                codec,
            )
            .await
            .map_err(classify_status)?;

        let reply = response.into_inner();
        debug!(
            can_access = reply.can_access,
            granted = reply.permissions.len(),
            "policy check result"
        );

        Ok(reply)
    }
}

/// Maps a gRPC status onto the policy error taxonomy.
///
/// The service answers `INVALID_ARGUMENT` for tokens it cannot parse, which
/// is the same situation as `UNAUTHENTICATED` from the caller's side.
fn classify_status(status: Status) -> PolicyError {
    match status.code() {
        Code::InvalidArgument | Code::Unauthenticated => PolicyError::Unauthenticated {
            details: status.message().to_string(),
        },
        _ => PolicyError::RequestFailed {
            details: status.to_string(),
        },
    }
}
