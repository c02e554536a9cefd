//! gRPC server setup.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use apiary_persistence::ProcedurePersistence;
use tokio_util::sync::CancellationToken;
use tonic::service::InterceptorLayer;
use tower::ServiceBuilder;
use tracing::info;

use crate::grpc::{BeeManagementGrpc, BeeManagementServiceServer, GrpcAuth};

/// Serve the bee management service until `token` is cancelled
pub async fn serve_grpc(
    store: Arc<dyn ProcedurePersistence>,
    auth: GrpcAuth,
    addr: SocketAddr,
    token: CancellationToken,
) -> anyhow::Result<()> {
    let layer = ServiceBuilder::new()
        .load_shed()
        .layer(InterceptorLayer::new(auth.clone()))
        .into_inner();

    info!(
        "Starting gRPC server on {} (auth: {})",
        addr,
        auth.is_enabled()
    );

    tonic::transport::Server::builder()
        .layer(layer)
        .add_service(BeeManagementServiceServer::new(BeeManagementGrpc::new(store)))
        .serve_with_shutdown(addr, token.cancelled_owned())
        .await
        .context("gRPC server error")
}
