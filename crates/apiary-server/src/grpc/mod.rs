//! gRPC facade over the store-side functions and procedures

pub mod auth;
pub mod service;

/// Generated messages and service stubs
pub mod proto {
    tonic::include_proto!("bee_management");
}

pub use auth::GrpcAuth;
pub use proto::bee_management_service_server::BeeManagementServiceServer;
pub use service::BeeManagementGrpc;
