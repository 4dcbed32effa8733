pub mod attrs;
pub mod grpc;
