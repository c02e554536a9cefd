fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the bee management gRPC service
    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&["proto/bee_management.proto"], &["proto"])?;
    Ok(())
}
