//! Build script for compiling Protocol Buffer definitions with tonic.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_files = ["proto/ferry/v1/driver.proto"];

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        // Include file descriptors for reflection
        .file_descriptor_set_path(
            std::path::PathBuf::from(std::env::var("OUT_DIR")?).join("ferry_descriptor.bin"),
        )
        .compile_protos(&proto_files, &["proto"])?;

    for proto in &proto_files {
        println!("cargo:rerun-if-changed={proto}");
    }

    Ok(())
}
