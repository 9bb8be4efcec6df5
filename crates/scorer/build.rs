fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the proto file for the scoring service
    match tonic_build::compile_protos("../../proto/recommendations.proto") {
        Ok(()) => Ok(()),
        // protoc isn't installed; fall back to the vendored generated code so
        // `tonic::include_proto!("recommendations")` still resolves.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);
            std::fs::copy(
                "vendored/recommendations.rs",
                out_dir.join("recommendations.rs"),
            )?;
            println!("cargo:rerun-if-changed=vendored/recommendations.rs");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
