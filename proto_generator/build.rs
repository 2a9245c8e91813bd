use std::path::PathBuf;
#[allow(clippy::unwrap_used)]
fn main() {
    let out_dir = PathBuf::from("../logmetrics/src/proto");
    let proto_dir = "../proto";

    eprintln!("Hi brave developer! If you are changing protos and logmetrics fails to build, please retry 1 time.");
    eprintln!("Cargo currently does not have a nice way for me to express a dependency order between these 2");
    eprintln!("workspace projects - because this project is _specifically_ supposed to not be a Cargo dependency.");
    eprintln!("I did this so users don't need to have protoc when compiling logmetrics!");

    // remote write is a plain http POST, not grpc: messages only.
    tonic_build::configure()
        .build_server(false)
        .build_client(false)
        .type_attribute("Label", "#[derive(Eq, Hash)]")
        .out_dir(out_dir)
        .compile_protos(
            &[
                format!("{proto_dir}/prometheus/types.proto"),
                format!("{proto_dir}/prometheus/remote.proto"),
            ],
            &[proto_dir],
        )
        .unwrap();

    println!("cargo:rerun-if-changed=../proto");
}
