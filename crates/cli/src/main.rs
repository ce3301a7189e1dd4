use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    lanewise_cli::run().await
}
