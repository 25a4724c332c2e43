use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match stayforecast_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("stayforecast: {e}");
            ExitCode::FAILURE
        }
    }
}
