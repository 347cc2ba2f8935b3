use tracing::error;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let raw: Vec<String> = std::env::args().collect();
    match loghost::run(&raw).await {
        Ok(()) => {}
        Err(err) if err.is_usage() => {
            eprintln!("{err}");
            eprintln!("Run 'loghost --help' for usage.");
            std::process::exit(1);
        }
        Err(err) => {
            error!(error = %err, "action failed");
            std::process::exit(1);
        }
    }
}
