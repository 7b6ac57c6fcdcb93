use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = cluely_lite::Cli::parse();
    if let Err(e) = cluely_lite::run(cli).await {
        tracing::error!(error = %e, "server failed");
        eprintln!("cluely-lite: {e}");
        std::process::exit(1);
    }
}
