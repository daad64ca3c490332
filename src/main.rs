use anyhow::Result;
use clap::Parser;
use scriptforge::cli::Args;
use scriptforge::generator::workflow::launch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let request = args.launch_request();
    let config = args.into_config()?;

    launch(&config, request).await?;
    Ok(())
}

/// RUST_LOG 优先，其次按 --verbose 决定日志级别
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "scriptforge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
