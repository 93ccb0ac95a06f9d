use anyhow::Context;
use fileshare_daemon::args::{Args, Parser};
use fileshare_daemon::{init_logging, spawn_service, ServiceConfig};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match ServiceConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    // Guards flush the non-blocking writers when dropped
    let guards = init_logging(&config);

    if let Err(e) = run(&config).await {
        tracing::error!("{:#}", e);
        drop(guards);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: &ServiceConfig) -> anyhow::Result<()> {
    spawn_service(config)
        .await
        .with_context(|| format!("file share server on {} failed", config.listen_addr))
}
