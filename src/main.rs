/// Campus Careers server binary
use campus_careers::{config::ServerConfig, context::AppContext, error::PortalResult, jobs, server};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> PortalResult<()> {
    // Load configuration first so the log format can follow it
    let config = ServerConfig::from_env()?;

    init_tracing(&config.logging.level, config.logging.json);

    print_banner();

    let ctx = Arc::new(AppContext::new(config).await?);

    // Start background jobs
    let scheduler = Arc::new(jobs::JobScheduler::new(Arc::clone(&ctx)));
    scheduler.start();

    server::serve((*ctx).clone()).await?;

    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("campus_careers={},tower_http=debug", level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn print_banner() {
    println!(
        r#"
   ____                                 ____
  / ___|__ _ _ __ ___  _ __  _   _ ___ / ___|__ _ _ __ ___  ___ _ __ ___
 | |   / _` | '_ ` _ \| '_ \| | | / __| |   / _` | '__/ _ \/ _ \ '__/ __|
 | |__| (_| | | | | | | |_) | |_| \__ \ |__| (_| | | |  __/  __/ |  \__ \
  \____\__,_|_| |_| |_| .__/ \__,_|___/\____\__,_|_|  \___|\___|_|  |___/
                      |_|
        Student career management v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
