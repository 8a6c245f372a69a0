//! Service Registrar Entry Point
//!
//! Consulへの登録を一度だけ実行して終了する。登録失敗は警告ログのみで
//! 終了コードは0のまま。

use clap::Parser;
use svc_registrar_agent::{logging, Registrar, RegistrarOptions};
use tracing::{info, warn};

/// Register this host with a Consul agent using an HTTP health check
#[derive(Parser, Debug)]
#[command(name = "svc-registrar")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    REGISTRAR_LOG_LEVEL     Log level (default: info)
"#)]
struct Cli {
    /// Consul agent address
    #[arg(
        long = "consul.url",
        env = "REGISTRAR_CONSUL_URL",
        default_value = "http://127.0.0.1:8500"
    )]
    consul_url: String,

    /// Consul ACL token
    #[arg(
        long = "consul.token",
        env = "REGISTRAR_CONSUL_TOKEN",
        default_value = "",
        hide_env_values = true
    )]
    consul_token: String,

    /// Health check URL reachable by the Consul agent
    #[arg(
        long = "consul.health-check-url",
        env = "REGISTRAR_HEALTH_CHECK_URL",
        default_value = ""
    )]
    health_check_url: String,

    /// Enable Consul registration
    #[arg(long = "consul.enable", env = "REGISTRAR_CONSUL_ENABLE")]
    enable: bool,

    /// Service name registered with Consul
    #[arg(long = "consul.service-name", env = "REGISTRAR_SERVICE_NAME")]
    service_name: Option<String>,
}

impl Cli {
    fn options(&self) -> RegistrarOptions {
        RegistrarOptions {
            url: self.consul_url.clone(),
            token: self.consul_token.clone(),
            health_check_url: self.health_check_url.clone(),
            enable: self.enable,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init().map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!("Service Registrar v{}", env!("CARGO_PKG_VERSION"));

    let options = cli.options();
    if !options.is_enabled() {
        info!("Consul registration disabled");
        return Ok(());
    }

    let mut builder = Registrar::builder()
        .version(env!("CARGO_PKG_VERSION"))
        .logger(tracing::dispatcher::get_default(Clone::clone));
    if let Some(name) = &cli.service_name {
        builder = builder.service_name(name);
    }

    if let Err(e) = builder.build().register(&options).await {
        warn!(error = %e, "Consul registration failed, continuing without it");
    }
    Ok(())
}
