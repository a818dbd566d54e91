use {
    flagconf::Outcome,
    serde::{Deserialize, Serialize},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

const ENV_PREFIX: &str = "FLAGCONF_DEMO";

/// Configuration of the demo service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    id: u64,
    name: String,
    online: bool,
    listen: ListenConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ListenConfig {
    bind: String,
    port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

/// Logs go to stderr so stdout only carries help and version text.
fn init_telemetry() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Argument errors already render their own usage, so they are printed as is
/// instead of going through anyhow.
fn argument_error(err: &flagconf::Error) -> Option<String> {
    match err {
        flagconf::Error::Args { .. } => Some(err.to_string()),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_telemetry();

    let release = flagconf::release_info!();
    let mut config = DemoConfig::default();
    match flagconf::parse(
        ENV_PREFIX,
        "Demo service configured through flagconf.",
        Some(&release),
        &mut config,
    ) {
        Ok(Outcome::Continue) => {},
        Ok(outcome) => {
            print!("{}", outcome.text());
            return Ok(());
        },
        Err(err) => {
            if let Some(message) = argument_error(&err) {
                eprint!("{message}");
                std::process::exit(2);
            }
            return Err(err.into());
        },
    }

    info!(
        version = %release.release_version,
        id = config.id,
        bind = %config.listen.bind,
        port = config.listen.port,
        "flagconf-demo starting"
    );
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
