//! CLI for cloudsync
//!
//! Subcommands:
//! - `run`: connect through a WebSocket bridge and keep the device in sync
//! - `token`: print a freshly minted device token
//! - `topics`: print the topics and client id derived from the settings

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use clap::Parser;
use cloudsync::config::{Settings, load_config};
use cloudsync::credential::{CredentialError, JwtSigner};
use cloudsync::identity::Topics;
use cloudsync::persistence::DeviceStore;
use cloudsync::platform::StaticFirmware;
use cloudsync::transport::WsTransport;
use cloudsync::utils::logging;
use cloudsync::{DeviceApp, Engine, EngineHandle};
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "cloudsync", version)]
enum Command {
    /// Connect and run until interrupted
    Run {
        /// Bridge URL, overriding `broker.uri` from the settings
        #[arg(long)]
        url: Option<String>,
    },
    /// Mint a device token and print it
    Token,
    /// Print resolved topics and client id
    Topics,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&settings.log.level);

    let result = match Command::parse() {
        Command::Run { url } => run(settings, url).await,
        Command::Token => print_token(&settings),
        Command::Topics => {
            print_topics(&settings);
            Ok(())
        }
    };
    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

/// How often `run` checks whether the transport has ended the session.
const RECONNECT_CHECK: Duration = Duration::from_secs(15);

/// Reports boot count and command count, echoes app config to the log topic.
struct DemoApp {
    signer: JwtSigner,
    store: DeviceStore,
    boot_count: u64,
    commands: AtomicU64,
}

impl DeviceApp for DemoApp {
    fn credential(&self, project_id: &str) -> Result<String, CredentialError> {
        self.signer.mint(project_id)
    }

    fn on_connected(&self, engine: &EngineHandle) {
        if let Err(e) = engine.log(&format!("online, boot {}", self.boot_count)) {
            warn!("could not publish log line: {e}");
        }
    }

    fn on_disconnected(&self, _engine: &EngineHandle) {
        warn!("link lost, waiting for the transport to reconnect");
    }

    fn on_config(&self, engine: &EngineHandle, config: &Value) {
        info!(%config, "application config received");
        if let Err(e) = self.store.set("app_config", config) {
            warn!("could not persist app config: {e}");
        }
        engine.request_state();
    }

    fn on_command(&self, engine: &EngineHandle, topic: &str, payload: &[u8]) {
        let n = self.commands.fetch_add(1, Ordering::Relaxed) + 1;
        info!(%topic, bytes = payload.len(), "command {n} received");
        engine.request_state();
    }

    fn fill_state(&self, _engine: &EngineHandle, state: &mut Map<String, Value>) {
        state.insert("boot_count".to_string(), json!(self.boot_count));
        state.insert(
            "commands".to_string(),
            json!(self.commands.load(Ordering::Relaxed)),
        );
        if let Ok(Some(config)) = self.store.get::<Value>("app_config") {
            state.insert("app_config".to_string(), config);
        }
    }
}

async fn run(settings: Settings, url: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = settings.engine_config()?;
    if let Some(url) = url {
        config.broker_uri = url;
    }

    let store = DeviceStore::open(&settings.storage.path)?;
    let boot_count = store.get_or_init("boot_count", 0u64) + 1;
    store.set("boot_count", &boot_count)?;

    let app = Arc::new(DemoApp {
        signer: JwtSigner::from_file(&settings.broker.private_key_path)?,
        store,
        boot_count,
        commands: AtomicU64::new(0),
    });
    let firmware = Arc::new(StaticFirmware::new(env!("CARGO_PKG_VERSION")));
    let transport = Arc::new(WsTransport::new());

    let mut engine = Engine::new(config, transport, app, firmware)?;
    engine.start()?;
    info!(boot_count, "device running, press Ctrl-C to stop");

    let mut watchdog = tokio::time::interval(RECONNECT_CHECK);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting gracefully.");
                break;
            }
            _ = watchdog.tick() => {
                if engine.session_active() {
                    continue;
                }
                info!("session ended, reconnecting with a new token");
                if let Err(e) = engine.start() {
                    if e.is_fatal() {
                        engine.destroy().await;
                        return Err(e.into());
                    }
                    warn!("reconnect failed: {e}");
                }
            }
        }
    }
    engine.destroy().await;
    Ok(())
}

fn print_token(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let signer = JwtSigner::from_file(&settings.broker.private_key_path)?;
    println!("{}", signer.mint(&settings.device.project_id)?);
    Ok(())
}

fn print_topics(settings: &Settings) {
    let topics = Topics::resolve(&settings.identity());
    println!("client_id  {}", topics.client_id);
    println!("config     {}", topics.config);
    println!("commands   {}", topics.commands);
    println!("state      {}", topics.state);
    println!("telemetry  {}", topics.telemetry("<suffix>"));
}
