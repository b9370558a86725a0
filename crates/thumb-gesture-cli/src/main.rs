//! thumb-gesture CLI: runs the daemon that turns thumb-wheel scrolling into a
//! compositor pan gesture.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use thumb_gesture_daemon::config::Config;
use thumb_gesture_daemon::{setup, Daemon};
use thumb_gesture_input::{InputError, PointerDevice, YdotoolInjector};
use thumb_gesture_protocol::encode_message;
use thumb_gesture_types::{Direction, GestureEvent};
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "thumb-gesture",
    about = "Turn thumb-wheel scrolling into a workspace pan gesture",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the thumb-gesture daemon.
    Start {
        /// Path to configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the socket path from the configuration.
        #[arg(short, long)]
        socket: Option<PathBuf>,

        /// Override the idle time before the gesture is released.
        #[arg(long)]
        release_delay_ms: Option<u64>,
    },

    /// Send one thumb-wheel event to a running daemon.
    Send {
        /// Scroll direction: `left` or `right`.
        direction: Direction,

        /// Scroll magnitude in ticks.
        magnitude: u32,

        /// Socket to send to. Defaults to the configured path.
        #[arg(short, long)]
        socket: Option<PathBuf>,
    },

    /// Print the default configuration as TOML.
    DefaultConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            config,
            socket,
            release_delay_ms,
        } => {
            let source = setup::config_source(config.as_deref());
            let mut config = setup::load_config(config.as_deref())?;
            if let Some(socket) = socket {
                config.daemon.socket_path = socket;
            }
            if let Some(delay) = release_delay_ms {
                config.gesture.release_delay_ms = delay;
            }
            init_tracing(&config.daemon.log_level);
            match source {
                Some(path) => tracing::info!(path = %path.display(), "loaded config"),
                None => tracing::info!("no config file found, using defaults"),
            }
            start(config).await?;
        }
        Commands::Send {
            direction,
            magnitude,
            socket,
        } => {
            init_tracing("warn");
            let socket = match socket {
                Some(socket) => socket,
                None => setup::load_config(None)?.daemon.socket_path,
            };
            send(&socket, &GestureEvent::new(direction, magnitude)).await?;
        }
        Commands::DefaultConfig => {
            print!("{}", toml::to_string_pretty(&Config::default())?);
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn start(config: Config) -> anyhow::Result<()> {
    tracing::info!(socket = %config.daemon.socket_path.display(), "starting thumb-gesture daemon");

    let injector = YdotoolInjector::new(config.injector.program.clone(), config.injector.timeout());
    let pointer = create_pointer(&config).context("failed to create virtual pointer")?;

    let mut daemon = Daemon::new(config, Box::new(injector), pointer);
    let handle = daemon.shutdown_handle();
    tokio::spawn(async move {
        wait_for_signal().await;
        handle.shutdown();
    });

    daemon.run().await?;
    Ok(())
}

#[cfg(feature = "linux")]
fn create_pointer(config: &Config) -> Result<Box<dyn PointerDevice>, InputError> {
    use thumb_gesture_input::linux::UinputPointer;
    use thumb_gesture_types::DeviceInfo;

    let pointer = UinputPointer::create(&DeviceInfo::virtual_pointer(config.device.name.clone()))?;
    Ok(Box::new(pointer))
}

#[cfg(not(feature = "linux"))]
fn create_pointer(_config: &Config) -> Result<Box<dyn PointerDevice>, InputError> {
    Err(InputError::Unavailable)
}

/// Resolves on SIGINT or SIGTERM.
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let terminate = async {
        let mut stream = signal(SignalKind::terminate())?;
        stream.recv().await;
        Ok::<(), std::io::Error>(())
    };

    tokio::select! {
        () = signal_or_pending("SIGINT", tokio::signal::ctrl_c()) => {}
        () = signal_or_pending("SIGTERM", terminate) => {}
    }
}

/// Resolves when `signal` fires. If the handler cannot be installed, the
/// failure is logged and this never resolves.
async fn signal_or_pending<F>(name: &str, signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!(signal = name, "received shutdown signal"),
        Err(e) => {
            tracing::warn!(signal = name, error = %e, "cannot listen for signal");
            std::future::pending::<()>().await;
        }
    }
}

async fn send(socket: &std::path::Path, event: &GestureEvent) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(socket)
        .await
        .with_context(|| format!("failed to connect to {}", socket.display()))?;
    stream.write_all(encode_message(event).as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
