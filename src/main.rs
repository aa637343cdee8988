//! enso-input: runs the key notifier bridge and logs what it sees
//!
//! Starts the key notifier helper, listens for its notifications and
//! logs every key event until SIGINT or SIGTERM arrives.

use anyhow::{Context, Result};
use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

use enso_input::keys::{char_for_keycode, KeyEventKind, QuasimodeKeycode};
use enso_input::lifecycle::ShutdownSignal;
use enso_input::{Config, InputHandler, InputManager};

/// Logs key events; tracks whether the quasimode is held
#[derive(Debug, Default)]
struct LoggingHandler {
    in_quasimode: bool,
    ticks: u64,
}

impl InputHandler for LoggingHandler {
    fn on_init(&mut self, _manager: &mut InputManager) {
        info!("input bridge initialized, waiting for key events");
    }

    fn on_tick(&mut self, _manager: &mut InputManager, ms_elapsed: u32) {
        self.ticks += 1;
        trace!(ticks = self.ticks, ms_elapsed, "tick");
    }

    fn on_keypress(&mut self, _manager: &mut InputManager, kind: KeyEventKind, keycode: i32) {
        match kind {
            KeyEventKind::Quasimode => {
                self.in_quasimode = keycode == QuasimodeKeycode::Start.code();
                info!(in_quasimode = self.in_quasimode, "quasimode changed");
            }
            KeyEventKind::KeyDown | KeyEventKind::KeyUp => {
                let character = char_for_keycode(keycode);
                debug!(%kind, keycode, ?character, "key event");
            }
        }
    }

    fn on_some_key(&mut self, _manager: &mut InputManager) {
        trace!("key pressed outside quasimode");
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "enso-input starting");

    // Load configuration
    let config = Config::load()?;
    config.check_fallback_dir()?;
    info!(
        program = %config.helper.program,
        fallback_dir = ?config.helper.fallback_dir,
        channel = %config.channel,
        "configuration loaded"
    );

    let mut manager = InputManager::from_config(&config);

    // Forward SIGINT/SIGTERM to the run loop
    let _watcher = ShutdownSignal::new()
        .spawn_watcher(manager.stop_handle())
        .context("failed to start shutdown watcher")?;

    let mut handler = LoggingHandler::default();

    #[cfg(target_os = "macos")]
    let mut host = enso_input::host::MacHost::new();
    #[cfg(not(target_os = "macos"))]
    let mut host = {
        tracing::warn!("no native key notification backend on this platform, using local host");
        enso_input::host::LocalHost::new()
    };

    manager
        .run(&mut host, &mut handler)
        .context("input manager failed")?;

    info!("enso-input stopped");
    Ok(())
}
