//! Hot reload of the transport configuration file.
//!
//! The parent directory is watched rather than the file itself so that
//! editors which save by writing a sibling and renaming it over the
//! original keep triggering reloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::TransportConfig;
use crate::transport::Transport;

/// Poll interval for platforms without native file events.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Watches one TOML file and publishes each distinct valid version of it.
pub struct ConfigWatcher {
    path: PathBuf,
    updates: mpsc::UnboundedSender<TransportConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its update channel.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<TransportConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            updates,
        };
        (watcher, rx)
    }

    /// Start delivering reloads. Watching stops when the returned handle is dropped.
    ///
    /// A version that fails to load or validate is skipped and the previous
    /// one stays in effect. Rewrites that leave the parsed configuration
    /// unchanged are not sent.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let target = std::fs::canonicalize(&self.path).map_err(notify::Error::io)?;
        let Some(dir) = target.parent().map(Path::to_path_buf) else {
            return Err(notify::Error::path_not_found().add_path(target));
        };

        let updates = self.updates;
        let mut current = load_config(&target).ok();
        let file = target.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "transport config watch error");
                        return;
                    }
                };
                if !touches(&event, &file) {
                    return;
                }

                match load_config(&file) {
                    Ok(config) if current.as_ref() == Some(&config) => {}
                    Ok(config) => {
                        current = Some(config.clone());
                        let _ = updates.send(config);
                    }
                    Err(err) => tracing::warn!(
                        path = %file.display(),
                        error = %err,
                        "transport config rejected, previous version stays active"
                    ),
                }
            },
            Config::default().with_poll_interval(POLL_INTERVAL),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %target.display(), "watching transport config");
        Ok(watcher)
    }
}

fn touches(event: &Event, file: &Path) -> bool {
    (event.kind.is_modify() || event.kind.is_create()) && event.paths.iter().any(|p| p == file)
}

/// Watch `path` and apply each reload to `transport` on the current tokio runtime.
///
/// `adjust` runs on every reloaded config before it is applied. Reloading
/// stops when the returned handle is dropped.
pub fn watch_config<F>(path: &Path, transport: Transport, adjust: F) -> Result<RecommendedWatcher, notify::Error>
where
    F: Fn(&mut TransportConfig) + Send + 'static,
{
    let (watcher, updates) = ConfigWatcher::new(path);
    let handle = watcher.run()?;
    tokio::spawn(watch_updates(transport, updates, adjust));
    Ok(handle)
}

/// Apply every received configuration to `transport` until the channel closes.
pub async fn watch_updates<F>(
    transport: Transport,
    mut updates: mpsc::UnboundedReceiver<TransportConfig>,
    adjust: F,
) where
    F: Fn(&mut TransportConfig),
{
    while let Some(mut config) = updates.recv().await {
        adjust(&mut config);
        transport.apply_config(&config);
        tracing::info!(
            max_retries = config.max_retries,
            no_cache_header = config.no_cache_header,
            enable_logger = config.enable_logger,
            "transport config applied"
        );
    }
}
