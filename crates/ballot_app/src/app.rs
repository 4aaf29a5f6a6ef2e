use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use ballot_bridge::{BridgeDispatcher, MainQueue, ScriptResponseSink, DEFAULT_CALLBACK_FUNCTION};
use ballot_domain::{store::FileStorage, BallotService};
use chrono_tz::Tz;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::devices::{PermissionPolicy, SimulatedDevices};
use crate::navigation::{self, NavigationDecision};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) timezone: Tz,
    pub(crate) callback_function: String,
    pub(crate) permission_policy: PermissionPolicy,
    pub(crate) bundle_entry: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`; invalid values warn and keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup("BALLOT_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        if let Some(zone) = lookup("BALLOT_TIMEZONE") {
            match zone.trim().parse::<Tz>() {
                Ok(zone) => config.timezone = zone,
                Err(err) => warn!(zone = %zone, %err, "unknown time zone, keeping UTC"),
            }
        }
        if let Some(function) = lookup("BALLOT_CALLBACK_FUNCTION") {
            let function = function.trim();
            if !function.is_empty() {
                config.callback_function = function.to_string();
            }
        }
        if let Some(policy) = lookup("BALLOT_PERMISSION_POLICY") {
            match policy.parse::<PermissionPolicy>() {
                Ok(policy) => config.permission_policy = policy,
                Err(err) => warn!("{err}, keeping grant"),
            }
        }
        if let Some(entry) = lookup("BALLOT_BUNDLE_ENTRY") {
            if !entry.trim().is_empty() {
                config.bundle_entry = PathBuf::from(entry);
            }
        }
        Ok(config)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn callback_function(&self) -> &str {
        &self.callback_function
    }

    pub fn permission_policy(&self) -> PermissionPolicy {
        self.permission_policy
    }

    /// `file://` URL of the bundled web UI entry.
    pub fn bundle_url(&self) -> Result<Url> {
        let path = if self.bundle_entry.is_absolute() {
            self.bundle_entry.clone()
        } else {
            std::env::current_dir()
                .context("resolving working directory")?
                .join(&self.bundle_entry)
        };
        Url::from_file_path(&path)
            .map_err(|()| anyhow::anyhow!("bundle entry {} is not a file path", path.display()))
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./ballot-data"),
            timezone: Tz::UTC,
            callback_function: DEFAULT_CALLBACK_FUNCTION.to_string(),
            permission_policy: PermissionPolicy::Grant,
            bundle_entry: PathBuf::from("index.html"),
        }
    }
}

pub fn build_service(config: &AppConfig) -> Result<BallotService> {
    let storage = FileStorage::open(&config.data_dir)
        .with_context(|| format!("opening reminder storage in {}", config.data_dir.display()))?;
    let devices = SimulatedDevices::new(config.permission_policy);
    let service = BallotService::builder()
        .with_notification_center(devices.notifications)
        .with_calendar_store(devices.calendar)
        .with_haptics(devices.haptics)
        .with_share_sheet(devices.share)
        .with_storage(Arc::new(storage))
        .with_timezone(config.timezone)
        .build()
        .context("assembling ballot service")?;
    Ok(service)
}

/// Headless stand-in for the webview host. Each input line is one bridge
/// message, or a `{"navigate": url, "newWindow": bool}` webview event.
pub struct Shell {
    dispatcher: BridgeDispatcher,
    queue: Arc<MainQueue>,
    outbox: Arc<Mutex<VecDeque<String>>>,
}

impl Shell {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let service = build_service(config)?;
        Ok(Self::with_service(service, &config.callback_function))
    }

    pub fn with_service(service: BallotService, callback_function: &str) -> Self {
        let queue = Arc::new(MainQueue::new());
        let outbox = Arc::new(Mutex::new(VecDeque::new()));
        let scripts = Arc::clone(&outbox);
        let sink = ScriptResponseSink::with_function(callback_function, move |script: String| {
            scripts.lock().push_back(script)
        });
        let dispatcher = BridgeDispatcher::new(Arc::new(service), Arc::new(sink), queue.clone());
        Self {
            dispatcher,
            queue,
            outbox,
        }
    }

    /// Handles one input line and returns the callback scripts it produced.
    pub fn handle_line(&self, line: &str) -> Vec<String> {
        match serde_json::from_str::<Value>(line) {
            Ok(value) if value.get("navigate").is_some() => self.navigate(&value),
            Ok(value) => self.dispatcher.handle_value(value),
            Err(_) => self.dispatcher.handle_message(line),
        }
        let ran = self.queue.run_pending();
        debug!(ran, "main queue drained");
        self.outbox.lock().drain(..).collect()
    }

    fn navigate(&self, event: &Value) {
        let Some(destination) = event.get("navigate").and_then(Value::as_str) else {
            warn!("navigation event without a string target");
            return;
        };
        let new_window = event
            .get("newWindow")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if new_window {
            match navigation::decide_popup(destination) {
                Some(url) => info!(%url, "opening pop-up externally"),
                None => debug!(destination, "pop-up ignored"),
            }
            return;
        }
        match navigation::decide(destination) {
            NavigationDecision::OpenExternally(url) => info!(%url, "opening externally"),
            NavigationDecision::StayInWebView => debug!(destination, "navigation stays in webview"),
        }
    }

    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading bridge message")?;
            if line.trim().is_empty() {
                continue;
            }
            for script in self.handle_line(&line) {
                writeln!(output, "{script}").context("writing callback script")?;
            }
            output.flush().context("flushing callback scripts")?;
        }
        info!("input closed, shutting down");
        Ok(())
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    match config.bundle_url() {
        Ok(url) => info!(%url, "web content entry"),
        Err(err) => warn!("{err:#}"),
    }
    info!(
        data_dir = %config.data_dir.display(),
        timezone = %config.timezone,
        policy = ?config.permission_policy,
        "starting ballot shell"
    );
    let shell = Shell::new(&config)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    shell.run(stdin.lock(), stdout.lock())
}
