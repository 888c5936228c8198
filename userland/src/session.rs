use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use spinwheel_core::{SpinWheel, StateStore};
use spinwheel_fs::{DirStore, SpinFileStore};
use spinwheel_lib::{Clock, WheelConfig, WheelRng, config_from_cmdline, klog_set_level, klog_warn};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

pub const DEFAULT_DATA_DIR: &str = "spinwheel-data";

/// Config from `SPINWHEEL_OPTS`, then each `--opt`, then the dedicated flags.
pub fn build_config(cli: &Cli) -> WheelConfig {
    let mut config = config_from_cmdline(cli.opts_line.as_deref());
    for opt in &cli.opts {
        config.apply_cmdline(opt);
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    config
}

/// Clock for driving frames from a command line.
///
/// Simulated time jumps one frame per [`FrameClock::step`], so a spin of any
/// length finishes immediately. Live time sleeps through each frame.
pub struct FrameClock {
    live: Option<Instant>,
    simulated_ms: AtomicU64,
}

impl FrameClock {
    pub fn simulated() -> Self {
        Self {
            live: None,
            simulated_ms: AtomicU64::new(0),
        }
    }

    pub fn live() -> Self {
        Self {
            live: Some(Instant::now()),
            simulated_ms: AtomicU64::new(0),
        }
    }

    pub fn step(&self, frame_ms: u64) {
        match self.live {
            Some(_) => std::thread::sleep(Duration::from_millis(frame_ms)),
            None => {
                self.simulated_ms.fetch_add(frame_ms, Ordering::Relaxed);
            }
        }
    }
}

impl Clock for FrameClock {
    fn uptime_ms(&self) -> u64 {
        match self.live {
            Some(origin) => origin.elapsed().as_millis() as u64,
            None => self.simulated_ms.load(Ordering::Relaxed),
        }
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One command's view of the data directory.
pub struct Session {
    pub config: WheelConfig,
    pub store: DirStore,
    clock: Arc<FrameClock>,
}

impl Session {
    pub fn open(config: WheelConfig, live: bool) -> CliResult<Self> {
        klog_set_level(config.log_level);
        let root = config
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let clock = Arc::new(if live { FrameClock::live() } else { FrameClock::simulated() });
        let store = DirStore::open_with(root, clock.clone(), WheelRng::from_entropy())?;
        Ok(Self { config, store, clock })
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn state(&self) -> CliResult<StateStore> {
        Ok(StateStore::new(Box::new(self.store.state_backend()?)))
    }

    /// Wheel over the active sets. Falls back to the placeholder entries
    /// when the sets cannot be read.
    pub fn wheel(&self) -> CliResult<SpinWheel> {
        let clock: Arc<dyn Clock> = self.clock.clone();
        let mut wheel = SpinWheel::new(self.config.clone(), self.state()?, clock)?;
        match self.store.list(true) {
            Ok(sets) => {
                wheel.load_entry_sets(sets)?;
            }
            Err(err) => {
                klog_warn!("session: cannot read entry sets ({}), using placeholders", err);
                wheel.load_placeholder()?;
            }
        }
        Ok(wheel)
    }

    pub fn authorize(&self, password: Option<&str>) -> CliResult<()> {
        let Some(password) = password.filter(|p| !p.is_empty()) else {
            return Err(CliError::Unauthorized);
        };
        if self.store.check_secret(password)? {
            Ok(())
        } else {
            Err(spinwheel_abi::StoreError::WrongSecret.into())
        }
    }
}
