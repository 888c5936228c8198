//! Runtime tuning, parsed from `key=value` tokens.
//!
//! The same token string is accepted from the `SPINWHEEL_OPTS` environment
//! variable and from repeated `--opt` flags on the command line. Unknown keys
//! and unparsable values are logged and otherwise ignored.

use std::path::PathBuf;

use spinwheel_abi::{MAX_VISIBLE_SLICES, SpinMode};

use crate::klog::KlogLevel;
use crate::klog_warn;

const DEFAULT_SPIN_DURATION_MS: u64 = 10_000;
const DEFAULT_MIN_TURNS: u32 = 3;
const DEFAULT_MAX_TURNS: u32 = 5;
const DEFAULT_RESAMPLE_INTERVAL_MS: u64 = 50;
const DEFAULT_DRIFT_DEGREES: f64 = 0.3;
const DEFAULT_DRIFT_INTERVAL_MS: u64 = 50;
const DEFAULT_TICK_DEGREES: f64 = 25.0;

/// How multiple active entry sets feed the wheel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RotationPolicy {
    /// Every active set is merged into one pool.
    #[default]
    Merged,
    /// One active set at a time; dismissing a result moves to the next.
    Sequential,
}

impl RotationPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("merged") || value.eq_ignore_ascii_case("merge") {
            Some(RotationPolicy::Merged)
        } else if value.eq_ignore_ascii_case("sequential") || value.eq_ignore_ascii_case("cycle") {
            Some(RotationPolicy::Sequential)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RotationPolicy::Merged => "merged",
            RotationPolicy::Sequential => "sequential",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WheelConfig {
    pub spin_duration_ms: u64,
    pub min_turns: u32,
    pub max_turns: u32,
    pub batch_size: usize,
    pub resample_interval_ms: u64,
    /// Degrees of idle drift per `drift_interval_ms`.
    pub drift_degrees: f64,
    pub drift_interval_ms: u64,
    pub tick_degrees: f64,
    pub rotation: RotationPolicy,
    pub default_mode: SpinMode,
    /// Pointer takes the color of the slice beneath it; gold otherwise.
    pub pointer_follows_slice: bool,
    /// Presentation only; sampling never looks at these two.
    pub display_duplicates: bool,
    pub max_names_visible: usize,
    pub log_level: KlogLevel,
    pub seed: Option<u64>,
    pub data_dir: Option<PathBuf>,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            spin_duration_ms: DEFAULT_SPIN_DURATION_MS,
            min_turns: DEFAULT_MIN_TURNS,
            max_turns: DEFAULT_MAX_TURNS,
            batch_size: MAX_VISIBLE_SLICES,
            resample_interval_ms: DEFAULT_RESAMPLE_INTERVAL_MS,
            drift_degrees: DEFAULT_DRIFT_DEGREES,
            drift_interval_ms: DEFAULT_DRIFT_INTERVAL_MS,
            tick_degrees: DEFAULT_TICK_DEGREES,
            rotation: RotationPolicy::default(),
            default_mode: SpinMode::Random,
            pointer_follows_slice: true,
            display_duplicates: true,
            max_names_visible: MAX_VISIBLE_SLICES,
            log_level: KlogLevel::Info,
            seed: None,
            data_dir: None,
        }
    }
}

impl WheelConfig {
    /// Apply one whitespace-separated token string on top of `self`.
    pub fn apply_cmdline(&mut self, cmdline: &str) {
        for token in cmdline.split_whitespace() {
            if !apply_token(self, token) {
                klog_warn!("config: ignoring '{}'", token);
            }
        }
    }

    /// Random spins turn between `min_turns` and `max_turns` full circles.
    pub fn turn_range(&self) -> (f64, f64) {
        let lo = self.min_turns.min(self.max_turns) as f64;
        let hi = self.min_turns.max(self.max_turns) as f64;
        (lo, hi)
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("on")
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("enabled")
        || value == "1"
    {
        Some(true)
    } else if value.eq_ignore_ascii_case("off")
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("no")
        || value.eq_ignore_ascii_case("disabled")
        || value == "0"
    {
        Some(false)
    } else {
        None
    }
}

fn parse_ms(value: &str) -> Option<u64> {
    if let Some(secs) = value.strip_suffix("ms") {
        return secs.parse().ok();
    }
    if let Some(secs) = value.strip_suffix('s') {
        return secs.parse::<u64>().ok().and_then(|s| s.checked_mul(1000));
    }
    value.parse().ok()
}

fn apply_token(cfg: &mut WheelConfig, token: &str) -> bool {
    let Some((key, value)) = token.split_once('=') else {
        return false;
    };
    match key {
        "spin.duration" => parse_ms(value)
            .filter(|ms| *ms > 0)
            .map(|ms| cfg.spin_duration_ms = ms)
            .is_some(),
        "spin.turns.min" => value.parse().map(|v| cfg.min_turns = v).is_ok(),
        "spin.turns.max" => value.parse().map(|v| cfg.max_turns = v).is_ok(),
        "batch.size" => value
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(|n| cfg.batch_size = n.min(MAX_VISIBLE_SLICES))
            .is_some(),
        "batch.interval" => parse_ms(value)
            .filter(|ms| *ms > 0)
            .map(|ms| cfg.resample_interval_ms = ms)
            .is_some(),
        "drift.rate" => value
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .map(|d| cfg.drift_degrees = d)
            .is_some(),
        "drift.interval" => parse_ms(value)
            .filter(|ms| *ms > 0)
            .map(|ms| cfg.drift_interval_ms = ms)
            .is_some(),
        "tick.degrees" => value
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| cfg.tick_degrees = d)
            .is_some(),
        "rotation" => RotationPolicy::parse(value)
            .map(|r| cfg.rotation = r)
            .is_some(),
        "mode.default" => value
            .parse::<SpinMode>()
            .map(|m| cfg.default_mode = m)
            .is_ok(),
        "pointer.follow" => parse_bool(value)
            .map(|b| cfg.pointer_follows_slice = b)
            .is_some(),
        "display.duplicates" => parse_bool(value)
            .map(|b| cfg.display_duplicates = b)
            .is_some(),
        "display.max" => value
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(|n| cfg.max_names_visible = n.min(MAX_VISIBLE_SLICES))
            .is_some(),
        "log" => KlogLevel::parse(value)
            .map(|l| cfg.log_level = l)
            .is_some(),
        "seed" => value.parse().map(|s| cfg.seed = Some(s)).is_ok(),
        "data.dir" => {
            if value.is_empty() {
                false
            } else {
                cfg.data_dir = Some(PathBuf::from(value));
                true
            }
        }
        _ => false,
    }
}

pub fn config_from_cmdline(cmdline: Option<&str>) -> WheelConfig {
    let mut cfg = WheelConfig::default();
    if let Some(cmdline) = cmdline {
        cfg.apply_cmdline(cmdline);
    }
    cfg
}
