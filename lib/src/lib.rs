//! Support library shared by every spinwheel crate: logging, clocks,
//! randomness, runtime configuration and the suite-based test harness.

pub mod clock;
pub mod config;
pub mod klog;
pub mod random;
pub mod testing;


#[doc(hidden)]
pub use paste;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RotationPolicy, WheelConfig, config_from_cmdline, parse_bool};
pub use klog::{
    KlogLevel, klog_get_level, klog_init, klog_register_backend, klog_reset_backend,
    klog_set_level,
};
pub use random::WheelRng;
