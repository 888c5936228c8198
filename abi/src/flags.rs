//! Wheel activity flags.
//!
//! The background activities (idle drift and batch resampling) and the spin
//! animation are gated on these bits.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WheelFlags: u8 {
        /// Animation in flight.
        const SPINNING     = 1 << 0;
        /// A result is on screen and has not been dismissed.
        const RESULT_SHOWN = 1 << 1;
        /// The visible batch is committed and must not be resampled.
        const FROZEN       = 1 << 2;
        /// A fixed winner is designated for the next spin.
        const FIXED_PENDING = 1 << 3;
    }
}

impl WheelFlags {
    /// Idle drift only runs when the wheel is not spinning, not showing a
    /// result and not frozen.
    #[inline]
    pub fn is_idle(self) -> bool {
        !self.intersects(Self::SPINNING | Self::RESULT_SHOWN | Self::FROZEN)
    }

    /// Resampling follows the same gate as drift.
    #[inline]
    pub fn may_resample(self) -> bool {
        self.is_idle()
    }
}
