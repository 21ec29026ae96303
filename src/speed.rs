use std::fmt;

const BITS_PER_BYTE: f64 = 8.0;
const BITS_PER_MEGABIT: f64 = 1_000_000.0;

/// A throughput, stored as bytes per second.
///
/// Configured speeds are human-entered megabits per second while the
/// measurer reports raw bytes per second. Both go through this type so the
/// limit comparison never mixes units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Speed(f64);

impl Speed {
    pub fn from_bytes_per_second(bytes: f64) -> Self {
        Self(bytes.max(0.0))
    }

    pub fn from_megabits_per_second(mbps: f64) -> Self {
        Self::from_bytes_per_second(mbps * BITS_PER_MEGABIT / BITS_PER_BYTE)
    }

    pub fn bytes_per_second(self) -> f64 {
        self.0
    }

    pub fn megabits_per_second(self) -> f64 {
        self.0 * BITS_PER_BYTE / BITS_PER_MEGABIT
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} Mbit/s", self.megabits_per_second())
    }
}
