//! Human readable byte rates using the best fitting binary prefix.

use std::fmt;

const BASE: f64 = 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ByteUnit {
    Byte,
    KiB,
    MiB,
    GiB,
    TiB,
    PiB,
    EiB,
}

impl ByteUnit {
    /// All units, smallest first.
    pub const SCALE: [ByteUnit; 7] = [
        ByteUnit::Byte,
        ByteUnit::KiB,
        ByteUnit::MiB,
        ByteUnit::GiB,
        ByteUnit::TiB,
        ByteUnit::PiB,
        ByteUnit::EiB,
    ];

    /// Number of bytes in one of this unit.
    pub fn size(self) -> f64 {
        BASE.powi(self as i32)
    }

    fn symbol(self, value: f64) -> &'static str {
        match self {
            ByteUnit::Byte if value == 1.0 => "Byte",
            ByteUnit::Byte => "Bytes",
            ByteUnit::KiB => "KiB",
            ByteUnit::MiB => "MiB",
            ByteUnit::GiB => "GiB",
            ByteUnit::TiB => "TiB",
            ByteUnit::PiB => "PiB",
            ByteUnit::EiB => "EiB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormattedSpeed {
    pub value: f64,
    pub unit: ByteUnit,
}

impl FormattedSpeed {
    /// Picks the largest unit for which the scaled value is still at least 1.
    pub fn best_prefix(bytes: f64) -> Self {
        let unit = ByteUnit::SCALE
            .iter()
            .rev()
            .copied()
            .find(|unit| bytes / unit.size() >= 1.0)
            .unwrap_or(ByteUnit::Byte);

        Self {
            value: bytes / unit.size(),
            unit,
        }
    }
}

impl fmt::Display for FormattedSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit.symbol(self.value))
    }
}

pub fn format_speed(bytes_per_second: f64) -> String {
    FormattedSpeed::best_prefix(bytes_per_second).to_string()
}
