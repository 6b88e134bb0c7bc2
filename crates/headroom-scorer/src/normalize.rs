use crate::config::{CpuGranularity, ScoringConfig};
use headroom_core::resources::{BYTES_PER_MIB, MILLIS_PER_CORE};
use headroom_core::ResourceDimension;

/// Highest score any dimension can reach
pub const MAX_SCORE: i64 = 100;

/// Whole cores of headroom at which the CPU score saturates
pub const MAX_CPU_CORES: i64 = 100;

/// MiB of headroom at which the memory score saturates (1 TiB)
pub const MAX_MEMORY_MIB: i64 = 1024 * 1024;

/// Linear-with-saturation mapping from headroom to a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreScale {
    /// Score at and beyond saturation
    pub max_score: i64,
    /// Headroom, in scoring units, at which the score saturates
    pub max_capacity: i64,
    /// Base units per scoring unit
    pub unit_divisor: i64,
}

impl ScoreScale {
    /// Scale used for `dimension` under `config`
    pub fn for_dimension(dimension: &ResourceDimension, config: &ScoringConfig) -> Self {
        match dimension {
            ResourceDimension::Cpu => Self {
                max_score: MAX_SCORE,
                max_capacity: MAX_CPU_CORES,
                unit_divisor: match config.cpu_granularity {
                    CpuGranularity::Millicores => MILLIS_PER_CORE,
                    CpuGranularity::Cores => 1,
                },
            },
            ResourceDimension::Memory | ResourceDimension::EphemeralStorage => Self {
                max_score: MAX_SCORE,
                max_capacity: MAX_MEMORY_MIB,
                unit_divisor: BYTES_PER_MIB,
            },
            ResourceDimension::Extended(_) => Self {
                max_score: MAX_SCORE,
                max_capacity: 100,
                unit_divisor: 1,
            },
        }
    }

    /// Score `available` headroom given in base units.
    ///
    /// Above `max_capacity` the score is `max_score`; below it the score is
    /// linear and truncated toward zero. Negative headroom gives a negative
    /// score and is not clamped.
    pub fn normalize(&self, available: i64) -> i64 {
        let available = available / self.unit_divisor;

        if available > self.max_capacity {
            self.max_score
        } else {
            (self.max_score as f64 / self.max_capacity as f64 * available as f64) as i64
        }
    }
}
