//! Amplitude scintillation (S4C) estimation
use itertools::Itertools;

use crate::nmea::SatelliteBlock;

/// Deterministic half-up rounding to `decimals` places.
pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let scale = 10.0_f64.powi(decimals);
    (value * scale + 0.5).floor() / scale
}

/// Arithmetic mean. Values are summed in ascending order,
/// so the result does not depend on the sampling order.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let values = values
        .into_iter()
        .sorted_by(|a, b| a.total_cmp(b))
        .collect::<Vec<_>>();

    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// S4C index of a CN0 (dB) sample set, rounded to two decimals.
/// Returns 0 when mean terms do not allow the computation
/// (no samples, or numerical noise leading to negative variance).
pub fn s4c(cn0: &[f64]) -> f64 {
    let amplitudes = cn0
        .iter()
        .map(|cn0| 10.0_f64.powf(cn0 / 10.0))
        .collect::<Vec<_>>();

    let mean_power = mean(amplitudes.iter().map(|amp| amp * amp));
    let mean_amp_sq = mean(amplitudes.iter().copied()).powi(2);

    if mean_amp_sq > 0.0 && mean_power >= mean_amp_sq {
        let s4c = ((mean_power - mean_amp_sq) / mean_amp_sq).sqrt();
        round_half_up(s4c, 2)
    } else {
        0.0
    }
}

/// [Scintillation] of one satellite over one epoch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Scintillation {
    /// Satellite ID
    pub id: u8,

    /// Mean azimuth (degrees, one decimal)
    pub azimuth: f64,

    /// Mean elevation (degrees, one decimal)
    pub elevation: f64,

    /// Mean CN0 (dB, one decimal)
    pub cn0: f64,

    /// S4C index (two decimals)
    pub s4c: f64,
}

impl Scintillation {
    /// Estimates [Scintillation] from all samples collected for satellite `id`.
    /// Returns None when no sample was collected.
    pub fn from_samples(id: u8, samples: &[SatelliteBlock]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let cn0 = samples.iter().map(|s| s.cn0).collect::<Vec<_>>();

        Some(Self {
            id,
            azimuth: round_half_up(mean(samples.iter().map(|s| s.azimuth)), 1),
            elevation: round_half_up(mean(samples.iter().map(|s| s.elevation)), 1),
            cn0: round_half_up(mean(cn0.iter().copied()), 1),
            s4c: s4c(&cn0),
        })
    }
}
