//! Visibility window
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("invalid interval \"{0}\": expecting start-end")]
    Format(String),
    #[error("invalid interval bound {0}: must be within 0..={1}")]
    OutOfRange(u16, u16),
}

/// Inclusive angle interval, in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// Parses "start-end", both bounds within `0..=max`.
    pub fn parse(s: &str, max: u16) -> Result<Self, Error> {
        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| Error::Format(s.to_string()))?;

        let mut bounds = [0.0; 2];

        for (bound, value) in bounds.iter_mut().zip([start, end]) {
            let value = value
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Format(s.to_string()))?;

            if value > max {
                return Err(Error::OutOfRange(value, max));
            }

            *bound = value as f64;
        }

        Ok(Self {
            start: bounds[0],
            end: bounds[1],
        })
    }
}

/// Azimuth / Elevation [Cutoff] window.
/// The azimuth interval may cross north (start > end).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cutoff {
    pub azimuth: Interval,
    pub elevation: Interval,
}

impl Default for Cutoff {
    /// Full sky: no filtering
    fn default() -> Self {
        Self {
            azimuth: Interval {
                start: 0.0,
                end: 360.0,
            },
            elevation: Interval {
                start: 0.0,
                end: 90.0,
            },
        }
    }
}

impl Cutoff {
    pub fn new(azimuth: Interval, elevation: Interval) -> Self {
        Self { azimuth, elevation }
    }

    pub fn accepts_azimuth(&self, azimuth: f64) -> bool {
        let Interval { start, end } = self.azimuth;

        if start <= end {
            start <= azimuth && azimuth <= end
        } else {
            azimuth >= start || azimuth <= end
        }
    }

    pub fn accepts_elevation(&self, elevation: f64) -> bool {
        self.elevation.start <= elevation && elevation <= self.elevation.end
    }

    /// True if this direction lies within the visibility window.
    pub fn accepts(&self, azimuth: f64, elevation: f64) -> bool {
        self.accepts_azimuth(azimuth) && self.accepts_elevation(elevation)
    }
}

impl std::fmt::Display for Cutoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "az: {}-{} el: {}-{}",
            self.azimuth.start, self.azimuth.end, self.elevation.start, self.elevation.end
        )
    }
}
