//! NMEA 0183 sentence decoding
use log::debug;
use thiserror::Error;

use std::{
    num::{ParseFloatError, ParseIntError},
    str::FromStr,
};

mod sentence;
pub mod time;

pub use sentence::{Fix, Position, SatelliteBlock, SatellitesInView, Sentence};
use time::{Date, Timestamp, UtcTime};

/// Sentence decoding errors. None of them is fatal: the sentence is simply dropped.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing '$' sentence start")]
    MissingStart,
    #[error("missing '*' checksum delimiter")]
    MissingChecksum,
    #[error("malformed checksum")]
    BadChecksum,
    #[error("checksum mismatch: computed {computed:02X}, received {received:02X}")]
    ChecksumMismatch { computed: u8, received: u8 },
    #[error("missing field #{0}")]
    MissingField(usize),
    #[error("invalid integer: {0}")]
    ParseInt(#[from] ParseIntError),
    #[error("invalid number: {0}")]
    ParseFloat(#[from] ParseFloatError),
    #[error("invalid time field")]
    InvalidTime,
    #[error("invalid date field")]
    InvalidDate,
}

/// Running XOR over the payload (content between '$' and '*').
pub fn checksum(payload: &str) -> u8 {
    payload.bytes().fold(0, |ck, byte| ck ^ byte)
}

/// Locates the payload of this line and verifies its checksum.
pub fn validate(line: &str) -> Result<&str, Error> {
    let line = line.trim();

    let start = line.find('$').ok_or(Error::MissingStart)? + 1;
    let end = line.find('*').ok_or(Error::MissingChecksum)?;

    if end < start {
        return Err(Error::MissingChecksum);
    }

    let suffix = &line[end + 1..];

    if suffix.len() != 2 || !suffix.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::BadChecksum);
    }

    let received = u8::from_str_radix(suffix, 16).map_err(|_| Error::BadChecksum)?;

    let payload = &line[start..end];
    let computed = checksum(payload);

    if computed != received {
        return Err(Error::ChecksumMismatch { computed, received });
    }

    Ok(payload)
}

/// Converts NMEA `(d)ddmm.mmmm` notation to signed decimal degrees.
pub fn to_decimal_degrees(raw: f64, hemisphere: &str) -> f64 {
    let degrees = (raw / 100.0).floor();
    let decimal = degrees + (raw / 100.0 - degrees) * 100.0 / 60.0;

    if hemisphere == "S" || hemisphere == "W" {
        -decimal
    } else {
        decimal
    }
}

/// Comma separated fields of a validated payload.
struct Fields<'a> {
    inner: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(payload: &'a str) -> Self {
        Self {
            inner: payload.split(',').collect(),
        }
    }

    fn raw(&self, index: usize) -> Result<&'a str, Error> {
        self.inner
            .get(index)
            .copied()
            .ok_or(Error::MissingField(index))
    }

    /// Empty numeric fields are read as zero.
    fn number(&self, index: usize) -> Result<f64, Error> {
        let raw = self.raw(index)?.trim();
        if raw.is_empty() {
            Ok(0.0)
        } else {
            Ok(raw.parse::<f64>()?)
        }
    }

    /// Empty integer fields are read as zero.
    fn integer<T: FromStr<Err = ParseIntError> + Default>(&self, index: usize) -> Result<T, Error> {
        let raw = self.raw(index)?.trim();
        if raw.is_empty() {
            Ok(T::default())
        } else {
            Ok(raw.parse::<T>()?)
        }
    }

    fn coordinates(&self, offset: usize) -> Result<(f64, f64), Error> {
        let latitude = to_decimal_degrees(self.number(offset)?, self.raw(offset + 1)?);
        let longitude = to_decimal_degrees(self.number(offset + 2)?, self.raw(offset + 3)?);
        Ok((latitude, longitude))
    }
}

/// Sentence kind, from the address field (talker + formatter).
#[derive(Debug, Copy, Clone, PartialEq)]
enum Kind {
    Fix,
    SatellitesInView,
    Position,
    Text,
    Unknown,
}

impl Kind {
    fn from_address(address: &str) -> Self {
        let (talker, formatter) = match (address.get(..2), address.get(2..)) {
            (Some(talker), Some(formatter)) => (talker, formatter),
            _ => return Self::Unknown,
        };

        // Satellites ids of other constellations would collide with GPS ids
        match (talker, formatter) {
            ("GP", "GSV") => Self::SatellitesInView,
            ("GP" | "GN", "RMC") => Self::Fix,
            ("GP" | "GN", "GGA") => Self::Position,
            ("GP" | "GN", "TXT") => Self::Text,
            _ => Self::Unknown,
        }
    }
}

impl Fix {
    fn decode(fields: &Fields) -> Result<Self, Error> {
        let time = UtcTime::parse(fields.raw(1)?)?;
        let valid = fields.raw(2)? == "A";
        let (latitude, longitude) = fields.coordinates(3)?;
        let date = Date::parse(fields.raw(9)?)?;

        Ok(Self {
            timestamp: Timestamp::new(date, time),
            latitude,
            longitude,
            altitude: None,
            valid,
        })
    }
}

impl Position {
    fn decode(fields: &Fields) -> Result<Self, Error> {
        let time = UtcTime::parse(fields.raw(1)?)?;
        let (latitude, longitude) = fields.coordinates(2)?;
        let altitude = fields.number(9)?;

        Ok(Self {
            time,
            latitude,
            longitude,
            altitude,
        })
    }
}

impl SatelliteBlock {
    fn decode(group: &[&str]) -> Result<Self, Error> {
        let group = Fields {
            inner: group.to_vec(),
        };

        // empty ID: no satellite in this slot
        if group.raw(0)?.trim().is_empty() {
            return Err(Error::MissingField(0));
        }

        let id = group.integer::<u8>(0)?;
        let elevation = group.number(1)?;
        let azimuth = group.number(2)?;
        let untracked = group.raw(3)?.trim().is_empty();
        let cn0 = group.number(3)?;

        Ok(Self {
            id,
            azimuth,
            elevation,
            cn0,
            untracked,
        })
    }
}

impl SatellitesInView {
    fn decode(fields: &Fields) -> Result<Self, Error> {
        let count = fields.integer::<u8>(1)?;
        let index = fields.integer::<u8>(2)?;
        let satellites = fields.integer::<u16>(3)?;

        let groups = fields.inner.get(4..).unwrap_or_default();

        // incomplete trailing group (NMEA 4.10 signal ID) is not a satellite
        let blocks = groups
            .chunks_exact(4)
            .filter_map(|group| match SatelliteBlock::decode(group) {
                Ok(block) => Some(block),
                Err(e) => {
                    debug!("GSV {}/{} - skipped block {:?}: {}", index, count, group, e);
                    None
                },
            })
            .collect();

        Ok(Self {
            index,
            count,
            satellites,
            blocks,
        })
    }
}

impl FromStr for Sentence {
    type Err = Error;

    /// Decodes one line (trailing CR/LF tolerated).
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let payload = validate(line)?;
        let fields = Fields::new(payload);
        let address = fields.raw(0)?;

        match Kind::from_address(address) {
            Kind::Fix => Ok(Self::Fix(Fix::decode(&fields)?)),
            Kind::Position => Ok(Self::Position(Position::decode(&fields)?)),
            Kind::SatellitesInView => Ok(Self::SatellitesInView(SatellitesInView::decode(
                &fields,
            )?)),
            Kind::Text => Ok(Self::Text(fields.raw(4).unwrap_or_default().to_string())),
            Kind::Unknown => Ok(Self::Unknown(address.to_string())),
        }
    }
}
