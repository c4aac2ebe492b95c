use crate::nmea::time::{Timestamp, UtcTime};

/// Fix (RMC) content
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fix {
    /// Epoch [Timestamp]
    pub timestamp: Timestamp,

    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,

    /// RMC does not carry an altitude, GGA does.
    pub altitude: Option<f64>,

    /// Receiver status flag ('A')
    pub valid: bool,
}

/// One satellite out of a GSV sentence.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SatelliteBlock {
    /// Satellite identification number (NMEA numbering)
    pub id: u8,

    /// Azimuth in degrees
    pub azimuth: f64,

    /// Elevation in degrees
    pub elevation: f64,

    /// Carrier to noise density ratio, in dB
    pub cn0: f64,

    /// The CN0 field was empty (satellite in view, but not tracked):
    /// [Self::cn0] was then substituted by zero.
    pub untracked: bool,
}

/// Satellites in view (GSV) message, possibly one page out of several.
#[derive(Debug, Clone, PartialEq)]
pub struct SatellitesInView {
    /// Total number of messages for this second (field 1)
    pub count: u8,

    /// Message index, 1 based (field 2)
    pub index: u8,

    /// Total number of satellites in view
    pub satellites: u16,

    /// Decoded blocks. Malformed blocks are not part of this list.
    pub blocks: Vec<SatelliteBlock>,
}

/// Position (GGA) content
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Position {
    pub time: UtcTime,
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude above mean sea level, in meters
    pub altitude: f64,
}

/// Supported NMEA sentences
#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    /// RMC
    Fix(Fix),
    /// GSV
    SatellitesInView(SatellitesInView),
    /// GGA
    Position(Position),
    /// TXT: receiver diagnostic
    Text(String),
    /// Valid sentence we do not handle. Holds the address field.
    Unknown(String),
}
