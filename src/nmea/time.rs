use hifitime::prelude::Epoch;

use crate::nmea::Error;

/// UTC time of day, as found in RMC and GGA sentences.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Only present when the receiver streams a fractional part
    pub millis: Option<u16>,
}

/// Calendar date, as found in RMC sentences.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    /// Two digit year (20yy)
    pub year: u8,
    pub month: u8,
    pub day: u8,
}

/// Fix [Timestamp], rendered `yyMMddHHmmss` in every product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub date: Date,
    pub time: UtcTime,
}

fn two_digits(field: &str, offset: usize) -> Result<u8, Error> {
    let digits = field.get(offset..offset + 2).ok_or(Error::InvalidTime)?;

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidTime);
    }

    Ok(digits.parse::<u8>()?)
}

impl UtcTime {
    /// Decodes `hhmmss` or `hhmmss.s[s[s]]`.
    pub fn parse(field: &str) -> Result<Self, Error> {
        let (hhmmss, fraction) = match field.split_once('.') {
            Some((hhmmss, fraction)) => (hhmmss, Some(fraction)),
            None => (field, None),
        };

        if hhmmss.len() != 6 {
            return Err(Error::InvalidTime);
        }

        let hour = two_digits(hhmmss, 0)?;
        let minute = two_digits(hhmmss, 2)?;
        let second = two_digits(hhmmss, 4)?;

        if hour > 23 || minute > 59 || second > 60 {
            return Err(Error::InvalidTime);
        }

        let millis = match fraction {
            None => None,
            Some(fraction) => {
                if fraction.is_empty()
                    || fraction.len() > 3
                    || !fraction.bytes().all(|b| b.is_ascii_digit())
                {
                    return Err(Error::InvalidTime);
                }

                // "5" is 500ms, "05" is 50ms
                let scaling = 10_u16.pow(3 - fraction.len() as u32);
                Some(fraction.parse::<u16>()? * scaling)
            },
        };

        Ok(Self {
            hour,
            minute,
            second,
            millis,
        })
    }

    /// True when this time opens a new epoch: second 00, and no fractional part
    /// (receivers faster than 1 Hz report several fixes within second 00).
    pub fn is_boundary(&self) -> bool {
        match self.millis {
            None | Some(0) => self.second == 0,
            Some(_) => false,
        }
    }
}

impl Date {
    /// Decodes `ddmmyy`.
    pub fn parse(field: &str) -> Result<Self, Error> {
        if field.len() != 6 {
            return Err(Error::InvalidDate);
        }

        let day = two_digits(field, 0).map_err(|_| Error::InvalidDate)?;
        let month = two_digits(field, 2).map_err(|_| Error::InvalidDate)?;
        let year = two_digits(field, 4).map_err(|_| Error::InvalidDate)?;

        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return Err(Error::InvalidDate);
        }

        Ok(Self { year, month, day })
    }

    /// `yyMMdd` label, used in file names.
    pub fn label(&self) -> String {
        format!("{:02}{:02}{:02}", self.year, self.month, self.day)
    }
}

impl Timestamp {
    pub fn new(date: Date, time: UtcTime) -> Self {
        Self { date, time }
    }

    /// Converts to [Epoch], when the calendar allows it (31st of a short month..).
    pub fn to_epoch(&self) -> Option<Epoch> {
        let nanos = self.time.millis.unwrap_or_default() as u32 * 1_000_000;

        Epoch::maybe_from_gregorian_utc(
            2000 + self.date.year as i32,
            self.date.month,
            self.date.day,
            self.time.hour,
            self.time.minute,
            self.time.second,
            nanos,
        )
        .ok()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{:02}{:02}{:02}",
            self.date.label(),
            self.time.hour,
            self.time.minute,
            self.time.second
        )
    }
}
