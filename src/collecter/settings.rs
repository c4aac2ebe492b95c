use crate::{cutoff::Cutoff, nmea::time::Date};

/// Default high activity (top event) S4C threshold
pub const DEFAULT_THRESHOLD: f64 = 0.25;

/// Default satellite ID bound
pub const DEFAULT_MAX_SATS: u16 = 33;

/// Station coordinates, used to decorate file names.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StationPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl std::fmt::Display for StationPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ns = if self.latitude < 0.0 { 'S' } else { 'N' };
        let ew = if self.longitude < 0.0 { 'W' } else { 'E' };

        write!(
            f,
            "{:.2}{}_{:.2}{}",
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Station name
    pub name: String,

    /// Custom output directory
    pub prefix: Option<String>,

    /// Decorate file names with the station position
    pub position_name: bool,

    /// Visibility window
    pub cutoff: Cutoff,

    /// Satellites with ID >= max_sats are dropped
    pub max_sats: u16,

    /// Collect GGA positions and release their mean value
    pub positions: bool,

    /// Exclude satellites that are in view but not tracked (no CN0)
    pub skip_untracked: bool,

    /// High activity threshold
    pub threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: "tom".to_string(),
            prefix: None,
            position_name: false,
            cutoff: Cutoff::default(),
            max_sats: DEFAULT_MAX_SATS,
            positions: false,
            skip_untracked: false,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Settings {
    fn filepath(&self, filename: String) -> String {
        let mut filepath = if let Some(prefix) = &self.prefix {
            format!("{}/", prefix.trim_end_matches('/'))
        } else {
            "".to_string()
        };

        filepath.push_str(&filename);
        filepath
    }

    fn station(&self, station: Option<&StationPosition>) -> String {
        match station {
            Some(position) if self.position_name => format!("{}_{}", self.name, position),
            _ => self.name.to_string(),
        }
    }

    /// Daily scintillation file
    pub fn filename(&self, date: &Date, station: Option<&StationPosition>) -> String {
        self.filepath(format!(
            "gps_{}_{}.csv",
            self.station(station),
            date.label()
        ))
    }

    /// Daily position file
    pub fn position_filename(&self, date: &Date, station: Option<&StationPosition>) -> String {
        self.filepath(format!(
            "pos_{}_{}.csv",
            self.station(station),
            date.label()
        ))
    }

    /// High activity events file
    pub fn top_filename(&self) -> String {
        self.filepath(format!("gps_{}_top.csv", self.name))
    }
}

#[cfg(test)]
mod test {
    use super::{Settings, StationPosition};
    use crate::nmea::time::Date;

    #[test]
    fn test_filenames() {
        let mut settings = Settings::default();
        let date = Date::parse("180125").unwrap();

        assert_eq!(settings.filename(&date, None), "gps_tom_250118.csv");
        assert_eq!(settings.position_filename(&date, None), "pos_tom_250118.csv");
        assert_eq!(settings.top_filename(), "gps_tom_top.csv");

        settings.prefix = Some("/mnt/ramdisk/".to_string());
        settings.name = "ROMA".to_string();

        assert_eq!(
            settings.filename(&date, None),
            "/mnt/ramdisk/gps_ROMA_250118.csv"
        );
        assert_eq!(settings.top_filename(), "/mnt/ramdisk/gps_ROMA_top.csv");
    }

    #[test]
    fn test_position_filenames() {
        let mut settings = Settings::default();
        let date = Date::parse("010226").unwrap();

        let station = StationPosition {
            latitude: 41.902_78,
            longitude: -12.496_36,
        };

        // not requested
        assert_eq!(settings.filename(&date, Some(&station)), "gps_tom_260201.csv");

        settings.position_name = true;

        assert_eq!(
            settings.filename(&date, Some(&station)),
            "gps_tom_41.90N_12.50W_260201.csv"
        );

        assert_eq!(
            settings.position_filename(&date, Some(&station)),
            "pos_tom_41.90N_12.50W_260201.csv"
        );

        // not known yet
        assert_eq!(settings.filename(&date, None), "gps_tom_260201.csv");
    }
}
