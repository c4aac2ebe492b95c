use log::debug;

use std::{fs::OpenOptions, io::Write};

use crate::{
    collecter::{
        Release,
        settings::{Settings, StationPosition},
    },
    error::Error,
    scintillation::Scintillation,
};

/// CSV row of one satellite, for one epoch
fn scintillation_row(label: &str, sat: &Scintillation) -> String {
    format!(
        "{},{},{:.1},{:.1},{:.1},{:.2}\n",
        label, sat.id, sat.azimuth, sat.elevation, sat.cn0, sat.s4c
    )
}

/// Appends all rows to the file, in a single open-write-close cycle.
fn append(filename: &str, rows: &[String]) -> Result<(), Error> {
    let mut fd = OpenOptions::new()
        .create(true)
        .append(true)
        .open(filename)
        .map_err(|e| Error::Logging(filename.to_string(), e))?;

    fd.write_all(rows.concat().as_bytes())
        .and_then(|_| fd.flush())
        .map_err(|e| Error::Logging(filename.to_string(), e))?;

    debug!("{} - {} row(s) appended", filename, rows.len());
    Ok(())
}

/// [LogWriter] persists every [Release], as soon as it is released.
/// Nothing is buffered in between epochs.
#[derive(Debug, Clone)]
pub struct LogWriter {
    settings: Settings,
    station: Option<StationPosition>,
}

impl LogWriter {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            station: None,
        }
    }

    /// Defines the station position, used in file names (when requested).
    pub fn set_station_position(&mut self, station: StationPosition) {
        self.station = Some(station);
    }

    /// Writes this [Release]: one row per satellite, possible mean position,
    /// and the possible high activity events.
    pub fn write(&self, release: &Release) -> Result<(), Error> {
        let label = release.label.to_string();
        let date = &release.label.date;
        let station = self.station.as_ref();

        if !release.scintillations.is_empty() {
            let rows = release
                .scintillations
                .iter()
                .map(|sat| scintillation_row(&label, sat))
                .collect::<Vec<_>>();

            append(&self.settings.filename(date, station), &rows)?;

            let top = release
                .scintillations
                .iter()
                .filter(|sat| sat.s4c > self.settings.threshold)
                .map(|sat| scintillation_row(&label, sat))
                .collect::<Vec<_>>();

            if !top.is_empty() {
                append(&self.settings.top_filename(), &top)?;
            }
        }

        if let Some(position) = &release.position {
            let row = format!(
                "{},{:.6},{:.6},{:.1}\n",
                label, position.latitude, position.longitude, position.altitude
            );

            append(&self.settings.position_filename(date, station), &[row])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::LogWriter;
    use crate::{
        collecter::{
            MeanPosition, Release,
            settings::{Settings, StationPosition},
        },
        error::Error,
        nmea::time::{Date, Timestamp, UtcTime},
        scintillation::Scintillation,
    };

    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn settings(prefix: &Path) -> Settings {
        Settings {
            prefix: Some(prefix.to_string_lossy().to_string()),
            ..Default::default()
        }
    }

    fn release(time: &str, s4c: &[(u8, f64)]) -> Release {
        Release {
            label: Timestamp::new(Date::parse("180125").unwrap(), UtcTime::parse(time).unwrap()),
            scintillations: s4c
                .iter()
                .map(|(id, s4c)| Scintillation {
                    id: *id,
                    azimuth: 123.4,
                    elevation: 56.0,
                    cn0: 30.0,
                    s4c: *s4c,
                })
                .collect(),
            position: None,
        }
    }

    #[test]
    fn appends_daily_rows() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let writer = LogWriter::new(settings(dir));

        writer.write(&release("100000", &[(5, 0.0), (12, 0.1)])).unwrap();
        writer.write(&release("100100", &[(5, 0.02)])).unwrap();

        let content = fs::read_to_string(dir.join("gps_tom_250118.csv")).unwrap();

        assert_eq!(
            content,
            "250118100000,5,123.4,56.0,30.0,0.00
250118100000,12,123.4,56.0,30.0,0.10
250118100100,5,123.4,56.0,30.0,0.02
"
        );

        // nothing exceeded the threshold
        assert!(!dir.join("gps_tom_top.csv").exists());
        assert!(!dir.join("pos_tom_250118.csv").exists());
    }

    #[test]
    fn top_events() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let writer = LogWriter::new(settings(dir));

        writer
            .write(&release("100000", &[(5, 0.25), (7, 0.26), (9, 1.45)]))
            .unwrap();

        let content = fs::read_to_string(dir.join("gps_tom_top.csv")).unwrap();

        assert_eq!(
            content,
            "250118100000,7,123.4,56.0,30.0,0.26
250118100000,9,123.4,56.0,30.0,1.45
"
        );

        let daily = fs::read_to_string(dir.join("gps_tom_250118.csv")).unwrap();
        assert_eq!(daily.lines().count(), 3);
    }

    #[test]
    fn positions_and_station_naming() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();

        let mut settings = settings(dir);
        settings.position_name = true;

        let mut writer = LogWriter::new(settings);

        writer.set_station_position(StationPosition {
            latitude: 45.4642,
            longitude: 9.19,
        });

        let mut release = release("235900", &[(3, 0.0)]);

        release.position = Some(MeanPosition {
            latitude: 45.464_211,
            longitude: 9.190_001,
            altitude: 122.5,
        });

        writer.write(&release).unwrap();

        let content = fs::read_to_string(dir.join("pos_tom_45.46N_9.19E_250118.csv")).unwrap();
        assert_eq!(content, "250118235900,45.464211,9.190001,122.5\n");

        assert!(dir.join("gps_tom_45.46N_9.19E_250118.csv").exists());
    }

    #[test]
    fn failures_are_reported() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("does-not-exist");
        let writer = LogWriter::new(settings(&dir));

        match writer.write(&release("100000", &[(5, 0.0)])) {
            Err(Error::Logging(filename, _)) => {
                assert!(filename.ends_with("gps_tom_250118.csv"));
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
