use hifitime::prelude::Epoch;
use log::{debug, error, info, trace, warn};
use tokio::sync::watch;

use std::str::FromStr;

use crate::{
    collecter::{
        Collecter, Event, Release,
        fd::LogWriter,
        settings::{Settings, StationPosition},
    },
    device::{LineSource, Reading},
    error::Error,
    nmea::{Fix, Sentence},
    utils::{intensity_bar, sv_label},
};

/// Default operator display scale: one '*' per 0.333 of S4C
pub const DEFAULT_SCALE: f64 = 0.333;

/// Acquisition options
#[derive(Debug, Copy, Clone)]
pub struct Options {
    /// Do not display the collected satellites
    pub silent: bool,

    /// Keep acquiring when results cannot be written
    pub keep_going: bool,

    /// Display scale of the intensity bar
    pub scale: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            silent: false,
            keep_going: false,
            scale: DEFAULT_SCALE,
        }
    }
}

/// [Runtime] drives the acquisition, from raw lines to written results.
#[derive(Debug)]
pub struct Runtime {
    /// [Collecter]
    collecter: Collecter,

    /// [LogWriter]
    writer: LogWriter,

    /// [Options]
    options: Options,

    /// Decorate file names with the station position
    position_name: bool,

    /// Epoch of deployment
    deploy_time: Epoch,

    /// First synchronized [Epoch]
    t0: Option<Epoch>,

    /// Number of released epochs
    pub releases: usize,
}

impl Runtime {
    pub fn new(settings: Settings, options: Options, deploy_time: Epoch) -> Self {
        Self {
            collecter: Collecter::new(&settings),
            position_name: settings.position_name,
            writer: LogWriter::new(settings),
            options,
            deploy_time,
            t0: None,
            releases: 0,
        }
    }

    pub fn is_synchronized(&self) -> bool {
        self.collecter.is_synchronized()
    }

    /// Consumes the [LineSource] until it disconnects or `shutdown` is raised.
    /// The epoch being collected is then discarded.
    pub fn run<S: LineSource>(
        &mut self,
        source: &mut S,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<(), Error> {
        loop {
            if *shutdown.borrow() {
                info!(
                    "shutting down - {} pending sample(s) discarded",
                    self.collecter.pending()
                );
                return Ok(());
            }

            match source.read_line()? {
                Reading::Line(line) => self.consume(&line)?,
                Reading::NoData => trace!("no data"),
                Reading::Disconnected => {
                    info!(
                        "end of stream - {} pending sample(s) discarded",
                        self.collecter.pending()
                    );
                    return Ok(());
                },
            }
        }
    }

    /// Consumes one line. Only result writing may fail.
    pub fn consume(&mut self, line: &str) -> Result<(), Error> {
        let sentence = match Sentence::from_str(line) {
            Ok(sentence) => sentence,
            Err(e) => {
                debug!("discarded \"{}\": {}", line.trim(), e);
                return Ok(());
            },
        };

        match sentence {
            Sentence::Fix(fix) => match self.collecter.latch_fix(&fix) {
                Some(Event::Synchronized(_)) => self.synchronized(&fix),
                Some(Event::Released(release)) => self.publish(release)?,
                None => {},
            },
            Sentence::SatellitesInView(gsv) => {
                trace!("GSV {}/{} ({} sats)", gsv.index, gsv.count, gsv.satellites);

                for block in gsv.blocks {
                    self.collecter.latch_satellite(block);
                }
            },
            Sentence::Position(position) => {
                self.collecter.latch_position(position);
            },
            Sentence::Text(text) => {
                if self.is_synchronized() {
                    debug!("receiver: {}", text);
                } else {
                    info!("receiver: {}", text);
                }
            },
            Sentence::Unknown(address) => {
                trace!("{} - not handled", address);
            },
        }

        Ok(())
    }

    fn synchronized(&mut self, fix: &Fix) {
        let label = fix.timestamp;

        if !fix.valid {
            warn!("{} - receiver does not report a valid fix", label);
        }

        info!(
            "Start {} coordinates: {:.6} {:.6}",
            label, fix.latitude, fix.longitude
        );

        self.t0 = label.to_epoch();

        if let Some(t0) = self.t0 {
            debug!("{} - synchronized {} after deployment", label, t0 - self.deploy_time);
        }

        if self.position_name {
            self.writer.set_station_position(StationPosition {
                latitude: fix.latitude,
                longitude: fix.longitude,
            });
        }
    }

    fn publish(&mut self, release: Release) -> Result<(), Error> {
        if !self.options.silent {
            for sat in release.scintillations.iter() {
                info!(
                    "{}  sat: {:>4}  az: {:5.1}  el: {:4.1}  cn0: {:4.1}  s4c: {:5.2} {}",
                    release.label,
                    sv_label(sat.id),
                    sat.azimuth,
                    sat.elevation,
                    sat.cn0,
                    sat.s4c,
                    intensity_bar(sat.s4c, self.options.scale),
                );
            }
        }

        if let (Some(t0), Some(t)) = (self.t0, release.label.to_epoch()) {
            debug!(
                "{} - epoch #{} released, collecting for {}",
                release.label,
                self.releases + 1,
                t - t0
            );
        }

        match self.writer.write(&release) {
            Ok(_) => {
                self.releases += 1;
                Ok(())
            },
            Err(e) => {
                if self.options.keep_going {
                    error!("{} - {}", release.label, e);
                    Ok(())
                } else {
                    Err(e)
                }
            },
        }
    }
}
