//! Epoch collection
use itertools::Itertools;
use log::{debug, trace};

pub mod fd;
pub mod settings;

use crate::{
    cutoff::Cutoff,
    nmea::{Fix, Position, SatelliteBlock, time::Timestamp},
    scintillation::{Scintillation, mean, round_half_up},
};

use settings::Settings;

/// Mean position over one epoch
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeanPosition {
    /// Decimal degrees (6 decimals)
    pub latitude: f64,
    /// Decimal degrees (6 decimals)
    pub longitude: f64,
    /// Meters (one decimal)
    pub altitude: f64,
}

impl MeanPosition {
    fn from_positions(positions: &[Position]) -> Option<Self> {
        if positions.is_empty() {
            return None;
        }

        Some(Self {
            latitude: round_half_up(mean(positions.iter().map(|p| p.latitude)), 6),
            longitude: round_half_up(mean(positions.iter().map(|p| p.longitude)), 6),
            altitude: round_half_up(mean(positions.iter().map(|p| p.altitude)), 1),
        })
    }
}

/// Released (flushed) epoch
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    /// Opening [Timestamp] of this epoch
    pub label: Timestamp,

    /// [Scintillation]s, sorted by satellite ID
    pub scintillations: Vec<Scintillation>,

    /// Possible [MeanPosition]
    pub position: Option<MeanPosition>,
}

/// [Collecter] notifications, on epoch boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// First boundary: collection starts with this label
    Synchronized(Timestamp),
    /// Previous epoch has been flushed
    Released(Release),
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub enum State {
    /// Waiting for the first boundary, everything is discarded
    #[default]
    Syncing,
    /// Collecting the epoch opened at this [Timestamp]
    Accumulating(Timestamp),
}

/// [Collecter] buffers satellite samples between two boundaries
/// (fixes with second = 00). Flushing happens synchronously
/// when the closing boundary is latched.
#[derive(Debug)]
pub struct Collecter {
    state: State,
    cutoff: Cutoff,
    positions_enabled: bool,
    skip_untracked: bool,
    /// Sample buffers, indexed by satellite ID
    satellites: Vec<Vec<SatelliteBlock>>,
    positions: Vec<Position>,
}

impl Collecter {
    /// Builds new [Collecter]
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: State::default(),
            cutoff: settings.cutoff,
            positions_enabled: settings.positions,
            skip_untracked: settings.skip_untracked,
            satellites: vec![Vec::new(); settings.max_sats as usize],
            positions: Vec::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_synchronized(&self) -> bool {
        self.state != State::Syncing
    }

    /// Number of samples in the current epoch
    pub fn pending(&self) -> usize {
        self.satellites.iter().map(|buf| buf.len()).sum()
    }

    /// Latch a new [Fix]. Returns an [Event] on epoch boundaries.
    pub fn latch_fix(&mut self, fix: &Fix) -> Option<Event> {
        if !fix.timestamp.time.is_boundary() {
            return None;
        }

        let now = fix.timestamp;

        match self.state {
            State::Syncing => {
                debug!("{} - synchronized", now);
                self.state = State::Accumulating(now);
                Some(Event::Synchronized(now))
            },
            State::Accumulating(label) => {
                let release = self.release(label);
                self.state = State::Accumulating(now);
                Some(Event::Released(release))
            },
        }
    }

    /// Latch a new [SatelliteBlock]. Returns true when it is collected.
    pub fn latch_satellite(&mut self, block: SatelliteBlock) -> bool {
        if !self.is_synchronized() {
            return false;
        }

        if self.skip_untracked && block.untracked {
            trace!("sat {} - not tracked", block.id);
            return false;
        }

        if !self.cutoff.accepts(block.azimuth, block.elevation) {
            trace!(
                "sat {} - out of window (az={} el={})",
                block.id, block.azimuth, block.elevation
            );
            return false;
        }

        match self.satellites.get_mut(block.id as usize) {
            Some(buffer) => {
                buffer.push(block);
                true
            },
            None => {
                trace!("sat {} - id out of range", block.id);
                false
            },
        }
    }

    /// Latch a new [Position], when position collection is enabled.
    pub fn latch_position(&mut self, position: Position) -> bool {
        if self.positions_enabled && self.is_synchronized() {
            self.positions.push(position);
            true
        } else {
            false
        }
    }

    /// Flushes the current epoch
    fn release(&mut self, label: Timestamp) -> Release {
        let scintillations = self
            .satellites
            .iter()
            .enumerate()
            .filter_map(|(id, samples)| Scintillation::from_samples(id as u8, samples))
            .sorted_by_key(|scintillation| scintillation.id)
            .collect::<Vec<_>>();

        let position = if self.positions_enabled {
            MeanPosition::from_positions(&self.positions)
        } else {
            None
        };

        for buffer in self.satellites.iter_mut() {
            buffer.clear();
        }

        self.positions.clear();

        Release {
            label,
            scintillations,
            position,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Collecter, Event, MeanPosition, State};
    use crate::{
        collecter::settings::Settings,
        cutoff::{Cutoff, Interval},
        nmea::{
            Fix, Position, SatelliteBlock,
            time::{Date, Timestamp, UtcTime},
        },
    };

    fn fix(time: &str) -> Fix {
        Fix {
            timestamp: Timestamp::new(Date::parse("180125").unwrap(), UtcTime::parse(time).unwrap()),
            latitude: 45.0,
            longitude: 9.0,
            altitude: None,
            valid: true,
        }
    }

    fn block(id: u8, cn0: f64) -> SatelliteBlock {
        SatelliteBlock {
            id,
            azimuth: 120.0,
            elevation: 60.0,
            cn0,
            untracked: false,
        }
    }

    fn position(latitude: f64, altitude: f64) -> Position {
        Position {
            time: UtcTime::parse("101010").unwrap(),
            latitude,
            longitude: 9.0,
            altitude,
        }
    }

    fn released(event: Option<Event>) -> super::Release {
        match event {
            Some(Event::Released(release)) => release,
            other => panic!("expecting a release, got {:?}", other),
        }
    }

    #[test]
    fn synchronization() {
        let mut collecter = Collecter::new(&Settings::default());
        assert_eq!(collecter.state(), State::Syncing);

        // discarded while syncing
        assert!(!collecter.latch_satellite(block(5, 30.0)));
        assert!(collecter.latch_fix(&fix("095959.00")).is_none());
        assert_eq!(collecter.pending(), 0);

        let event = collecter.latch_fix(&fix("100000.00"));
        let label = fix("100000.00").timestamp;

        assert_eq!(event, Some(Event::Synchronized(label)));
        assert_eq!(collecter.state(), State::Accumulating(label));
        assert!(collecter.latch_satellite(block(5, 30.0)));
        assert_eq!(collecter.pending(), 1);
    }

    #[test]
    fn constant_signal_epoch() {
        let mut collecter = Collecter::new(&Settings::default());
        collecter.latch_fix(&fix("100000"));

        for second in 1..4 {
            assert!(collecter.latch_fix(&fix(&format!("1000{:02}", second))).is_none());
            assert!(collecter.latch_satellite(block(5, 30.0)));
        }

        let release = released(collecter.latch_fix(&fix("100100")));

        // labeled by the opening boundary
        assert_eq!(release.label.to_string(), "250118100000");
        assert_eq!(release.scintillations.len(), 1);

        let sat = release.scintillations[0];
        assert_eq!(sat.id, 5);
        assert_eq!(sat.cn0, 30.0);
        assert_eq!(sat.s4c, 0.0);
        assert!(release.position.is_none());

        // buffers have been cleared
        assert_eq!(collecter.pending(), 0);

        let release = released(collecter.latch_fix(&fix("100200")));
        assert_eq!(release.label.to_string(), "250118100100");
        assert!(release.scintillations.is_empty());
    }

    #[test]
    fn high_rate_fixes() {
        let mut collecter = Collecter::new(&Settings::default());
        collecter.latch_fix(&fix("100000.00"));

        // 5 Hz receiver: only the first fix of second 00 is a boundary
        for time in ["100000.20", "100000.40", "100000.60", "100000.80", "100001.00"] {
            assert!(collecter.latch_fix(&fix(time)).is_none());
            assert!(collecter.latch_satellite(block(5, 30.0)));
        }

        let release = released(collecter.latch_fix(&fix("100100.00")));
        assert_eq!(release.label.to_string(), "250118100000");
        assert_eq!(release.scintillations.len(), 1);

        assert!(collecter.latch_fix(&fix("100100.20")).is_none());
    }

    #[test]
    fn scintillating_epoch() {
        let mut collecter = Collecter::new(&Settings::default());
        collecter.latch_fix(&fix("100000"));

        for cn0 in [20.0, 30.0, 40.0, 25.0] {
            collecter.latch_satellite(block(17, cn0));
        }

        collecter.latch_satellite(block(2, 44.0));

        let release = released(collecter.latch_fix(&fix("100100")));

        let ids = release
            .scintillations
            .iter()
            .map(|sat| sat.id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec![2, 17]);
        assert_eq!(release.scintillations[1].s4c, 1.45);
        assert_eq!(release.scintillations[1].cn0, 28.8);
    }

    #[test]
    fn filtering() {
        let settings = Settings {
            cutoff: Cutoff::new(
                Interval::parse("315-45", 360).unwrap(),
                Interval::parse("20-90", 90).unwrap(),
            ),
            max_sats: 10,
            skip_untracked: true,
            ..Default::default()
        };

        let mut collecter = Collecter::new(&settings);
        collecter.latch_fix(&fix("100000"));

        let mut sample = block(3, 35.0);

        sample.azimuth = 350.0;
        assert!(collecter.latch_satellite(sample));

        sample.azimuth = 100.0;
        assert!(!collecter.latch_satellite(sample));

        sample.azimuth = 10.0;
        sample.elevation = 10.0;
        assert!(!collecter.latch_satellite(sample));

        sample.elevation = 30.0;
        sample.id = 10;
        assert!(!collecter.latch_satellite(sample));

        sample.id = 9;
        sample.untracked = true;
        sample.cn0 = 0.0;
        assert!(!collecter.latch_satellite(sample));

        assert_eq!(collecter.pending(), 1);
    }

    #[test]
    fn untracked_samples_are_kept_by_default() {
        let mut collecter = Collecter::new(&Settings::default());
        collecter.latch_fix(&fix("100000"));

        let mut sample = block(8, 0.0);
        sample.untracked = true;

        assert!(collecter.latch_satellite(sample));
    }

    #[test]
    fn position_averaging() {
        let settings = Settings {
            positions: true,
            ..Default::default()
        };

        let mut collecter = Collecter::new(&settings);

        // not synchronized yet
        assert!(!collecter.latch_position(position(1.0, 1.0)));

        collecter.latch_fix(&fix("100000"));
        assert!(collecter.latch_position(position(45.000_001, 100.0)));
        assert!(collecter.latch_position(position(45.000_003, 101.0)));

        let release = released(collecter.latch_fix(&fix("100100")));

        assert_eq!(
            release.position,
            Some(MeanPosition {
                latitude: 45.000_002,
                longitude: 9.0,
                altitude: 100.5,
            })
        );

        // nothing collected
        let release = released(collecter.latch_fix(&fix("100200")));
        assert!(release.position.is_none());
    }

    #[test]
    fn positions_disabled() {
        let mut collecter = Collecter::new(&Settings::default());
        collecter.latch_fix(&fix("100000"));

        assert!(!collecter.latch_position(position(45.0, 100.0)));

        let release = released(collecter.latch_fix(&fix("100100")));
        assert!(release.position.is_none());
    }
}
