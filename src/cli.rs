use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};

use std::time::Duration;

use crate::{
    collecter::settings::{DEFAULT_MAX_SATS, DEFAULT_THRESHOLD, Settings},
    cutoff::{Cutoff, Interval},
    runtime::{DEFAULT_SCALE, Options},
};

pub struct Cli {
    /// Arguments passed by user
    matches: ArgMatches,
}

impl Cli {
    /// Build new command line interface
    pub fn new() -> Self {
        Self {
            matches: {
                Command::new("nmea2s4c")
                    .version(env!("CARGO_PKG_VERSION"))
                    .about("NMEA stream to amplitude scintillation (S4C) collecter")
                    .color(ColorChoice::Always)
                    .arg_required_else_help(true)
                    .next_help_heading("Serial port (Active device, GNSS receiver)")
                    .arg(
                        Arg::new("port")
                            .short('p')
                            .long("port")
                            .value_name("PORT")
                            .required_unless_present_any(["file"])
                            .help("Define serial port. Example /dev/ttyACM0 on Linux, COM1 on Windows")
                    )
                    .arg(
                        Arg::new("baudrate")
                            .short('b')
                            .long("baud")
                            .required(false)
                            .value_name("Baudrate (u32)")
                            .help("Define serial port baud rate. By default we use 9600, which is the NMEA standard rate."),
                    )
                    .arg(
                        Arg::new("timeout")
                            .long("timeout")
                            .required(false)
                            .value_name("Milliseconds")
                            .help("Read timeout. Stop requests are handled at least this often. Default is 1000ms."),
                    )
                    .next_help_heading("File interface (Passive mode)")
                    .arg(
                        Arg::new("file")
                            .long("file")
                            .short('f')
                            .value_name("FILENAME")
                            .action(ArgAction::Append)
                            .required_unless_present_any(["port"])
                            .help("Load a single NMEA recording. Use as many as needed.
Each file is consumed one after the other, load them according to their sampling chronology.
Gzip files are supported but they must be terminated with '.gz'")
                    )
                    .next_help_heading("Visibility window")
                    .arg(
                        Arg::new("azimuth")
                            .long("azimuth")
                            .value_name("START-END")
                            .required(false)
                            .help("Azimuth cutoff in degrees, for example 45-280.
The window may cross north, for example 315-45. Default is 0-360 (no filtering).")
                    )
                    .arg(
                        Arg::new("elevation")
                            .long("elevation")
                            .value_name("START-END")
                            .required(false)
                            .help("Elevation cutoff in degrees, for example 20-80. Default is 0-90 (no filtering).")
                    )
                    .arg(
                        Arg::new("max-sats")
                            .long("max-sats")
                            .required(false)
                            .help("Satellites with greater or equal ID are dropped. Default is 33 (GPS only).")
                    )
                    .arg(
                        Arg::new("skip-untracked")
                            .long("skip-untracked")
                            .action(ArgAction::SetTrue)
                            .help("Drop satellites that are in view but not tracked (empty CN0).
By default, their CN0 is considered null.")
                    )
                    .next_help_heading("Collection")
                    .arg(
                        Arg::new("name")
                            .long("name")
                            .short('n')
                            .required(false)
                            .action(ArgAction::Set)
                            .help("Define station name, used in every file name. Default is \"tom\".")
                    )
                    .arg(
                        Arg::new("prefix")
                            .long("prefix")
                            .required(false)
                            .help("Custom directory prefix for output products. Default is none!"),
                    )
                    .arg(
                        Arg::new("position-name")
                            .long("position-name")
                            .action(ArgAction::SetTrue)
                            .help("Add station coordinates (first synchronized fix) to file names.")
                    )
                    .arg(
                        Arg::new("positions")
                            .long("positions")
                            .action(ArgAction::SetTrue)
                            .help("Collect GGA positions and write their mean value, per epoch.")
                    )
                    .arg(
                        Arg::new("threshold")
                            .long("threshold")
                            .required(false)
                            .help("S4C threshold of high activity (top) events. Default is 0.25.")
                    )
                    .arg(
                        Arg::new("keep-going")
                            .long("keep-going")
                            .action(ArgAction::SetTrue)
                            .help("Keep acquiring when results cannot be written. Default is to abort.")
                    )
                    .next_help_heading("Display")
                    .arg(
                        Arg::new("silent")
                            .long("silent")
                            .short('s')
                            .action(ArgAction::SetTrue)
                            .help("Do not display the collected satellites.")
                    )
                    .arg(
                        Arg::new("scale")
                            .long("scale")
                            .required(false)
                            .help("S4C intensity bar scale: one '*' per scale unit. Default is 0.333.")
                    )
                    .get_matches()
            },
        }
    }

    /// Returns User serial port
    pub fn serial_port(&self) -> Option<&String> {
        self.matches.get_one::<String>("port")
    }

    /// Input file paths
    pub fn filepaths(&self) -> Vec<&String> {
        if let Some(fp) = self.matches.get_many::<String>("file") {
            fp.collect()
        } else {
            Vec::new()
        }
    }

    /// Returns User baud rate
    pub fn baud_rate(&self) -> Option<u32> {
        let baud = self.matches.get_one::<String>("baudrate")?;
        let baud = baud
            .trim()
            .parse::<u32>()
            .unwrap_or_else(|e| panic!("Invalid baud rate value: {}", e));
        Some(baud)
    }

    /// Read timeout
    pub fn timeout(&self) -> Duration {
        if let Some(timeout) = self.matches.get_one::<String>("timeout") {
            let ms = timeout
                .trim()
                .parse::<u64>()
                .unwrap_or_else(|e| panic!("Invalid timeout: {}", e));

            if ms == 0 {
                panic!("Timeout must not be null");
            }

            Duration::from_millis(ms)
        } else {
            Duration::from_millis(1_000)
        }
    }

    fn interval(&self, key: &str, max: u16) -> Interval {
        if let Some(interval) = self.matches.get_one::<String>(key) {
            Interval::parse(interval, max)
                .unwrap_or_else(|e| panic!("Invalid {} cutoff: {}", key, e))
        } else {
            Interval {
                start: 0.0,
                end: max as f64,
            }
        }
    }

    fn cutoff(&self) -> Cutoff {
        Cutoff::new(self.interval("azimuth", 360), self.interval("elevation", 90))
    }

    fn max_sats(&self) -> u16 {
        if let Some(max) = self.matches.get_one::<String>("max-sats") {
            let max = max
                .trim()
                .parse::<u16>()
                .unwrap_or_else(|e| panic!("Invalid max-sats value: {}", e));

            if max > 256 {
                panic!("NMEA satellite numbers are limited to 255");
            }

            max
        } else {
            DEFAULT_MAX_SATS
        }
    }

    fn positive(&self, key: &str, default: f64) -> f64 {
        if let Some(value) = self.matches.get_one::<String>(key) {
            let value = value
                .trim()
                .parse::<f64>()
                .unwrap_or_else(|e| panic!("Invalid {} value: {}", key, e));

            if !(value >= 0.0) {
                panic!("{} must be positive", key);
            }

            value
        } else {
            default
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            name: if let Some(name) = self.matches.get_one::<String>("name") {
                name.to_string()
            } else {
                "tom".to_string()
            },
            prefix: self.matches.get_one::<String>("prefix").cloned(),
            position_name: self.matches.get_flag("position-name"),
            cutoff: self.cutoff(),
            max_sats: self.max_sats(),
            positions: self.matches.get_flag("positions"),
            skip_untracked: self.matches.get_flag("skip-untracked"),
            threshold: self.positive("threshold", DEFAULT_THRESHOLD),
        }
    }

    pub fn options(&self) -> Options {
        Options {
            silent: self.matches.get_flag("silent"),
            keep_going: self.matches.get_flag("keep-going"),
            scale: self.positive("scale", DEFAULT_SCALE),
        }
    }
}
