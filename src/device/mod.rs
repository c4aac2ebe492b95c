use log::{debug, warn};

use serialport::ClearBuffer;

mod interface;

use interface::Interface;

use std::{
    fs::File,
    io::{BufRead, BufReader, ErrorKind},
    time::Duration,
};

use crate::error::Error;

/// Outcome of one bounded read
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// One complete line, terminator included
    Line(String),
    /// Nothing received within the read timeout
    NoData,
    /// Stream has ended or the device is gone
    Disconnected,
}

/// Anything that streams NMEA lines, with bounded blocking reads.
pub trait LineSource {
    fn read_line(&mut self) -> std::io::Result<Reading>;
}

pub struct Device {
    reader: BufReader<Interface>,
    /// Incomplete line, when a timeout interrupted its reception
    pending: String,
}

impl Device {
    fn new(interface: Interface) -> Self {
        Self {
            reader: BufReader::new(interface),
            pending: String::with_capacity(128),
        }
    }

    /// Opens a serial port. Reads are bounded by `timeout`.
    pub fn open_serial_port(port_str: &str, baud: u32, timeout: Duration) -> Result<Self, Error> {
        let port = serialport::new(port_str, baud).timeout(timeout).open()?;

        // discard anything received prior opening
        if let Err(e) = port.clear(ClearBuffer::Input) {
            warn!("{} - failed to flush input buffer: {}", port_str, e);
        }

        debug!("{} - opened at {} bauds", port_str, baud);
        Ok(Self::new(Interface::from_serial_port(port)))
    }

    /// Opens a recorded stream. Gzip files must be terminated by ".gz".
    pub fn open_file(fullpath: &str) -> Result<Self, Error> {
        let handle = File::open(fullpath)?;

        Ok(Self::new(if fullpath.ends_with(".gz") {
            Interface::from_gzip_file_handle(handle)
        } else {
            Interface::from_file_handle(handle)
        }))
    }

    /// Stacks one more recorded stream, consumed after the previous ones.
    pub fn stack_file(&mut self, fullpath: &str) -> Result<(), Error> {
        let handle = File::open(fullpath)?;
        let interface = self.reader.get_mut();

        if fullpath.ends_with(".gz") {
            interface.stack_gzip_file_handle(handle);
        } else {
            interface.stack_file_handle(handle);
        }

        Ok(())
    }

    pub fn is_read_only(&self) -> bool {
        self.reader.get_ref().is_read_only()
    }

    /// Converts read errors. Timeouts are expected on serial ports.
    fn read_error(&mut self, e: std::io::Error) -> std::io::Result<Reading> {
        match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted => {
                Ok(Reading::NoData)
            },
            ErrorKind::InvalidData => {
                warn!("discarding non UTF-8 content");
                self.pending.clear();
                Ok(Reading::NoData)
            },
            ErrorKind::BrokenPipe | ErrorKind::NotConnected | ErrorKind::UnexpectedEof => {
                Ok(Reading::Disconnected)
            },
            _ => Err(e),
        }
    }
}

impl LineSource for Device {
    /// Reads next line, converting timeouts into [Reading::NoData],
    /// which is most convenient for real-time perpetual hardware application like this one.
    /// Blank lines are skipped.
    fn read_line(&mut self) -> std::io::Result<Reading> {
        loop {
            match self.reader.read_line(&mut self.pending) {
                Ok(0) => {
                    return if !self.pending.trim().is_empty() {
                        Ok(Reading::Line(std::mem::take(&mut self.pending)))
                    } else if self.is_read_only() {
                        self.pending.clear();
                        Ok(Reading::Disconnected)
                    } else {
                        Ok(Reading::NoData)
                    };
                },
                Ok(_) => {
                    if self.pending.trim().is_empty() {
                        self.pending.clear();
                        continue;
                    }

                    // either terminated, or last line of a recorded stream
                    return Ok(Reading::Line(std::mem::take(&mut self.pending)));
                },
                Err(e) => return self.read_error(e),
            }
        }
    }
}
