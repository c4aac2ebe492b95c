use flate2::read::MultiGzDecoder;
use serialport::SerialPort;

use std::{
    fs::File,
    io::{Read, empty},
};

/// [Interface] to the NMEA stream
pub enum Interface {
    /// [Interface::ReadOnly] is dedicated to recorded streams, mainly File inputs.
    ReadOnly(Box<dyn Read + Send>),

    /// [Interface::Port] is used to connect to a physical port (GNSS receiver).
    Port(Box<dyn SerialPort>),
}

impl Interface {
    /// Creates a new [SerialPort] interface
    pub fn from_serial_port(port: Box<dyn SerialPort>) -> Self {
        Self::Port(port)
    }

    /// Creates a new Read-Only interface
    pub fn from_file_handle(handle: File) -> Self {
        Self::ReadOnly(Box::new(handle))
    }

    /// Creates a new Read-Only interface, from a gzip compressed file
    pub fn from_gzip_file_handle(handle: File) -> Self {
        Self::ReadOnly(Box::new(MultiGzDecoder::new(handle)))
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly(_))
    }

    /// Previous content may not be terminated: a line feed separates
    /// the last sentence of a file from the first one of the next.
    fn stack<R: Read + Send + 'static>(&mut self, next: R) {
        if let Self::ReadOnly(current) = self {
            let previous: Box<dyn Read + Send> = std::mem::replace(current, Box::new(empty()));
            *current = Box::new(previous.chain(&b"\n"[..]).chain(next));
        }
    }

    /// Stacks a new file, consumed once all previous content was consumed.
    /// Has no effect on a [Interface::Port].
    pub fn stack_file_handle(&mut self, handle: File) {
        self.stack(handle);
    }

    /// Stacks a new gzip compressed file.
    pub fn stack_gzip_file_handle(&mut self, handle: File) {
        self.stack(MultiGzDecoder::new(handle));
    }
}

impl Read for Interface {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::ReadOnly(r) => r.read(buf),
            Self::Port(port) => port.read(buf),
        }
    }
}
