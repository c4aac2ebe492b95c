use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write \"{0}\": {1}")]
    Logging(String, std::io::Error),
    #[error("serial port error: {0}")]
    SerialPort(#[from] serialport::Error),
}
