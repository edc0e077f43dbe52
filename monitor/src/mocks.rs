use crate::sample::{SampleSource, CHANNEL_COUNT};
use mcp3008::AdcError;
use std::io;

/// Sample source that answers every sweep with the same six raw codes.
pub struct FixedSource {
  pub raw: [u16; CHANNEL_COUNT],
  pub reads: usize,
}

impl FixedSource {
  pub fn new(raw: [u16; CHANNEL_COUNT]) -> Self {
    Self { raw, reads: 0 }
  }
}

impl SampleSource for FixedSource {
  fn read_channel(&mut self, channel: u8) -> Result<u16, AdcError> {
    self.reads += 1;
    Ok(self.raw[channel as usize])
  }
}

/// Sample source whose every read fails at the bus level.
pub struct FaultySource;

impl SampleSource for FaultySource {
  fn read_channel(&mut self, _channel: u8) -> Result<u16, AdcError> {
    Err(AdcError::Spi(io::Error::new(
      io::ErrorKind::Other,
      "bus fault",
    )))
  }
}
