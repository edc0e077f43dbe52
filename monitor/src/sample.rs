use mcp3008::{AdcError, Mcp3008};

/// Number of phase-monitor inputs wired to the converter: three voltage
/// senses followed by three current senses.
pub const CHANNEL_COUNT: usize = 6;

/// Anything that can produce a raw conversion for a channel index.
///
/// `Mcp3008` is the hardware implementation; tests substitute a stub.
pub trait SampleSource {
  fn read_channel(&mut self, channel: u8) -> Result<u16, AdcError>;
}

impl SampleSource for Mcp3008 {
  fn read_channel(&mut self, channel: u8) -> Result<u16, AdcError> {
    Mcp3008::read_channel(self, channel)
  }
}

/// Sweeps channels 0-5 in order and returns the six raw codes.
///
/// The first failed read aborts the sweep; there is no retry.
pub fn poll_channels(
  source: &mut impl SampleSource,
) -> Result<[u16; CHANNEL_COUNT], AdcError> {
  let mut raw = [0u16; CHANNEL_COUNT];

  for channel in 0..CHANNEL_COUNT {
    raw[channel] = source.read_channel(channel as u8)?;
  }

  Ok(raw)
}
