use spidev::{
  spidevioctl::SpidevTransfer,
  SpiModeFlags,
  Spidev,
  SpidevOptions,
};
use std::{fmt, io};

// bit resolution
pub const ADC_RESOLUTION: u8 = 10;

/// Largest code the converter can produce.
pub const MAX_CODE: u16 = (1 << ADC_RESOLUTION) - 1;

/// Number of single-ended input channels.
pub const CHANNEL_COUNT: u8 = 8;

// First command byte carries only the start bit; the second byte selects
// single-ended conversion mode and the input channel.
const START_BIT: u8 = 0x01;
const SINGLE_ENDED: u8 = 0x80;

#[derive(Debug)]
pub enum AdcError {
  InvalidChannel(u8),
  Spi(io::Error),
}

impl fmt::Display for AdcError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AdcError::InvalidChannel(channel) => {
        write!(f, "channel {channel} out of range 0-{}", CHANNEL_COUNT - 1)
      }
      AdcError::Spi(e) => write!(f, "SPI error: {e}"),
    }
  }
}

impl std::error::Error for AdcError {}

impl From<io::Error> for AdcError {
  fn from(err: io::Error) -> AdcError {
    AdcError::Spi(err)
  }
}

/// Three-byte command frame for a single-ended conversion on `channel`.
///
/// The trailing two bytes are don't-cares clocked out while the converter
/// shifts the result back.
pub fn read_command(channel: u8) -> [u8; 3] {
  [START_BIT, SINGLE_ENDED | ((channel & 0x07) << 4), 0x00]
}

/// Unpacks the 10-bit conversion result from a three-byte response.
///
/// The low 5 bits of the second byte are the high bits of the result and the
/// full third byte is the low bits; everything else on the wire is undefined
/// and masked off.
pub fn decode_response(rx_buf: &[u8; 3]) -> u16 {
  ((rx_buf[1] & 0x1F) as u16) << 8 | rx_buf[2] as u16
}

pub struct Mcp3008 {
  spidev: Spidev,
}

impl Mcp3008 {
  pub fn new(bus: &str) -> Result<Mcp3008, AdcError> {
    let mut spidev = Spidev::open(bus)?;

    let options = SpidevOptions::new()
      .bits_per_word(8)
      .max_speed_hz(1_000_000)
      .lsb_first(false)
      .mode(SpiModeFlags::SPI_MODE_0)
      .build();

    spidev.configure(&options)?;

    Ok(Mcp3008 { spidev })
  }

  /// Runs one conversion on `channel` and returns the raw 10-bit code.
  pub fn read_channel(&mut self, channel: u8) -> Result<u16, AdcError> {
    if channel >= CHANNEL_COUNT {
      return Err(AdcError::InvalidChannel(channel));
    }

    let tx_buf = read_command(channel);
    let mut rx_buf: [u8; 3] = [0x00, 0x00, 0x00];
    let mut transfer = SpidevTransfer::read_write(&tx_buf, &mut rx_buf);

    match self.spidev.transfer(&mut transfer) {
      Ok(_) => Ok(decode_response(&rx_buf)),
      Err(e) => Err(AdcError::Spi(e)),
    }
  }
}
