use crate::sample::CHANNEL_COUNT;

const VREF: f64 = 3.3;

// Calibration sheet writes the crest factor as 1.414, not sqrt(2); keep the
// literal so scaled output matches the commissioning data.
const CREST_FACTOR: f64 = 1.414;

pub struct ChannelCal {
  /// Sense-circuit midpoint voltage at zero input.
  pub offset: f64,
  /// Peak physical value at full deflection (volts or amps).
  pub peak_scale: f64,
}

/// Per-channel calibration: Va, Vb, Vc, then Ia, Ib, Ic.
///
/// Channel 2's divider measures at 1.27 V rather than 1.24 V like the other
/// two voltage senses; the constants stay per-channel, never unified.
pub const CHANNEL_CALS: [ChannelCal; CHANNEL_COUNT] = [
  ChannelCal { offset: 1.24, peak_scale: 130.0 },
  ChannelCal { offset: 1.24, peak_scale: 130.0 },
  ChannelCal { offset: 1.27, peak_scale: 130.0 },
  ChannelCal { offset: 1.24, peak_scale: 4.0 },
  ChannelCal { offset: 1.24, peak_scale: 4.0 },
  ChannelCal { offset: 1.24, peak_scale: 4.0 },
];

/// Converts one raw code to its physical value.
///
/// No clamping: codes outside 0-1023 pass through and produce out-of-range
/// physical values.
pub fn scale(raw: u16, cal: &ChannelCal) -> f64 {
  let feedback = raw as f64 * VREF / mcp3008::MAX_CODE as f64;
  (feedback - cal.offset) / cal.offset * (cal.peak_scale * CREST_FACTOR)
}

/// Converts a full sweep to [Va, Vb, Vc, Ia, Ib, Ic].
pub fn scale_all(raw: &[u16; CHANNEL_COUNT]) -> [f64; CHANNEL_COUNT] {
  let mut scaled = [0.0; CHANNEL_COUNT];

  for (channel, code) in raw.iter().enumerate() {
    scaled[channel] = scale(*code, &CHANNEL_CALS[channel]);
  }

  scaled
}
