use chrono::{DateTime, Local};
use std::{
  fs::File,
  io::{self, BufWriter, Write},
  path::Path,
};

pub const CSV_HEADER: &str = "Timestamp,Va,Vb,Vc,Ia,Ib,Ic,RUL";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One logged iteration: wall-clock time, the six scaled readings, and the
/// derived lifetime estimate.
pub struct LogRow {
  pub timestamp: DateTime<Local>,
  pub voltages: [f64; 3],
  pub currents: [f64; 3],
  pub rul: f64,
}

/// Append-only CSV log for one run.
///
/// The file is truncated on creation and the header written exactly once;
/// sessions after a continuation prompt keep appending to the same handle.
pub struct PredictionLog {
  writer: BufWriter<File>,
}

impl PredictionLog {
  pub fn create(path: &Path) -> io::Result<PredictionLog> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{CSV_HEADER}")?;
    writer.flush()?;

    Ok(PredictionLog { writer })
  }

  /// Writes one data row and flushes so a killed run loses at most the
  /// in-flight row.
  pub fn append(&mut self, row: &LogRow) -> io::Result<()> {
    writeln!(
      self.writer,
      "{},{},{},{},{},{},{},{}",
      row.timestamp.format(TIMESTAMP_FORMAT),
      row.voltages[0],
      row.voltages[1],
      row.voltages[2],
      row.currents[0],
      row.currents[1],
      row.currents[2],
      row.rul,
    )?;

    self.writer.flush()
  }
}
