pub mod logger;
pub mod model;
pub mod sample;
pub mod scale;
pub mod state;

#[cfg(test)]
pub mod mocks;

use once_cell::sync::OnceCell;
use std::{path::PathBuf, time::Duration};

pub static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Clone, Debug)]
pub struct Config {
  pub bus: String,
  pub output: PathBuf,
  pub duration: Duration,
  pub linear_model: PathBuf,
  pub forest_model: PathBuf,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      bus: "/dev/spidev0.0".to_owned(),
      output: PathBuf::from("adc_predictions.csv"),
      duration: Duration::from_secs(120),
      linear_model: PathBuf::from("LR_OV_Sym_Inst.json"),
      forest_model: PathBuf::from("RF_OV_Sym_Inst.json"),
    }
  }
}

impl Config {
  /// The process-wide configuration, set once in `main` before the state
  /// machine starts.
  pub fn global() -> &'static Config {
    CONFIG.get_or_init(Config::default)
  }
}
