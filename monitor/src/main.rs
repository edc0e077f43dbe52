use clap::{Arg, Command};
use mcp3008::Mcp3008;
use rul_monitor::{state::State, Config, CONFIG};
use std::{path::PathBuf, time::Duration};

fn main() {
  let matches = Command::new("rul-monitor")
    .about("Polls the phase-monitor ADC and logs RUL predictions to CSV")
    .arg(Arg::new("bus").long("bus").required(false))
    .arg(Arg::new("output").long("output").short('o').required(false))
    .arg(
      Arg::new("duration")
        .long("duration")
        .short('t')
        .required(false)
        .value_parser(clap::value_parser!(f64)),
    )
    .arg(Arg::new("linear-model").long("linear-model").required(false))
    .arg(Arg::new("forest-model").long("forest-model").required(false))
    .get_matches();

  let mut config = Config::default();

  if let Some(bus) = matches.get_one::<String>("bus") {
    config.bus = bus.clone();
  }

  if let Some(output) = matches.get_one::<String>("output") {
    config.output = PathBuf::from(output);
  }

  if let Some(seconds) = matches.get_one::<f64>("duration") {
    config.duration = Duration::from_secs_f64(*seconds);
  }

  if let Some(path) = matches.get_one::<String>("linear-model") {
    config.linear_model = PathBuf::from(path);
  }

  if let Some(path) = matches.get_one::<String>("forest-model") {
    config.forest_model = PathBuf::from(path);
  }

  CONFIG.set(config).unwrap();

  let mut state: State<Mcp3008> = State::Init;

  loop {
    state = state.next();

    if let State::Shutdown = state {
      break;
    }
  }
}
