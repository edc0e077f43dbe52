use crate::{
  logger::{LogRow, PredictionLog},
  model::{self, ForestModel, LinearModel},
  sample::{self, SampleSource},
  scale,
  Config,
};
use chrono::Local;
use jeflog::{fail, pass, task};
use mcp3008::Mcp3008;
use std::{
  io::{self, BufRead, Write},
  time::Instant,
};

pub enum State<S: SampleSource> {
  Init,
  Sampling(SessionData<S>),
  Prompt(SessionData<S>),
  Shutdown,
}

/// Everything a session needs, owned for the lifetime of the run: the bus
/// handle, both loaded models, and the open CSV log.
pub struct SessionData<S: SampleSource> {
  source: S,
  linear: LinearModel,
  forest: ForestModel,
  log: PredictionLog,
}

impl State<Mcp3008> {
  pub fn next(self) -> Self {
    match self {
      State::Init => init(),

      State::Sampling(data) => sampling(data),

      State::Prompt(data) => prompt(data),

      State::Shutdown => State::Shutdown,
    }
  }
}

fn init() -> State<Mcp3008> {
  let config = Config::global();

  task!("Opening ADC on \x1b[1m{}\x1b[0m.", config.bus);
  let source = match Mcp3008::new(&config.bus) {
    Ok(source) => source,
    Err(e) => {
      fail!("Failed to open ADC on {}: {e}", config.bus);
      return State::Shutdown;
    }
  };
  pass!("Opened ADC on \x1b[1m{}\x1b[0m.", config.bus);

  task!("Loading regression models.");
  let linear = match LinearModel::load(&config.linear_model) {
    Ok(linear) => linear,
    Err(e) => {
      fail!("Failed to load linear model: {e:#}");
      return State::Shutdown;
    }
  };

  let forest = match ForestModel::load(&config.forest_model) {
    Ok(forest) => forest,
    Err(e) => {
      fail!("Failed to load forest model: {e:#}");
      return State::Shutdown;
    }
  };
  pass!("Loaded regression models.");

  let log = match PredictionLog::create(&config.output) {
    Ok(log) => log,
    Err(e) => {
      fail!("Failed to create log {}: {e}", config.output.display());
      return State::Shutdown;
    }
  };
  pass!("Logging predictions to \x1b[1m{}\x1b[0m.", config.output.display());

  State::Sampling(SessionData {
    source,
    linear,
    forest,
    log,
  })
}

fn sampling<S: SampleSource>(mut data: SessionData<S>) -> State<S> {
  let duration = Config::global().duration;
  let start = Instant::now();

  // reads run back to back until the session timer expires; the bus sets
  // the pace
  while start.elapsed() < duration {
    if let Err(e) = run_iteration(
      &mut data.source,
      &data.linear,
      &data.forest,
      &mut data.log,
    ) {
      fail!("Session aborted: {e:#}");
      return State::Shutdown;
    }
  }

  State::Prompt(data)
}

/// One read-scale-predict-log pass. A bus or write fault ends the run.
pub fn run_iteration(
  source: &mut impl SampleSource,
  linear: &LinearModel,
  forest: &ForestModel,
  log: &mut PredictionLog,
) -> anyhow::Result<()> {
  let raw = sample::poll_channels(source)?;
  let scaled = scale::scale_all(&raw);

  let linear_outputs = linear.predict(&scaled);
  let forest_output = forest.predict(&scaled);

  let tc = model::mean(&linear_outputs);
  let rul = model::remaining_useful_life(tc);

  log.append(&LogRow {
    timestamp: Local::now(),
    voltages: [scaled[0], scaled[1], scaled[2]],
    currents: [scaled[3], scaled[4], scaled[5]],
    rul,
  })?;

  println!("Linear Regression Prediction: Phase A Temp: {}", linear_outputs[0]);
  println!("Random Forest Prediction: {forest_output}");
  println!("RUL (LR): {rul}");

  Ok(())
}

fn prompt<S: SampleSource>(data: SessionData<S>) -> State<S> {
  let stdin = io::stdin();
  prompt_transition(data, &mut stdin.lock(), &mut io::stdout())
}

/// Decides where the run goes after a session: back to `Sampling` with the
/// same log handle on "yes", otherwise `Shutdown`.
pub fn prompt_transition<S: SampleSource>(
  data: SessionData<S>,
  input: &mut impl BufRead,
  output: &mut impl Write,
) -> State<S> {
  match ask_to_continue(input, output) {
    Ok(true) => State::Sampling(data),
    Ok(false) => {
      pass!("Run complete. Exiting.");
      State::Shutdown
    }
    Err(e) => {
      fail!("Failed to read continuation prompt: {e}");
      State::Shutdown
    }
  }
}

/// Blocking yes/no continuation prompt. Anything other than a
/// case-insensitive "yes" on its own line -- surrounding whitespace, empty
/// input, and EOF included -- declines.
pub fn ask_to_continue(
  input: &mut impl BufRead,
  output: &mut impl Write,
) -> io::Result<bool> {
  write!(output, "Do you want to continue? (yes/no): ")?;
  output.flush()?;

  let mut line = String::new();
  if input.read_line(&mut line)? == 0 {
    return Ok(false);
  }

  // only the line terminator comes off; "  yes  " is a decline
  let answer = line.trim_end_matches(['\n', '\r']);
  Ok(answer.eq_ignore_ascii_case("yes"))
}
