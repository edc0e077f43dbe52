use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

/// Width of the feature vector: three phase voltages, three phase currents.
pub const FEATURE_COUNT: usize = 6;

// Arrhenius-style lifetime constants: rated life at the base winding
// temperature, halved for every 10 degrees above it.
const DESIGN_LIFE_HOURS: f64 = 20000.0;
const BASE_TEMP_CELSIUS: f64 = 155.0;
const HOURS_PER_YEAR: f64 = 365.0 * 24.0;

/// One output of the linear regressor: an affine map over the features.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearOutput {
  pub coefficients: Vec<f64>,
  pub intercept: f64,
}

/// Linear regression artifact, exported to JSON by the training pipeline.
///
/// Loaded once at startup and immutable for the rest of the run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearModel {
  pub outputs: Vec<LinearOutput>,
}

impl LinearModel {
  pub fn load(path: &Path) -> anyhow::Result<LinearModel> {
    let file = File::open(path)
      .with_context(|| format!("opening linear model {}", path.display()))?;
    let model: LinearModel = serde_json::from_reader(BufReader::new(file))
      .with_context(|| format!("parsing linear model {}", path.display()))?;

    model.validate()?;
    Ok(model)
  }

  pub fn validate(&self) -> anyhow::Result<()> {
    if self.outputs.is_empty() {
      bail!("linear model has no outputs");
    }

    for (i, output) in self.outputs.iter().enumerate() {
      if output.coefficients.len() != FEATURE_COUNT {
        bail!(
          "linear model output {i} has {} coefficients, expected {FEATURE_COUNT}",
          output.coefficients.len()
        );
      }
    }

    Ok(())
  }

  pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Vec<f64> {
    // load() validates this; hand-built models must hold it too
    assert!(!self.outputs.is_empty(), "linear model has no outputs");

    self
      .outputs
      .iter()
      .map(|output| {
        output.intercept
          + output
            .coefficients
            .iter()
            .zip(features)
            .map(|(c, x)| c * x)
            .sum::<f64>()
      })
      .collect()
  }
}

/// Node of a regression tree in flat-array form.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
  Split {
    feature: usize,
    threshold: f64,
    left: usize,
    right: usize,
  },
  Leaf {
    value: f64,
  },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tree {
  pub nodes: Vec<TreeNode>,
}

impl Tree {
  fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
    let mut index = 0;

    loop {
      match &self.nodes[index] {
        TreeNode::Split { feature, threshold, left, right } => {
          index = if features[*feature] <= *threshold {
            *left
          } else {
            *right
          };
        }
        TreeNode::Leaf { value } => return *value,
      }
    }
  }
}

/// Tree-ensemble regression artifact; prediction is the mean over trees.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForestModel {
  pub trees: Vec<Tree>,
}

impl ForestModel {
  pub fn load(path: &Path) -> anyhow::Result<ForestModel> {
    let file = File::open(path)
      .with_context(|| format!("opening forest model {}", path.display()))?;
    let model: ForestModel = serde_json::from_reader(BufReader::new(file))
      .with_context(|| format!("parsing forest model {}", path.display()))?;

    model.validate()?;
    Ok(model)
  }

  pub fn validate(&self) -> anyhow::Result<()> {
    if self.trees.is_empty() {
      bail!("forest model has no trees");
    }

    for (t, tree) in self.trees.iter().enumerate() {
      if tree.nodes.is_empty() {
        bail!("forest tree {t} has no nodes");
      }

      for (n, node) in tree.nodes.iter().enumerate() {
        if let TreeNode::Split { feature, left, right, .. } = node {
          if *feature >= FEATURE_COUNT {
            bail!("forest tree {t} node {n} splits on feature {feature}");
          }

          // children must sit strictly after their parent so traversal
          // terminates
          if *left <= n || *right <= n || *left >= tree.nodes.len()
            || *right >= tree.nodes.len()
          {
            bail!("forest tree {t} node {n} has malformed child indices");
          }
        }
      }
    }

    Ok(())
  }

  pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
    // load() validates this; hand-built models must hold it too
    assert!(!self.trees.is_empty(), "forest model has no trees");

    let sum: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
    sum / self.trees.len() as f64
  }
}

pub fn mean(values: &[f64]) -> f64 {
  values.iter().sum::<f64>() / values.len() as f64
}

/// Years of remaining life at a sustained winding temperature `tc`.
///
/// Life halves for every 10 degrees above the 155 degree base temperature
/// and doubles for every 10 degrees below it. No bounds check on `tc`.
pub fn remaining_useful_life(tc: f64) -> f64 {
  DESIGN_LIFE_HOURS * 2f64.powf((BASE_TEMP_CELSIUS - tc) / 10.0)
    / HOURS_PER_YEAR
}

#[cfg(test)]
mod tests {
  use super::*;

  fn constant_linear(value: f64) -> LinearModel {
    LinearModel {
      outputs: vec![LinearOutput {
        coefficients: vec![0.0; FEATURE_COUNT],
        intercept: value,
      }],
    }
  }

  #[test]
  fn linear_predict_is_affine() {
    let model = LinearModel {
      outputs: vec![LinearOutput {
        coefficients: vec![1.0, 0.0, 0.0, 0.0, 0.0, 2.0],
        intercept: 10.0,
      }],
    };

    let prediction = model.predict(&[3.0, 9.0, 9.0, 9.0, 9.0, 0.5]);
    assert_eq!(prediction, vec![10.0 + 3.0 + 1.0]);
  }

  #[test]
  fn linear_validate_rejects_wrong_arity() {
    let model = LinearModel {
      outputs: vec![LinearOutput {
        coefficients: vec![1.0, 2.0],
        intercept: 0.0,
      }],
    };
    assert!(model.validate().is_err());

    assert!(constant_linear(155.0).validate().is_ok());
  }

  #[test]
  fn linear_model_round_trips_through_json() {
    let json = r#"{
      "outputs": [
        { "coefficients": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0], "intercept": 155.0 }
      ]
    }"#;

    let model: LinearModel = serde_json::from_str(json).unwrap();
    model.validate().unwrap();
    assert_eq!(model.predict(&[1.0; FEATURE_COUNT]), vec![155.0]);
  }

  #[test]
  fn tree_traversal_follows_thresholds() {
    let tree = Tree {
      nodes: vec![
        TreeNode::Split { feature: 0, threshold: 1.0, left: 1, right: 2 },
        TreeNode::Leaf { value: 100.0 },
        TreeNode::Split { feature: 5, threshold: 0.5, left: 3, right: 4 },
        TreeNode::Leaf { value: 200.0 },
        TreeNode::Leaf { value: 300.0 },
      ],
    };
    let forest = ForestModel { trees: vec![tree] };
    forest.validate().unwrap();

    assert_eq!(forest.predict(&[0.5, 0.0, 0.0, 0.0, 0.0, 0.0]), 100.0);
    assert_eq!(forest.predict(&[2.0, 0.0, 0.0, 0.0, 0.0, 0.4]), 200.0);
    assert_eq!(forest.predict(&[2.0, 0.0, 0.0, 0.0, 0.0, 0.9]), 300.0);
  }

  #[test]
  fn forest_prediction_averages_trees() {
    let forest = ForestModel {
      trees: vec![
        Tree { nodes: vec![TreeNode::Leaf { value: 150.0 }] },
        Tree { nodes: vec![TreeNode::Leaf { value: 160.0 }] },
      ],
    };

    assert_eq!(forest.predict(&[0.0; FEATURE_COUNT]), 155.0);
  }

  #[test]
  fn forest_validate_rejects_cycles_and_bad_features() {
    let cyclic = ForestModel {
      trees: vec![Tree {
        nodes: vec![TreeNode::Split {
          feature: 0,
          threshold: 0.0,
          left: 0,
          right: 0,
        }],
      }],
    };
    assert!(cyclic.validate().is_err());

    let bad_feature = ForestModel {
      trees: vec![Tree {
        nodes: vec![
          TreeNode::Split { feature: 6, threshold: 0.0, left: 1, right: 2 },
          TreeNode::Leaf { value: 0.0 },
          TreeNode::Leaf { value: 0.0 },
        ],
      }],
    };
    assert!(bad_feature.validate().is_err());
  }

  #[test]
  fn rul_at_base_temperature() {
    let rul = remaining_useful_life(155.0);
    assert!((rul - 20000.0 / 8760.0).abs() < 1e-12);
    assert!((rul - 2.2831050228310503).abs() < 1e-12);
  }

  #[test]
  fn rul_strictly_decreases_with_temperature() {
    let mut previous = remaining_useful_life(100.0);
    for tenths in 1001..1300 {
      let rul = remaining_useful_life(tenths as f64 / 10.0);
      assert!(rul < previous);
      previous = rul;
    }

    // one halving per 10 degrees
    let above = remaining_useful_life(165.0);
    assert!((above - 1.1415525114155252).abs() < 1e-12);
  }

  #[test]
  #[should_panic(expected = "linear model has no outputs")]
  fn linear_predict_rejects_empty_model() {
    let model = LinearModel { outputs: Vec::new() };
    model.predict(&[0.0; FEATURE_COUNT]);
  }

  #[test]
  #[should_panic(expected = "forest model has no trees")]
  fn forest_predict_rejects_empty_model() {
    let model = ForestModel { trees: Vec::new() };
    model.predict(&[0.0; FEATURE_COUNT]);
  }

  #[test]
  fn mean_of_multiple_outputs() {
    assert_eq!(mean(&[150.0, 160.0]), 155.0);
    assert_eq!(mean(&[42.0]), 42.0);
  }
}
