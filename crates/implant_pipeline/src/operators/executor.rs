//! Stage wiring and execution.
//!
//! Wiring is a pure function of the enabled flags: [`wire_frontier`] decides
//! where every stage reads its input from, [`execute_all`] then binds and
//! runs the stages in order.

use serde::{Deserialize, Serialize};

use super::{GridOperator, SharedField};

/// How disabled stages and single-stage pipelines are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WiringMode {
  /// Every enabled stage reads the current frontier, including the only
  /// stage of a one-stage pipeline. Disabled stages are skipped entirely:
  /// they neither run nor change their outputs.
  #[default]
  Bypass,

  /// Stages are only rewired when the pipeline has more than one stage, and
  /// every stage runs regardless of its enabled flag. A disabled or unwired
  /// stage runs on whatever input it was bound to before.
  Legacy,
}

/// Where a stage reads its input from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputBinding {
  /// The pipeline input.
  Pipeline,
  /// The output of stage `j`.
  Stage(usize),
  /// Not rewired; the stage keeps its previous input.
  Unbound,
}

/// Result of [`wire_frontier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrontierWiring {
  /// Input binding per stage.
  pub inputs: Vec<InputBinding>,
  /// Frontier after the last stage, i.e. the pipeline result.
  pub output: InputBinding,
}

/// Compute the input of every stage from the stages' enabled flags.
pub fn wire_frontier(enabled: &[bool], mode: WiringMode) -> FrontierWiring {
  let mut inputs = vec![InputBinding::Unbound; enabled.len()];
  let mut frontier = InputBinding::Pipeline;

  let rewire = match mode {
    WiringMode::Bypass => true,
    WiringMode::Legacy => enabled.len() > 1,
  };
  if rewire {
    for (i, _) in enabled.iter().enumerate().filter(|&(_, &on)| on) {
      inputs[i] = frontier;
      frontier = InputBinding::Stage(i);
    }
  }

  FrontierWiring {
    inputs,
    output: frontier,
  }
}

/// Wire and run `stages` on `input`, returning the pipeline result.
pub fn execute_all(
  stages: &mut [GridOperator],
  input: &[SharedField],
  mode: WiringMode,
) -> Vec<SharedField> {
  let enabled: Vec<bool> = stages.iter().map(GridOperator::is_enabled).collect();
  let wiring = wire_frontier(&enabled, mode);

  for i in 0..stages.len() {
    match wiring.inputs[i] {
      InputBinding::Pipeline => stages[i].bind(input.to_vec()),
      // Wired stages always come after their source
      InputBinding::Stage(j) => {
        let upstream = stages[j].out_grids().to_vec();
        stages[i].bind(upstream);
      }
      InputBinding::Unbound => {}
    }

    let run = match mode {
      WiringMode::Bypass => stages[i].is_enabled(),
      WiringMode::Legacy => true,
    };
    if run {
      stages[i].execute();
    } else {
      tracing::debug!(stage = i, kind = %stages[i].kind(), "stage bypassed");
    }
  }

  match wiring.output {
    InputBinding::Stage(j) => stages[j].out_grids().to_vec(),
    InputBinding::Pipeline | InputBinding::Unbound => input.to_vec(),
  }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod executor_test;
