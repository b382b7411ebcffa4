//! Scenario execution engine
//!
//! Runs a controller with an in-memory bus and recording audio, stepping a
//! virtual clock in fixed increments so turn delays play out without any
//! real waiting.

use std::time::Duration;

use crate::audio::RecordingAudio;
use crate::battle::BattleController;
use crate::events::{EventBus, Intent};
use crate::tuning::BattleTuning;

use super::assertions::{AssertionError, CapturedNotice, SessionState, check_sequence, check_state};
use super::parser::{CORRECT_PLACEHOLDER, StartMode, TestDefinition, WRONG_PLACEHOLDER};

/// Virtual milliseconds per step
pub const STEP_MS: u64 = 10;

/// Seed used when a scenario does not name one
pub const DEFAULT_SEED: u64 = 0x5eed;

type ScenarioController = BattleController<EventBus, RecordingAudio>;

/// Result of running a scenario
#[derive(Debug)]
pub enum TestResult {
    Pass { elapsed_ms: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

/// Run a single scenario and return the result
pub fn run_test(test: &TestDefinition) -> TestResult {
    let seed = test.setup.seed.unwrap_or(DEFAULT_SEED);
    let mut controller = BattleController::with_seed(EventBus::new(), RecordingAudio::new(), seed)
        .with_tuning(BattleTuning::default());

    match test.setup.start {
        StartMode::Tutorial => controller.begin(),
        StartMode::Battle => controller.start_battle(),
    }

    let mut inputs = test.input.clone();
    inputs.sort_by_key(|input| input.at_ms);

    let mut state_checks = test.expect.state.clone();
    state_checks.sort_by_key(|check| check.after_ms);

    // Run until the last input or check, plus one turn for trailing notices
    let end_ms = inputs
        .last()
        .map(|i| i.at_ms)
        .into_iter()
        .chain(state_checks.last().map(|c| c.after_ms))
        .chain(test.expect.sequence.iter().filter_map(|e| e.at_max))
        .max()
        .unwrap_or(0);

    let mut captured: Vec<CapturedNotice> = Vec::new();
    let mut next_input = 0;
    let mut next_check = 0;
    let mut now_ms: u64 = 0;

    loop {
        controller.channel_mut().set_elapsed_ms(now_ms as u32);
        if now_ms > 0 {
            controller.update(Duration::from_millis(STEP_MS));
        }

        while next_input < inputs.len() && inputs[next_input].at_ms <= now_ms {
            let input = &inputs[next_input];
            let intent = match resolve_intent(&controller, &input.topic, input.value.as_deref()) {
                Ok(intent) => intent,
                Err(message) => {
                    return TestResult::Error {
                        message: format!("Input at {} ms: {}", input.at_ms, message),
                    };
                }
            };
            controller.channel_mut().post(intent);
            // One at a time so placeholders see the state left by earlier inputs
            controller.pump();
            next_input += 1;
        }

        captured.extend(
            controller
                .channel_mut()
                .drain()
                .iter()
                .map(CapturedNotice::from_bus_event),
        );

        while next_check < state_checks.len() && state_checks[next_check].after_ms <= now_ms {
            let state = SessionState::capture(&controller);
            if let Err(error) = check_state(&state_checks[next_check], &state) {
                return TestResult::Fail { error };
            }
            next_check += 1;
        }

        if now_ms >= end_ms {
            break;
        }
        now_ms += STEP_MS;
    }

    if let Err(error) = check_sequence(&test.expect.sequence, &captured) {
        return TestResult::Fail { error };
    }

    TestResult::Pass { elapsed_ms: now_ms }
}

/// Build the intent for a scripted input, filling in answer placeholders
fn resolve_intent(
    controller: &ScenarioController,
    topic: &str,
    value: Option<&str>,
) -> Result<Intent, String> {
    let answer = controller.game().current_answer.as_deref();
    let resolved = match value {
        Some(CORRECT_PLACEHOLDER) => Some(
            answer
                .ok_or_else(|| format!("{} used with no question pending", CORRECT_PLACEHOLDER))?
                .to_string(),
        ),
        Some(WRONG_PLACEHOLDER) => {
            let answer = answer
                .ok_or_else(|| format!("{} used with no question pending", WRONG_PLACEHOLDER))?;
            let wrong = controller
                .spellbook()
                .names()
                .into_iter()
                .find(|name| name != answer)
                .ok_or("spellbook has no wrong answer to give")?;
            Some(wrong)
        }
        other => other.map(str::to_string),
    };
    Intent::from_topic(topic, resolved.as_deref())
}
