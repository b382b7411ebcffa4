//! Assertion checking for scenario expectations

use super::parser::{ExpectedNotice, StateAssertion};
use crate::audio::AudioService;
use crate::battle::BattleController;
use crate::events::{BusEvent, EventChannel};

/// Error when an assertion fails
#[derive(Debug)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

/// Published notice with timing info
#[derive(Debug, Clone)]
pub struct CapturedNotice {
    pub at_ms: u64,
    pub topic: String,
    pub text: String,
}

impl CapturedNotice {
    pub fn from_bus_event(event: &BusEvent) -> Self {
        Self {
            at_ms: event.time_ms as u64,
            topic: event.notice.topic().to_string(),
            text: event.notice.payload_text(),
        }
    }
}

/// Check if captured notices match the expected sequence, in order
pub fn check_sequence(expected: &[ExpectedNotice], captured: &[CapturedNotice]) -> Result<(), AssertionError> {
    let mut captured_idx = 0;

    for (i, exp) in expected.iter().enumerate() {
        let found = captured[captured_idx..].iter().enumerate().find(|(_, cap)| {
            cap.topic == exp.topic
                && exp.contains.as_ref().is_none_or(|needle| cap.text.contains(needle.as_str()))
        });

        let label = match &exp.contains {
            Some(needle) => format!("'{}' containing \"{}\"", exp.topic, needle),
            None => format!("'{}'", exp.topic),
        };

        match found {
            Some((offset, cap)) => {
                if let Some(min) = exp.at_min
                    && cap.at_ms < min
                {
                    return Err(AssertionError {
                        message: format!("Notice #{} {} arrived too early", i + 1, label),
                        expected: format!("at >= {} ms", min),
                        actual: format!("at {} ms", cap.at_ms),
                    });
                }
                if let Some(max) = exp.at_max
                    && cap.at_ms > max
                {
                    return Err(AssertionError {
                        message: format!("Notice #{} {} arrived too late", i + 1, label),
                        expected: format!("at <= {} ms", max),
                        actual: format!("at {} ms", cap.at_ms),
                    });
                }
                captured_idx += offset + 1;
            }
            None => {
                return Err(AssertionError {
                    message: format!("Notice #{} {} not found", i + 1, label),
                    expected: format!("{} in sequence", label),
                    actual: format!(
                        "notices after position {}: {:?}",
                        captured_idx,
                        captured[captured_idx..]
                            .iter()
                            .map(|c| format!("{}: {}", c.topic, c.text))
                            .collect::<Vec<_>>()
                    ),
                });
            }
        }
    }

    Ok(())
}

/// Session state for assertions
#[derive(Debug, Clone)]
pub struct SessionState {
    pub player_health: i32,
    pub enemy_health: i32,
    pub is_battling: bool,
    pub turn_in_progress: bool,
    pub current_answer: Option<String>,
    pub choices: usize,
    pub mode: String,
    pub phase: String,
    pub message_index: usize,
    pub combat_index: usize,
    pub pending: usize,
}

impl SessionState {
    pub fn capture<C: EventChannel, A: AudioService>(controller: &BattleController<C, A>) -> Self {
        let game = controller.game();
        let tutorial = controller.tutorial();
        Self {
            player_health: game.player_health,
            enemy_health: game.enemy_health,
            is_battling: game.is_battling,
            turn_in_progress: game.turn_in_progress,
            current_answer: game.current_answer.clone(),
            choices: game.choices.len(),
            mode: controller.mode().to_string(),
            phase: tutorial.phase.to_string(),
            message_index: tutorial.message_index,
            combat_index: tutorial.combat_index,
            pending: controller.pending_continuations(),
        }
    }
}

/// A looked-up value to compare against
enum Value<'a> {
    Int(i64),
    Bool(bool),
    Text(&'a str),
}

impl SessionState {
    fn lookup(&self, path: &str) -> Option<Value<'_>> {
        let value = match path {
            "player.health" => Value::Int(self.player_health as i64),
            "enemy.health" => Value::Int(self.enemy_health as i64),
            "battle.is_battling" => Value::Bool(self.is_battling),
            "battle.turn_in_progress" => Value::Bool(self.turn_in_progress),
            "battle.answer" => Value::Text(self.current_answer.as_deref().unwrap_or("none")),
            "battle.choices" => Value::Int(self.choices as i64),
            "game.mode" => Value::Text(&self.mode),
            "tutorial.phase" => Value::Text(&self.phase),
            "tutorial.message_index" => Value::Int(self.message_index as i64),
            "tutorial.combat_index" => Value::Int(self.combat_index as i64),
            "scheduler.pending" => Value::Int(self.pending as i64),
            _ => return None,
        };
        Some(value)
    }
}

/// Parse a check string into (path, operator, value)
fn parse_check(check: &str) -> Option<(&str, &str, &str)> {
    // Try operators in order of specificity (>= before >, etc.)
    for op in &[">=", "<=", "!=", "=", ">", "<"] {
        if let Some(idx) = check.find(op) {
            let path = check[..idx].trim();
            let value = check[idx + op.len()..].trim();
            return Some((path, op, value));
        }
    }
    None
}

/// Check state assertions against session state
pub fn check_state(assertion: &StateAssertion, state: &SessionState) -> Result<(), AssertionError> {
    for check in &assertion.checks {
        let (path, operator, expected_value) = parse_check(check).ok_or_else(|| AssertionError {
            message: format!("Invalid check syntax: {}", check),
            expected: "format: 'scope.property = value' or 'scope.property > value'".to_string(),
            actual: check.clone(),
        })?;

        let value = state.lookup(path).ok_or_else(|| AssertionError {
            message: format!("Unknown state path '{}'", path),
            expected: "player.health, enemy.health, battle.*, game.mode, tutorial.*, scheduler.pending"
                .to_string(),
            actual: path.to_string(),
        })?;

        match value {
            Value::Int(actual) => check_int_comparison(check, actual, operator, expected_value)?,
            Value::Bool(actual) => {
                check_equality(check, &actual.to_string(), operator, expected_value)?
            }
            Value::Text(actual) => {
                check_equality(check, actual, operator, expected_value.trim_matches('"'))?
            }
        }
    }

    Ok(())
}

fn check_int_comparison(check: &str, actual: i64, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let value: i64 = expected_str.parse().map_err(|_| AssertionError {
        message: format!("Invalid value in {}", check),
        expected: "integer".to_string(),
        actual: expected_str.to_string(),
    })?;

    let pass = match operator {
        ">=" => actual >= value,
        "<=" => actual <= value,
        ">" => actual > value,
        "<" => actual < value,
        "=" => actual == value,
        "!=" => actual != value,
        _ => false,
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {}", check),
            expected: format!("{} {}", operator, value),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

fn check_equality(check: &str, actual: &str, operator: &str, expected: &str) -> Result<(), AssertionError> {
    let pass = match operator {
        "=" => actual == expected,
        "!=" => actual != expected,
        _ => {
            return Err(AssertionError {
                message: format!("Operator '{}' needs a number: {}", operator, check),
                expected: "= or !=".to_string(),
                actual: operator.to_string(),
            });
        }
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {}", check),
            expected: format!("{} {}", operator, expected),
            actual: actual.to_string(),
        });
    }
    Ok(())
}
