//! Scenario testing system for deterministic session testing
//!
//! Provides infrastructure for running scripted intents against the
//! controller on a virtual clock to verify game behaviour.

pub mod assertions;
pub mod parser;
pub mod runner;

pub use assertions::{AssertionError, CapturedNotice, SessionState, check_sequence, check_state};
pub use parser::{ExpectedNotice, StartMode, StateAssertion, TestDefinition, TestExpectations, TestSetup, TimedInput};
pub use runner::{TestResult, run_test};

/// Default path for test scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";
