//! TOML scenario file parsing

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Complete scenario definition from TOML file
#[derive(Debug, Deserialize)]
pub struct TestDefinition {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub setup: TestSetup,
    #[serde(default)]
    pub input: Vec<TimedInput>,
    #[serde(default)]
    pub expect: TestExpectations,
}

/// How the session starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    /// Begin the tutorial scene
    #[default]
    Tutorial,
    /// Call start_battle directly
    Battle,
}

/// Scenario setup
#[derive(Debug, Default, Deserialize)]
pub struct TestSetup {
    pub seed: Option<u64>,
    #[serde(default)]
    pub start: StartMode,
}

/// Placeholder payloads resolved against the pending battle answer
pub const CORRECT_PLACEHOLDER: &str = "$correct";
pub const WRONG_PLACEHOLDER: &str = "$wrong";

/// An intent posted at a point in virtual time
#[derive(Debug, Clone, Deserialize)]
pub struct TimedInput {
    pub at_ms: u64,
    pub topic: String,
    pub value: Option<String>,
}

/// Expected scenario outcomes
#[derive(Debug, Default, Deserialize)]
pub struct TestExpectations {
    #[serde(default)]
    pub sequence: Vec<ExpectedNotice>,
    /// Multiple state assertions at different times (uses [[expect.state]] TOML syntax)
    #[serde(default)]
    pub state: Vec<StateAssertion>,
}

/// Expected notice in sequence
#[derive(Debug, Deserialize)]
pub struct ExpectedNotice {
    pub topic: String,
    /// Substring of the rendered payload
    pub contains: Option<String>,
    pub at_min: Option<u64>,
    pub at_max: Option<u64>,
}

/// State assertion at a point in time
#[derive(Debug, Clone, Deserialize)]
pub struct StateAssertion {
    pub after_ms: u64,
    #[serde(default)]
    pub checks: Vec<String>,
}

/// Parse a scenario file from path
pub fn parse_test_file(path: &Path) -> Result<TestDefinition, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}
