//! Scenario runner CLI
//!
//! Usage:
//!   cargo run --bin test-scenarios                    # Run every scenario
//!   cargo run --bin test-scenarios -- tutorial/       # Run one category
//!   cargo run --bin test-scenarios -- battle/victory  # Run one scenario
//!   cargo run --bin test-scenarios -- --verbose       # Descriptions and full failure details

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use vibrato::testing::{SCENARIOS_DIR, TestResult, parser::parse_test_file, runner::run_test};

#[derive(Default)]
struct Tally {
    passed: usize,
    failed: Vec<String>,
    errors: Vec<String>,
}

impl Tally {
    fn record(&mut self, label: &str, result: &TestResult) {
        match result {
            TestResult::Pass { .. } => self.passed += 1,
            TestResult::Fail { .. } => self.failed.push(label.to_string()),
            TestResult::Error { .. } => self.errors.push(label.to_string()),
        }
    }

    fn ok(&self) -> bool {
        self.failed.is_empty() && self.errors.is_empty()
    }
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let filter = args.iter().find(|a| !a.starts_with('-')).cloned();

    let root = Path::new(SCENARIOS_DIR);
    if !root.is_dir() {
        eprintln!("No scenarios directory at {}", SCENARIOS_DIR);
        std::process::exit(1);
    }

    let scenarios = find_scenarios(root, filter.as_deref());
    if scenarios.is_empty() {
        eprintln!(
            "No scenarios matched{}",
            filter.map(|f| format!(" '{}'", f)).unwrap_or_default()
        );
        std::process::exit(1);
    }

    println!("Running {} scenario(s) from {}\n", scenarios.len(), SCENARIOS_DIR);

    let mut tally = Tally::default();
    for path in &scenarios {
        let label = path
            .strip_prefix(root)
            .unwrap_or(path)
            .with_extension("")
            .to_string_lossy()
            .to_string();

        let result = match parse_test_file(path) {
            Ok(def) => {
                if verbose && let Some(description) = &def.description {
                    println!("  # {}", description);
                }
                run_test(&def)
            }
            Err(message) => TestResult::Error { message },
        };

        report(&label, &result, verbose);
        tally.record(&label, &result);
    }

    println!(
        "\n{} passed, {} failed, {} errors",
        tally.passed,
        tally.failed.len(),
        tally.errors.len()
    );
    for label in tally.failed.iter().chain(&tally.errors) {
        println!("  - {}", label);
    }

    if !tally.ok() {
        std::process::exit(1);
    }
}

/// Every .toml file under `root` whose relative path contains `filter`
fn find_scenarios(root: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|e| e.path()) {
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            if path.extension().is_none_or(|e| e != "toml") {
                continue;
            }
            let rel = path.strip_prefix(root).unwrap_or(&path).to_string_lossy().to_string();
            if filter.is_none_or(|f| rel.contains(f)) {
                found.push(path);
            }
        }
    }

    found.sort();
    found
}

fn report(label: &str, result: &TestResult, verbose: bool) {
    let width = 44usize.saturating_sub(label.len()).max(2);
    let dots = ".".repeat(width);

    match result {
        TestResult::Pass { elapsed_ms } => {
            println!("  {} {} PASS ({} ms virtual)", label, dots, elapsed_ms);
        }
        TestResult::Fail { error } => {
            println!("  {} {} FAIL", label, dots);
            if verbose {
                println!("    {}", error);
            } else {
                println!("    {}", error.message);
            }
        }
        TestResult::Error { message } => {
            println!("  {} {} ERROR", label, dots);
            println!("    {}", message);
        }
    }
}
