//! Regression test parameters and operations

use crate::{describe_quads, find_overlap, total_area};
use quadcomp_core::Quad;
use std::fmt::Debug;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Check comparisons quietly (default)
    #[default]
    Compare,
    /// Check comparisons and print what is being compared
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, mode, and success status.
pub struct RegParams {
    /// Name of the test (e.g., "quadtree")
    pub test_name: String,
    /// Current test index (incremented before each comparison)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) -> bool {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
        false
    }

    /// Compare two floating-point values
    ///
    /// Returns `true` if `actual` is within `delta` of `expected`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Compare two quad listings for exact equality, order included
    pub fn compare_quads<V: PartialEq + Debug>(
        &mut self,
        expected: &[Quad<V>],
        actual: &[Quad<V>],
    ) -> bool {
        self.index += 1;

        if self.display() {
            eprintln!("Quads for index {}:\n{}", self.index, describe_quads(actual));
        }

        if expected.len() != actual.len() {
            let msg = format!(
                "Failure in {}_reg: quad comparison for index {} - {} quads expected, got {}",
                self.test_name,
                self.index,
                expected.len(),
                actual.len()
            );
            return self.fail(msg);
        }

        if let Some(pos) = expected.iter().zip(actual).position(|(e, a)| e != a) {
            let msg = format!(
                "Failure in {}_reg: quad comparison for index {} - mismatch at position {}\n\
                 expected = {:?}, actual = {:?}",
                self.test_name, self.index, pos, expected[pos], actual[pos]
            );
            return self.fail(msg);
        }

        true
    }

    /// Check that `quads` tile a `side × side` square exactly
    ///
    /// The areas must add up to `side²` and no two quads may overlap.
    pub fn check_partition<V>(&mut self, quads: &[Quad<V>], side: u32) -> bool {
        self.index += 1;

        let expected = side as u64 * side as u64;
        let area = total_area(quads);
        if area != expected {
            let msg = format!(
                "Failure in {}_reg: partition check for index {} - area {} != {}",
                self.test_name, self.index, area, expected
            );
            return self.fail(msg);
        }

        if let Some((i, j)) = find_overlap(quads) {
            let msg = format!(
                "Failure in {}_reg: partition check for index {} - quads {} and {} overlap",
                self.test_name, self.index, i, j
            );
            return self.fail(msg);
        }

        true
    }

    /// Compare two binary data arrays
    ///
    /// Returns `true` if the data is identical.
    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.index += 1;

        if data1 != data2 {
            let msg = format!(
                "Failure in {}_reg: string comparison for index {}\n\
                 sizes: {} vs {}",
                self.test_name,
                self.index,
                data1.len(),
                data2.len()
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Clean up and report results
    ///
    /// Returns `true` if all comparisons passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all comparisons have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
