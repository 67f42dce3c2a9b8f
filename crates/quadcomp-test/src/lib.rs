//! quadcomp-test - Regression test framework for quadcomp
//!
//! This crate provides a small regression test harness, supporting two modes:
//!
//! - **Compare**: Check every recorded comparison (default)
//! - **Display**: Also print the quad listings being compared
//!
//! Together with synthetic raster generators, so tests never depend on image
//! files, and partition checks shared by every tree test.
//!
//! # Usage
//!
//! ```ignore
//! use quadcomp_test::RegParams;
//!
//! let mut rp = RegParams::new("quadtree");
//! rp.compare_values(10.0, quads.len() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod params;
pub mod synth;

pub use params::{RegParams, RegTestMode};
pub use synth::{blocks, checkerboard, gradient, scenario_4x4};

use quadcomp_core::Quad;

/// Sum of the areas of `quads`
pub fn total_area<V>(quads: &[Quad<V>]) -> u64 {
    quads.iter().map(Quad::area).sum()
}

/// Indices of the first pair of overlapping quads, if any
pub fn find_overlap<V>(quads: &[Quad<V>]) -> Option<(usize, usize)> {
    for (i, a) in quads.iter().enumerate() {
        for (j, b) in quads.iter().enumerate().skip(i + 1) {
            if a.rect().overlaps(&b.rect()) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Render a quad listing, one `x_min,x_max,y_min,y_max => value` per line
pub fn describe_quads<V: std::fmt::Debug>(quads: &[Quad<V>]) -> String {
    quads
        .iter()
        .map(|q| {
            format!(
                "{},{},{},{} => {:?}\n",
                q.x_min, q.x_max, q.y_min, q.y_max, q.value
            )
        })
        .collect()
}
