//! Utility functions and helpers
//!
//! This module provides various utility functions and helpers used throughout the codebase.

pub mod string;

pub use string::StringUtils;

use std::time::Instant;
use log::debug;

/// Measure execution time of a closure
pub fn measure_time<F, T>(name: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    debug!("{} took {}ms", name, elapsed.as_millis());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_time() {
        let result = measure_time("sum", || (1..=10).sum::<i32>());
        assert_eq!(result, 55);
    }
}
