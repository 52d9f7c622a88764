pub mod grid;
mod solutions;

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};

pub use solutions::*;

pub type Solution = fn(&str) -> Result<(u64, u64)>;

pub const ALL_SOLUTIONS: &[(usize, Solution)] = &[
    (2, day2 as Solution),
    (3, day3 as Solution),
    (4, day4 as Solution),
];

pub fn load_input(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn input_path(dir: impl AsRef<Path>, day: usize) -> PathBuf {
    dir.as_ref().join(format!("{day}.txt"))
}

pub fn default_input(day: usize) -> Result<String> {
    load_input(input_path("inputs", day))
}

/// Parses a non-empty run of ASCII digits, failing on any other byte or on overflow.
pub fn parse_u64_from_bytes(bytes: &[u8]) -> Result<u64> {
    ensure!(!bytes.is_empty(), "expected a number, found nothing");
    bytes.iter().try_fold(0u64, |acc, &b| {
        ensure!(b.is_ascii_digit(), "unexpected {:?} in number", b as char);
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u64::from(b - b'0')))
            .context("number does not fit in 64 bits")
    })
}
