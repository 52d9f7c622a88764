use anyhow::{ensure, Context, Result};
use log::trace;

use crate::grid::{self, ErosionRules, Grid, RoundObserver};
use crate::parse_u64_from_bytes;

pub fn day2(input: &str) -> Result<(u64, u64)> {
    let input = input.trim();
    ensure!(!input.is_empty(), "no input provided");

    let mut sum_part1 = 0;
    let mut sum_part2 = 0;

    for range in input.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        let (start, end) = range
            .split_once('-')
            .with_context(|| format!("range {range:?} has no '-'"))?;
        let start = parse_u64_from_bytes(start.trim().as_bytes()).with_context(|| format!("range {range:?}"))?;
        let end = parse_u64_from_bytes(end.trim().as_bytes()).with_context(|| format!("range {range:?}"))?;
        ensure!(start <= end, "range {range:?} ends before it starts");
        trace!("scanning {start}..={end}");

        for id in start..=end {
            if is_doubled(id) {
                sum_part1 = add_id(sum_part1, id)?;
            }
            if is_repeated(id) {
                sum_part2 = add_id(sum_part2, id)?;
            }
        }
    }

    Ok((sum_part1, sum_part2))
}

fn add_id(sum: u64, id: u64) -> Result<u64> {
    sum.checked_add(id)
        .with_context(|| format!("sum of invalid ids overflows 64 bits at id {id}"))
}

fn digit_count(n: u64) -> u32 {
    n.checked_ilog10().map_or(1, |log| log + 1)
}

/// `1`, followed by `block - 1` zeros, `repeats` times over (e.g. `10101` for 2, 3).
/// Multiplying a `block`-digit number by it writes the number out `repeats` times.
fn repunit(block: u32, repeats: u32) -> u64 {
    let shift = 10u64.pow(block);
    (0..repeats).fold(0, |acc, _| acc * shift + 1)
}

/// Some digit sequence written exactly twice: `55`, `6464`, `123123`.
fn is_doubled(id: u64) -> bool {
    let len = digit_count(id);
    len % 2 == 0 && id % repunit(len / 2, 2) == 0
}

/// Some digit sequence written at least twice: `111`, `12341234`, `1212121212`.
fn is_repeated(id: u64) -> bool {
    let len = digit_count(id);
    (1..=len / 2).any(|block| len % block == 0 && id % repunit(block, len / block) == 0)
}

pub fn day3(input: &str) -> Result<(u64, u64)> {
    let mut sum_part1 = 0;
    let mut sum_part2 = 0;

    for (i, bank) in input.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
        let bank = bank.as_bytes();
        sum_part1 += max_joltage(bank, 2).with_context(|| format!("bank {i}"))?;
        sum_part2 += max_joltage(bank, 12).with_context(|| format!("bank {i}"))?;
    }

    Ok((sum_part1, sum_part2))
}

/// Largest number spelled by `count` digits of `bank`, kept in their original order.
fn max_joltage(bank: &[u8], count: usize) -> Result<u64> {
    ensure!(bank.iter().all(u8::is_ascii_digit), "bank contains a non-digit");
    ensure!(
        bank.len() >= count,
        "bank has {} batteries, need {count}",
        bank.len()
    );

    // Monotonic stack: a digit evicts smaller ones before it while there are
    // still digits we are allowed to skip.
    let mut skippable = bank.len() - count;
    let mut kept = Vec::with_capacity(bank.len());
    for &digit in bank {
        while skippable > 0 && kept.last().is_some_and(|&top| top < digit) {
            kept.pop();
            skippable -= 1;
        }
        kept.push(digit);
    }
    kept.truncate(count);

    parse_u64_from_bytes(&kept)
}

pub fn day4(input: &str) -> Result<(u64, u64)> {
    day4_with(input, &mut ())
}

/// Day 4 with `observer` attached to the erosion simulation of part 2.
pub fn day4_with<O: RoundObserver + ?Sized>(input: &str, observer: &mut O) -> Result<(u64, u64)> {
    let grid = Grid::parse(input).context("malformed grid")?;

    let accessible = grid::count_accessible_rolls(&grid);
    let erosion = grid::simulate_with(grid, &ErosionRules::DEFAULT, observer);

    Ok((accessible as u64, erosion.removed as u64))
}
