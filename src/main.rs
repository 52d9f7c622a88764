use std::{
    fmt::Display,
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use aoc2025::{day4_with, grid::GridPrinter, input_path, load_input, Solution, ALL_SOLUTIONS};

/// Advent of Code 2025 solutions
#[derive(Parser, Debug)]
#[command(name = "aoc2025", version)]
struct Args {
    /// Day to run (runs every solved day if omitted)
    #[arg(short, long)]
    day: Option<usize>,

    /// Input file for the selected day, instead of `<inputs-dir>/<day>.txt`
    #[arg(short, long, requires = "day")]
    input: Option<PathBuf>,

    /// Directory holding one `<day>.txt` file per day
    #[arg(long, default_value = "inputs")]
    inputs_dir: PathBuf,

    /// Print the grid after every erosion round of day 4
    #[arg(long)]
    print_grids: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let days: Vec<(usize, Solution)> = match args.day {
        Some(n) => vec![*ALL_SOLUTIONS
            .iter()
            .find(|(day, _)| *day == n)
            .with_context(|| format!("no solution for day {n}"))?],
        None => ALL_SOLUTIONS.to_vec(),
    };

    let mut total = Duration::default();
    for (n, day) in days {
        let path = match &args.input {
            Some(path) => path.clone(),
            None => input_path(&args.inputs_dir, n),
        };
        info!("day {n}: reading {}", path.display());
        let input = load_input(&path)?;

        total += if n == 4 && args.print_grids {
            execute_day(n, day4_printed, &input)?
        } else {
            execute_day(n, day, &input)?
        };
    }
    println!("Total processing time: {}", format_duration(total));
    Ok(())
}

fn day4_printed(input: &str) -> Result<(u64, u64)> {
    let mut printer = GridPrinter::new(io::stdout().lock());
    let answers = day4_with(input, &mut printer)?;
    printer.finish().context("failed to print grids")?;
    Ok(answers)
}

fn format_duration(dur: Duration) -> String {
    if dur.as_millis() != 0 {
        format!("{} ms", dur.as_millis())
    } else {
        format!("{} us", dur.as_micros())
    }
}

fn execute_day<S: Display, T: Display>(
    n: usize,
    f: fn(&str) -> Result<(S, T)>,
    input: &str,
) -> Result<Duration> {
    println!("Day {}:", n);

    let start = Instant::now();
    let (part1, part2) = f(input).with_context(|| format!("day {n} failed"))?;
    let elapsed = start.elapsed();

    println!("  Part 1: {}", part1);
    println!("  Part 2: {}", part2);
    println!("  Finished in {}", format_duration(elapsed));
    println!("---------------------");
    Ok(elapsed)
}
