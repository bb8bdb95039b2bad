//! tuneq - Parametric EQ curves from manual edits or LLM filter directives
//!
//! Copyright (C) 2025 Pierre Aubert pierre(at)spinorama(dot)org
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use env_logger::Env;
use std::error::Error;
use std::fs;
use std::io;
use tuneq::cli::{Args, validate_args_or_exit};
use tuneq::env::get_data_generated_dir;
use tuneq::{
    FilterManager, ManipulationOutcome, export, filter_context, parse_manipulation_tags, read,
    strip_manipulation_tags,
};

/// Print the active filters as a table
fn print_filters(manager: &FilterManager) {
    let filters = manager.filters();
    if filters.is_empty() {
        println!("No filters applied.");
        return;
    }
    println!("{:<38} {:<4} {:>10} {:>8} {:>6}", "id", "type", "freq (Hz)", "gain", "Q");
    for filter in filters {
        let fmt_opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
        println!(
            "{:<38} {:<4} {:>10.1} {:>8} {:>6}",
            filter.id(),
            filter.filter_type().short_name(),
            filter.freq(),
            fmt_opt(filter.gain()),
            fmt_opt(filter.q_factor()),
        );
    }
}

fn print_outcome(outcome: &ManipulationOutcome) {
    match outcome {
        ManipulationOutcome::Added(id) => println!("  + added {}", id),
        ManipulationOutcome::Edited(id) => println!("  ~ edited {}", id),
        ManipulationOutcome::Deleted(id) => println!("  - deleted {}", id),
        ManipulationOutcome::Rejected(reason) => println!("  ! rejected: {}", reason),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    validate_args_or_exit(&args);

    let mut manager = FilterManager::new().with_model(args.response_model());

    // Load the measurement
    if args.demo {
        manager.set_original_curve(read::demo_curve());
    } else if let Some(path) = &args.curve {
        let rows = read::load_frequency_response_rows(path)?;
        let summary = manager.set_original_data(&rows)?;
        if summary.skipped_rows > 0 {
            log::warn!("{} rows could not be parsed and are kept unchanged", summary.skipped_rows);
        }
    }

    for params in &args.filters {
        if manager.add_filter(*params).is_none() {
            log::warn!("filter {:?} was not added", params);
        }
    }

    if let Some(path) = &args.directives {
        let reply = fs::read_to_string(path)?;
        let manipulations = parse_manipulation_tags(&reply);
        let text = strip_manipulation_tags(&reply);
        if !text.is_empty() {
            println!("{}\n", text);
        }
        println!("Applying {} directive(s):", manipulations.len());
        for outcome in manager.apply_manipulations(&manipulations) {
            print_outcome(&outcome);
        }
        println!();
    }

    if args.print_context {
        println!("{}", filter_context(manager.filters()));
        return Ok(());
    }

    print_filters(&manager);

    let processed = manager
        .processed_curve()
        .ok_or("no processed curve available")?;
    match &args.output {
        Some(path) => export::write_curve_csv(path, processed)?,
        None => match get_data_generated_dir() {
            Ok(dir) => export::write_curve_csv(&dir.join("processed.csv"), processed)?,
            Err(e) => {
                log::debug!("{}, writing to stdout", e);
                export::write_curve(io::stdout().lock(), processed)?;
            }
        },
    }

    if let Some(path) = &args.snapshot {
        export::write_snapshot_json(path, &manager.snapshot())?;
        log::info!("wrote snapshot to {}", path.display());
    }

    Ok(())
}
