//! Report which regions of a puzzle file can hold their pieces.
//! Usage:
//!
//! ```bash
//! RUST_LOG=info cargo run --release --example pack puzzle.txt
//! ```
//!
//! Pass `--show` after the file name to draw each packing found.

use polyomino_packing::{packing::render, parse_input, Packer};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("puzzle file needed");
        std::process::exit(1);
    }
    let show = args.iter().skip(2).any(|arg| arg == "--show");

    let input = std::fs::read_to_string(&args[1])?;
    let puzzle = parse_input(&input)?;
    let packer = Packer::new(puzzle.shapes)?;

    let mut packable = 0;
    for (index, region) in puzzle.regions.iter().enumerate() {
        let packing = packer.find_packing(region)?;
        println!(
            "Region {} ({}x{}): {}",
            index + 1,
            region.width(),
            region.height(),
            if packing.is_some() { "can pack" } else { "cannot pack" }
        );

        if let Some(packing) = packing {
            packable += 1;
            if show {
                println!("{}\n", render(region, &packing));
            }
        }
    }

    println!("{packable} of {} regions can be packed", puzzle.regions.len());

    Ok(())
}
