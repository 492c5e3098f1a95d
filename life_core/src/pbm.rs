//! Plain PBM (`P1`) snapshots.
//!
//! ```text
//! P1
//! # generation=12  alive=40
//! <cols> <rows>
//! 0 1 0 ...
//! ```
//!
//! One file per checkpoint or frame; any PBM viewer can display them.

use crate::error::CoreError;
use crate::grid::Grid;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// A grid read back from disk, with the generation recorded in its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub generation: u64,
    pub grid: Grid,
}

/// Writes `grid` in plain PBM form.
pub fn write<W: Write>(mut out: W, grid: &Grid, generation: u64) -> Result<(), CoreError> {
    writeln!(out, "P1")?;
    writeln!(out, "# generation={}  alive={}", generation, grid.population())?;
    writeln!(out, "{} {}", grid.cols(), grid.rows())?;
    for r in 0..grid.rows() {
        let line: Vec<String> = grid.row_bits(r).iter().map(u8::to_string).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()?;
    Ok(())
}

/// Saves `grid` to `path`, replacing any existing file.
pub fn save<P: AsRef<Path>>(path: P, grid: &Grid, generation: u64) -> Result<(), CoreError> {
    let file = File::create(path)?;
    write(BufWriter::new(file), grid, generation)
}

/// Parses a plain PBM snapshot. A missing `generation=` comment reads as
/// generation 0.
pub fn read<R: Read>(mut input: R) -> Result<Snapshot, CoreError> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;

    let mut generation = 0;
    let mut tokens = Vec::new();
    for line in text.lines() {
        let (content, comment) = match line.split_once('#') {
            Some((content, comment)) => (content, Some(comment)),
            None => (line, None),
        };
        if let Some(value) = comment.and_then(header_generation) {
            generation = value;
        }
        tokens.extend(content.split_whitespace());
    }

    let mut tokens = tokens.into_iter();
    match tokens.next() {
        Some("P1") => {}
        Some(other) => return Err(CoreError::pbm(format!("unsupported magic {:?}", other))),
        None => return Err(CoreError::pbm("empty file")),
    }

    let mut dimension = |name: &str| -> Result<usize, CoreError> {
        tokens
            .next()
            .ok_or_else(|| CoreError::pbm(format!("missing {}", name)))?
            .parse()
            .map_err(|_| CoreError::pbm(format!("invalid {}", name)))
    };
    let cols = dimension("width")?;
    let rows = dimension("height")?;
    Grid::check_size(rows, cols)?;

    // Plain PBM allows cells without separating whitespace.
    let bits = tokens
        .flat_map(str::chars)
        .map(|ch| match ch {
            '0' => Ok(0),
            '1' => Ok(1),
            other => Err(CoreError::pbm(format!("invalid cell {:?}", other))),
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let grid = Grid::from_bits(rows, cols, &bits)?;
    Ok(Snapshot { generation, grid })
}

/// Loads a snapshot from `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Snapshot, CoreError> {
    read(File::open(path)?)
}

fn header_generation(comment: &str) -> Option<u64> {
    comment
        .split_whitespace()
        .find_map(|field| field.strip_prefix("generation="))
        .and_then(|value| value.parse().ok())
}
