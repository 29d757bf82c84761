//! Base-generation cache: a JSON array of [`SolutionRecord`]s.
//!
//! One file may hold records of several instances; each load only picks
//! the records whose `instance_name` matches.

use super::export::SolutionRecord;
use crate::error::Result;
use crate::model::{PackingInstance, Solution};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

fn read_records(path: &Path) -> Result<Vec<SolutionRecord>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Loads the cached individuals of `instance`.
///
/// A missing file yields an empty list. Records of other instances are
/// skipped; records that cannot be re-bound, or that re-bind to an invalid
/// packing, are dropped with a warning.
///
/// # Errors
/// [`PackError::Io`](crate::PackError::Io) if the file exists but cannot
/// be read, [`PackError::Json`](crate::PackError::Json) if it is not an
/// array of solution records.
pub fn load_base_generation(
    path: impl AsRef<Path>,
    instance: &Arc<PackingInstance>,
) -> Result<Vec<Solution>> {
    let path = path.as_ref();
    let records = read_records(path)?;
    let total = records.len();
    let mut solutions = Vec::new();
    for (i, record) in records.into_iter().enumerate() {
        if record.instance_name != instance.name() {
            continue;
        }
        match record.to_solution(instance) {
            Ok(solution) if solution.is_valid() => solutions.push(solution),
            Ok(_) => log::warn!("cache record {i} is not a valid packing, dropped"),
            Err(e) => log::warn!("cache record {i} dropped: {e}"),
        }
    }
    log::debug!(
        "{}: loaded {} of {total} cache records for {}",
        path.display(),
        solutions.len(),
        instance.name()
    );
    Ok(solutions)
}

/// Stores `population` as the cached base generation of its instance.
///
/// Existing records of other instances in the same file are kept; records
/// of this instance are replaced.
pub fn save_base_generation(path: impl AsRef<Path>, population: &[Solution]) -> Result<()> {
    let path = path.as_ref();
    let Some(name) = population.first().map(|s| s.instance().name().to_string()) else {
        return Ok(());
    };
    let mut records: Vec<SolutionRecord> = read_records(path)?
        .into_iter()
        .filter(|r| r.instance_name != name)
        .collect();
    records.extend(population.iter().map(SolutionRecord::from_solution));
    fs::write(path, serde_json::to_string_pretty(&records)?)?;
    Ok(())
}
