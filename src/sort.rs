//! # Directory Sort Orders
//!
//! Three reorderings of a [`LocationDirectory`] body. The header is never touched,
//! no line is added or dropped, and every sort is stable: lines that compare equal
//! keep their relative order. Applying a sort twice gives the same result as once.
//!
//! - [`sort_alphabetical`]: raw line text, case-sensitive
//! - [`sort_by_locality`]: broadest locality first, so every `..., Hawaii` station
//!   ends up next to the others
//! - [`sort_by_distance`]: great-circle distance from an origin, nearest first

use crate::{DirectoryLine, LocationDirectory, TideError};

/// Marker that starts a reference-style annotation in a station name.
const REFERENCE_MARKER: &str = " - read ";

/// Sort the body lexically on the raw line text.
pub fn sort_alphabetical(directory: &mut LocationDirectory) {
    directory.body.sort_by(|a, b| a.raw().cmp(b.raw()));
}

/// Sort the body on [`locality_key`] of each station name.
///
/// Lines that are not stations use their trimmed text as the name.
pub fn sort_by_locality(directory: &mut LocationDirectory) {
    directory.body.sort_by_cached_key(|line| match line {
        DirectoryLine::Location { record, .. } => locality_key(&record.name),
        DirectoryLine::Other(raw) => locality_key(raw.trim()),
    });
}

/// Derive the grouping key for a station name.
///
/// The name is lower-cased and any trailing annotation, either a parenthesized
/// group without commas or a ` - READ ...` suffix, is moved to the front. The
/// remaining comma-separated parts are reversed:
///
/// ```
/// use tide_browser_lib::sort::locality_key;
///
/// assert_eq!(locality_key("Honolulu, Oahu, Hawaii"), "hawaii,oahu,honolulu");
/// assert_eq!(locality_key("Hilo, Hawaii (2)"), "(2),hawaii,hilo");
/// ```
pub fn locality_key(name: &str) -> String {
    let name = name.trim_end().to_lowercase();
    let (rest, annotation) = split_annotation(&name);

    let reversed = rest.split(',').map(str::trim).rev().collect::<Vec<_>>().join(",");

    match annotation {
        Some(annotation) => format!("{annotation},{reversed}"),
        None => reversed,
    }
}

fn split_annotation(name: &str) -> (&str, Option<&str>) {
    if let Some(index) = name.find(REFERENCE_MARKER) {
        return (name[..index].trim_end(), Some(name[index..].trim()));
    }

    if name.ends_with(')') {
        // Leftmost open parenthesis whose tail has no comma
        let open = name
            .match_indices('(')
            .map(|(index, _)| index)
            .find(|&index| !name[index..].contains(','));
        if let Some(open) = open {
            return (name[..open].trim_end(), Some(&name[open..]));
        }
    }

    (name, None)
}

/// Great-circle angular distance in radians between two `(latitude, longitude)`
/// points given in radians, by the haversine formula.
pub fn great_circle_distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, long1) = from;
    let (lat2, long2) = to;

    let haversine = ((lat1 - lat2) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((long1 - long2) / 2.0).sin().powi(2);

    // Rounding can push the term a hair past 1 for antipodal points
    2.0 * haversine.sqrt().min(1.0).asin()
}

/// Sort the body by distance from `origin` (radians), nearest first.
///
/// Every body line must be a station. The first line without coordinates fails
/// the sort with [`TideError::CoordinateParse`] and the directory is left as it was.
pub fn sort_by_distance(
    directory: &mut LocationDirectory,
    origin: (f64, f64),
) -> Result<(), TideError> {
    let distances = directory
        .body
        .iter()
        .map(|line| match line.record() {
            Some(record) => Ok(great_circle_distance(origin, record.coordinates())),
            None => Err(TideError::CoordinateParse {
                line: line.raw().to_string(),
            }),
        })
        .collect::<Result<Vec<f64>, TideError>>()?;

    let mut keyed: Vec<(f64, DirectoryLine)> =
        distances.into_iter().zip(directory.body.drain(..)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    directory.body = keyed.into_iter().map(|(_, line)| line).collect();

    Ok(())
}

/// Sort the body by distance from the named station.
pub fn sort_by_distance_from(
    directory: &mut LocationDirectory,
    station: &str,
) -> Result<(), TideError> {
    let origin = directory
        .find(station)
        .map(|record| record.coordinates())
        .ok_or_else(|| TideError::UnknownLocation(station.to_string()))?;
    sort_by_distance(directory, origin)
}
