//! # Station Directory Parsing
//!
//! The engine's `-ml` listing has no formal grammar. Each station line ends with a
//! `Ref`/`Sub` marker followed by coordinates, padded into columns:
//!
//! ```text
//! Location list generated 2024-06-16 12:00 PDT
//!
//! Name                                              Type Coordinates
//! ------------------------------------------------- ---- ----------------------
//! Botany Bay, Australia                             Ref  33.9833° S, 151.2167° E
//! ```
//!
//! Everything before the first station line is treated as header. Lines after it
//! that fail to parse are kept verbatim in the body so the listing can still be
//! displayed, but they cannot take part in a distance sort.

use crate::{DirectoryLine, LocationDirectory, LocationRecord, StationKind, TideError};

/// Parse a whole `-ml` listing.
///
/// Fails with [`TideError::Parse`] only when not a single line looks like a station.
/// Trailing blank lines are dropped; every other line is kept in order.
pub fn parse_directory(raw: &str) -> Result<LocationDirectory, TideError> {
    let mut lines: Vec<&str> = raw.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let mut directory = LocationDirectory::default();
    for line in lines {
        match parse_location_line(line) {
            Some(record) => directory.body.push(DirectoryLine::Location {
                record,
                raw: line.to_string(),
            }),
            None if directory.body.is_empty() => directory.header.push(line.to_string()),
            None => directory.body.push(DirectoryLine::Other(line.to_string())),
        }
    }

    if directory.body.is_empty() {
        return Err(TideError::Parse);
    }
    Ok(directory)
}

/// Parse a single listing line into a station record.
///
/// The line must end in `<lat>[°] <N|S>, <long>[°] <E|W>` preceded by a `Ref` or
/// `Sub` token. The name is everything before that token, trailing whitespace
/// trimmed. Returns `None` for anything else.
pub fn parse_location_line(line: &str) -> Option<LocationRecord> {
    let line = line.trim_end();

    [StationKind::Reference, StationKind::Subordinate]
        .into_iter()
        .flat_map(|kind| {
            line.match_indices(kind.marker())
                .filter_map(move |(index, _)| parse_after_marker(line, index, kind))
        })
        .max_by_key(|(index, _)| *index)
        .map(|(_, record)| record)
}

fn parse_after_marker(
    line: &str,
    index: usize,
    kind: StationKind,
) -> Option<(usize, LocationRecord)> {
    let before = &line[..index];
    let after = &line[index + kind.marker().len()..];

    // The marker must be a whole token
    if !before.ends_with(char::is_whitespace) || !after.starts_with(char::is_whitespace) {
        return None;
    }

    let name = before.trim_end();
    if name.is_empty() {
        return None;
    }

    let (latitude, longitude) = after.split_once(',')?;
    let latitude = parse_angle(latitude, 'N', 'S', 90.0)?;
    let longitude = parse_angle(longitude, 'E', 'W', 180.0)?;

    Some((
        index,
        LocationRecord {
            name: name.to_string(),
            kind,
            latitude,
            longitude,
        },
    ))
}

/// Parse `33.9833° S` style text into signed radians.
fn parse_angle(text: &str, positive: char, negative: char, limit: f64) -> Option<f64> {
    let text = text.trim();
    let hemisphere = text.chars().last()?;
    let sign = if hemisphere == positive {
        1.0
    } else if hemisphere == negative {
        -1.0
    } else {
        return None;
    };

    let number = text[..text.len() - hemisphere.len_utf8()]
        .trim_end()
        .trim_end_matches('°')
        .trim_end();
    let degrees: f64 = number.parse().ok()?;
    if !(0.0..=limit).contains(&degrees) {
        return None;
    }

    Some(sign * degrees.to_radians())
}
