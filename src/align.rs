//! Intersect two tables on normalised column names.

use itertools::Itertools;

use crate::{
    columns::{NameMap, normalized_map},
    error::ReconcileError,
    frame::Frame,
};

/// Restricts `left` and `right` to the columns they share (by normalised key)
/// and renames those columns to the key, in key order, so both results carry the
/// same header row.
///
/// `left_label`/`right_label` only name the tables in the error.
pub fn intersect_and_align(
    left: &Frame,
    right: &Frame,
    left_label: &str,
    right_label: &str,
) -> Result<(Frame, Frame), ReconcileError> {
    let left_map = normalized_map(&left.headers);
    let right_map = normalized_map(&right.headers);
    let shared = left_map
        .keys()
        .filter(|key| right_map.contains_key(key))
        .sorted()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if shared.is_empty() {
        return Err(ReconcileError::Alignment {
            left: left_label.to_string(),
            right: right_label.to_string(),
        });
    }

    let left_aligned = project(left, &left_map, &shared);
    let right_aligned = project(right, &right_map, &shared);
    Ok((left_aligned, right_aligned))
}

fn project(frame: &Frame, map: &NameMap, keys: &[String]) -> Frame {
    let indices = keys
        .iter()
        .filter_map(|key| map.get(key).and_then(|raw| frame.column_index(raw)))
        .collect::<Vec<_>>();
    frame.select(&indices, keys.to_vec())
}
