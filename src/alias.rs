use std::collections::BTreeMap;

use log::debug;

use crate::{columns::normalized_map, frame::Frame};

/// Renames columns whose normalised key has a canonical target in `aliases`.
///
/// Only headers change; the returned frame has the same columns and rows. A
/// column already carrying its canonical name is left alone, so a second pass
/// is a no-op.
pub fn apply_aliases(frame: Frame, aliases: &BTreeMap<String, String>) -> Frame {
    let map = normalized_map(&frame.headers);
    let renames = map
        .iter()
        .filter_map(|(key, raw)| {
            aliases
                .get(key)
                .filter(|target| target.as_str() != raw)
                .map(|target| (raw.to_string(), target.clone()))
        })
        .collect::<Vec<_>>();
    if renames.is_empty() {
        return frame;
    }
    for (from, to) in &renames {
        debug!("Alias rename '{from}' -> '{to}'");
    }
    frame.rename_columns(renames.iter().map(|(from, to)| (from.as_str(), to.as_str())))
}
