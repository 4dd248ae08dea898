//! Relocating line activity after a document's line count changes.
//!
//! There are no stable line ids, so each record is re-anchored by content.
//! A record stays where it is when its line and both neighbours are
//! unchanged, follows a single document-wide shift of `delta` lines when its
//! neighbourhood reappears displaced by that amount, and otherwise tries the
//! two lines around the shifted index before being dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{DocumentEntry, DocumentSnapshot, LineActivity};

/// Outcome counters for one remap pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapStats {
    /// New line count minus old line count.
    pub delta: isize,

    /// Records left at their index.
    pub kept: usize,

    /// Records moved by `delta`.
    pub shifted: usize,

    /// Records found next to the shifted index.
    pub rescued: usize,

    /// Records that could not be placed.
    pub dropped: usize,

    /// Whether the pass committed to the shift hypothesis.
    pub shift_committed: bool,
}

/// Compare two lines, ignoring line-ending characters.
pub fn lines_match(a: &str, b: &str) -> bool {
    fn content(line: &str) -> impl Iterator<Item = char> + '_ {
        line.chars().filter(|c| !matches!(c, '\r' | '\n'))
    }
    content(a).eq(content(b))
}

fn line_at(lines: &[String], index: isize) -> Option<&str> {
    usize::try_from(index)
        .ok()
        .and_then(|index| lines.get(index))
        .map(String::as_str)
}

/// Whether old line `old_index` reappears unchanged at `new_index`, together
/// with its immediate neighbours.
///
/// Both indices must be in range. A neighbour missing on either side is
/// ignored. Neighbours are compared directly, never through another
/// stability check.
pub fn is_stable(old: &[String], new: &[String], old_index: usize, new_index: usize) -> bool {
    let (Some(old_line), Some(new_line)) = (old.get(old_index), new.get(new_index)) else {
        return false;
    };
    if !lines_match(old_line, new_line) {
        return false;
    }

    [-1isize, 1].into_iter().all(|offset| {
        let old_neighbour = line_at(old, old_index as isize + offset);
        let new_neighbour = line_at(new, new_index as isize + offset);
        match (old_neighbour, new_neighbour) {
            (Some(a), Some(b)) => lines_match(a, b),
            _ => true,
        }
    })
}

/// Look for `text` right above, then right below, the guessed index.
///
/// The line above clamps to 0; the line below wraps to 0 when it falls past
/// the end of the document.
fn neighbour_match(new: &[String], text: &str, guess: isize) -> Option<usize> {
    let upper = (guess - 1).max(0);
    let lower = if guess + 1 < 0 || guess + 1 >= new.len() as isize {
        0
    } else {
        guess + 1
    };

    [upper, lower].into_iter().find_map(|candidate| {
        line_at(new, candidate)
            .filter(|line| lines_match(line, text))
            .map(|_| candidate as usize)
    })
}

/// Relocate every record of `entry` onto `new_lines` and adopt them as the
/// document's snapshot.
///
/// Records are processed in ascending line order. Once one record follows
/// the shift, the remaining records no longer try to stay in place. When two
/// records land on the same index, the first one placed wins.
pub fn remap(entry: &mut DocumentEntry, new_lines: &[String]) -> RemapStats {
    let old_snapshot = std::mem::take(&mut entry.snapshot);
    let previous = std::mem::take(&mut entry.activity);
    let old = old_snapshot.lines();
    let delta = new_lines.len() as isize - old.len() as isize;

    let mut stats = RemapStats {
        delta,
        ..RemapStats::default()
    };
    let mut relocated: BTreeMap<usize, LineActivity> = BTreeMap::new();

    for (line, record) in previous {
        let guess = line as isize + delta;
        let stays = !stats.shift_committed && is_stable(old, new_lines, line, line);
        let follows = usize::try_from(guess)
            .ok()
            .filter(|target| is_stable(old, new_lines, line, *target));

        let target = if stays {
            stats.kept += 1;
            Some(line)
        } else if let Some(target) = follows {
            stats.shift_committed = true;
            stats.shifted += 1;
            Some(target)
        } else if let Some(target) = neighbour_match(new_lines, &record.text, guess) {
            stats.rescued += 1;
            Some(target)
        } else {
            None
        };

        match target {
            Some(target) if !relocated.contains_key(&target) => {
                relocated.insert(target, record);
            }
            Some(target) => {
                debug!("Dropping line {line}: index {target} already taken");
                stats.dropped += 1;
            }
            None => {
                debug!("Dropping line {line}: no match for {:?}", record.text);
                stats.dropped += 1;
            }
        }
    }

    entry.activity = relocated;
    entry.snapshot = DocumentSnapshot::new(new_lines.to_vec());

    debug!("Remapped {} records ({stats:?})", entry.activity.len());

    stats
}
