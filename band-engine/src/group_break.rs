//! FILENAME: band-engine/src/group_break.rs
//! PURPOSE: Finds the shallowest group level at which two key tuples differ.
//! CONTEXT: The driving cursor is sorted by the group key tuple, so a change
//! at level L closes levels L..deepest and reopens them. Only key values are
//! compared; every other attribute of the records is irrelevant.

use smallvec::SmallVec;
use report_model::Value;
use crate::error::GroupKeyError;

/// A group key tuple, one value per level, outermost first.
pub type GroupKey = SmallVec<[Value; 4]>;

/// Per-level key equality supplied by the caller.
pub trait KeyComparer {
    /// Returns whether two key components at `level` are equal,
    /// or an error if they cannot be compared at all.
    fn equal(&self, level: usize, previous: &Value, current: &Value) -> Result<bool, GroupKeyError>;
}

/// Value equality for numeric, text, boolean and date keys.
/// Empty equals only Empty; NaN equals NaN. Two non-empty values of
/// different types are incomparable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueComparer;

impl KeyComparer for ValueComparer {
    fn equal(&self, level: usize, previous: &Value, current: &Value) -> Result<bool, GroupKeyError> {
        if previous.is_empty() || current.is_empty() {
            return Ok(previous.is_empty() && current.is_empty());
        }
        match previous.compare(current) {
            Some(ordering) => Ok(ordering.is_eq()),
            None => Err(GroupKeyError::incomparable(level, previous, current)),
        }
    }
}

static MISSING: Value = Value::Empty;

/// Compares the first `level_count` components of two key tuples.
///
/// Returns the shallowest level whose components differ, or None when all
/// compared levels are equal. Missing components compare as `Empty`.
pub fn detect_break(
    previous: &[Value],
    current: &[Value],
    level_count: usize,
    comparer: &dyn KeyComparer,
) -> Result<Option<usize>, GroupKeyError> {
    for level in 0..level_count {
        let prev = previous.get(level).unwrap_or(&MISSING);
        let curr = current.get(level).unwrap_or(&MISSING);
        if !comparer.equal(level, prev, curr)? {
            return Ok(Some(level));
        }
    }
    Ok(None)
}
