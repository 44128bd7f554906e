//! Pure half-open interval overlap checks. No I/O happens here; callers load
//! the candidate rows and hand them over as [`Span`]s.

use chrono::{DateTime, Utc};

/// A committed `[start, end)` interval belonging to some row, carried with
/// enough identity to report a conflict back to the caller.
#[derive(Debug, Clone)]
pub struct Span {
    pub id: i64,
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Two half-open intervals `[a, b)` and `[c, d)` overlap iff `a < d && b > c`.
/// Touching endpoints do not overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Returns the first span overlapping `[start, end)`, skipping `exclude` so a
/// record being updated is not compared against itself.
pub fn find_conflict<'a>(
    existing: &'a [Span],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i64>,
) -> Option<&'a Span> {
    existing
        .iter()
        .find(|span| exclude != Some(span.id) && overlaps(span.start, span.end, start, end))
}
