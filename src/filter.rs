//! Drops pixels that never had a valid observation.

use crate::data::TimeSeriesRecord;

/// True iff at least one `year` sample is nonzero.
///
/// Records without an integer `year` channel pass through so the windowing
/// engine reports the contract violation.
pub fn has_observations(record: &TimeSeriesRecord) -> bool {
    match record.year() {
        Some(years) => years.iter().any(|year| *year != 0),
        None => true,
    }
}
