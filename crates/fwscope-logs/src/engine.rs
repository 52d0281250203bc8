use std::cmp::Reverse;

use fwscope_types::{FirewallLog, LogFilters};

use crate::timestamp::sort_key;

/// Merge, filter, sort and limit two log batches
///
/// `new_logs` are placed before `current_logs` and the sort is stable, so on
/// equal (or missing) timestamps records from the new batch come first.
/// Never fails: missing fields simply don't match a set criterion, and bad
/// timestamps order as the Unix epoch.
pub fn process_logs(
    new_logs: Vec<FirewallLog>,
    current_logs: Vec<FirewallLog>,
    filters: &LogFilters,
    limit: usize,
) -> Vec<FirewallLog> {
    if limit == 0 {
        return Vec::new();
    }

    let mut keyed: Vec<(i64, FirewallLog)> = new_logs
        .into_iter()
        .chain(current_logs)
        .filter(|log| filters.matches(log))
        .map(|log| (sort_key(&log), log))
        .collect();

    // Stable, so new-batch records stay ahead on equal keys
    keyed.sort_by_key(|(key, _)| Reverse(*key));
    keyed.truncate(limit);

    keyed.into_iter().map(|(_, log)| log).collect()
}
