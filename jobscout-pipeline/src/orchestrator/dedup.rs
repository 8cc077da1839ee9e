//! Duplicate collapse across provider result sets.

use crate::types::JobRecord;
use std::collections::HashSet;

/// Reduces the merged collection to one record per identity, keeping the
/// first occurrence in collection order.
///
/// A record is a duplicate when its `job_id` or its non-empty `link` has
/// already been accepted. Tracking both catches the cross-provider case
/// where two boards list the same posting URL under different internal
/// ids. Only survivors register their keys, so a dropped record can never
/// shadow a later distinct one.
pub(crate) fn dedup_records(records: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_links: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        let id_seen = record
            .job_id
            .as_ref()
            .is_some_and(|id| seen_ids.contains(id));
        if id_seen || seen_links.contains(&record.link) {
            continue;
        }
        if let Some(id) = &record.job_id {
            seen_ids.insert(id.clone());
        }
        // An absent link is no identity; records without one never collide.
        if !record.link.is_empty() {
            seen_links.insert(record.link.clone());
        }
        unique.push(record);
    }
    unique
}
