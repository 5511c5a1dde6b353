//! Lister/Grouper: page through a bucket listing and bucket keys by ship and day.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::contract::{CollaboratorError, ObjectLister, ObjectRecord};
use crate::ships::Ship;

/// Keys need at least this many `/`-separated segments to be considered.
pub const MIN_KEY_SEGMENTS: usize = 4;

/// Grouping key: a ship and a UTC calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub ship: Ship,
    pub date: NaiveDate,
}

/// Object keys per (ship, date), in listing order. Duplicates are kept.
pub type GroupedKeys = BTreeMap<GroupKey, Vec<String>>;

/// The ship a key belongs to, or `None` if the key is too short or the
/// second segment is not a known code.
pub fn ship_for_key(key: &str) -> Option<Ship> {
    let segments: Vec<&str> = key.split('/').collect();
    if segments.len() < MIN_KEY_SEGMENTS {
        return None;
    }
    Ship::from_code(segments[1])
}

/// Where a record lands, if anywhere.
pub fn group_key(record: &ObjectRecord) -> Option<GroupKey> {
    let ship = ship_for_key(&record.key)?;
    let date = record.last_modified.with_timezone(&Utc).date_naive();
    Some(GroupKey { ship, date })
}

/// Add records to `groups`, skipping keys that do not match.
pub fn group_records<I>(groups: &mut GroupedKeys, records: I) -> usize
where
    I: IntoIterator<Item = ObjectRecord>,
{
    let mut accepted = 0;
    for record in records {
        match group_key(&record) {
            Some(key) => {
                groups.entry(key).or_default().push(record.key);
                accepted += 1;
            }
            None => debug!(key = %record.key, "Skipping object key"),
        }
    }
    accepted
}

/// Walk every page of `bucket`/`prefix` and group the matching keys.
///
/// Listing errors are returned as-is; nothing is retried.
pub async fn group_objects<L>(
    lister: &L,
    bucket: &str,
    prefix: &str,
) -> Result<GroupedKeys, CollaboratorError>
where
    L: ObjectLister + ?Sized,
{
    let mut groups = GroupedKeys::new();
    let mut continuation = None;
    let mut pages = 0usize;
    let mut listed = 0usize;
    let mut accepted = 0usize;

    loop {
        let page = lister.list_page(bucket, prefix, continuation).await?;
        pages += 1;
        listed += page.objects.len();
        accepted += group_records(&mut groups, page.objects);
        debug!(page = pages, listed, accepted, "Processed listing page");

        match page.next_token {
            Some(token) => continuation = Some(token),
            None => break,
        }
    }

    info!(
        bucket,
        prefix,
        pages,
        listed,
        accepted,
        groups = groups.len(),
        "Grouped bucket objects"
    );
    Ok(groups)
}
