//! Text rendering of node metadata
//!
//! The detail block's field set and order are fixed; downstream display
//! and parity checks compare against it verbatim.

use chrono::DateTime;

use crate::mirror::NodeRecord;
use crate::remote::NodeStat;

const DETAIL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ROW_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format epoch millis as UTC `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(millis: i64) -> String {
    format_with(millis, DETAIL_TIME_FORMAT)
}

/// Format epoch millis as UTC `YYYY-MM-DD HH:MM`
pub fn format_timestamp_short(millis: i64) -> String {
    format_with(millis, ROW_TIME_FORMAT)
}

fn format_with(millis: i64, format: &str) -> String {
    match DateTime::from_timestamp(millis.div_euclid(1000), 0) {
        Some(ts) => ts.format(format).to_string(),
        None => millis.to_string(),
    }
}

/// The detail block for a node's metadata
pub fn detail_block(stat: &NodeStat) -> String {
    detail_lines(stat).join("\n")
}

/// The detail block followed by data length and child count
pub fn detail_block_full(stat: &NodeStat) -> String {
    let mut lines = detail_lines(stat);
    lines.push(format!(
        "dataLength: {} numChildren: {}",
        stat.data_length, stat.num_children
    ));
    lines.join("\n")
}

fn detail_lines(stat: &NodeStat) -> Vec<String> {
    vec![
        format!("ctime: {}", format_timestamp(stat.ctime_millis)),
        format!("mtime: {}", format_timestamp(stat.mtime_millis)),
        format!("czxid: {} mzxid: {}", stat.create_txn_id, stat.modify_txn_id),
        format!("pzxid: {} version: {}", stat.child_txn_id, stat.version),
        format!(
            "cversion: {} aversion: {}",
            stat.child_version, stat.acl_version
        ),
        format!("ephemeralOwner: {}", stat.ephemeral_owner_id),
    ]
}

/// Title shown for a node in the tree: the decoded name, with the child
/// count appended when the remote reports any children
pub fn node_title(record: &NodeRecord) -> String {
    let name = record.display_name();
    match record.child_count_hint() {
        0 => name.into_owned(),
        n => format!("{} [{}]", name, n),
    }
}

/// One row of the tree view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub title: String,
    pub created: String,
    pub updated: String,
    pub value: String,
}

impl From<&NodeRecord> for TreeRow {
    fn from(record: &NodeRecord) -> Self {
        Self {
            title: node_title(record),
            created: format_timestamp_short(record.created_at_millis()),
            updated: format_timestamp_short(record.updated_at_millis()),
            value: String::from_utf8_lossy(record.value()).into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat() -> NodeStat {
        NodeStat {
            ctime_millis: 1_600_000_000_123,
            mtime_millis: 1_600_000_061_999,
            create_txn_id: 2,
            modify_txn_id: 7,
            child_txn_id: 9,
            version: 3,
            child_version: 4,
            acl_version: 0,
            ephemeral_owner_id: 0,
            data_length: 17,
            num_children: 2,
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1_600_000_000_123), "2020-09-13 12:26:40");
        assert_eq!(format_timestamp_short(1_600_000_000_123), "2020-09-13 12:26");
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
    }

    #[test]
    fn test_format_timestamp_floors_negative_millis() {
        assert_eq!(format_timestamp(-1), "1969-12-31 23:59:59");
    }

    #[test]
    fn test_detail_block_layout() {
        assert_eq!(
            detail_block(&stat()),
            "ctime: 2020-09-13 12:26:40\n\
             mtime: 2020-09-13 12:27:41\n\
             czxid: 2 mzxid: 7\n\
             pzxid: 9 version: 3\n\
             cversion: 4 aversion: 0\n\
             ephemeralOwner: 0"
        );
    }

    #[test]
    fn test_detail_block_full_appends_counts() {
        let full = detail_block_full(&stat());
        assert!(full.starts_with(&detail_block(&stat())));
        assert!(full.ends_with("\ndataLength: 17 numChildren: 2"));
    }
}
