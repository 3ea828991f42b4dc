//! Property-based tests using proptest
//!
//! Invariants of tracker address parsing, header framing and pool status
//! arithmetic over arbitrary inputs.

use fdfs_pool::PoolStatus;
use fdfs_pool::config::PoolConfig;
use fdfs_pool::protocol::Header;
use fdfs_pool::types::{
    IdleSessions, MaxPoolSize, OutstandingSessions, TrackerAddr, parse_tracker_list,
};
use proptest::prelude::*;

// =============================================================================
// 1. TrackerAddr parsing
// =============================================================================

proptest! {
    #[test]
    fn prop_parse_never_panics(s in ".*") {
        let _ = s.parse::<TrackerAddr>();
    }

    #[test]
    fn prop_valid_entries_parse(host in "[a-z][a-z0-9.-]{0,30}", port in 1u16..) {
        let addr: TrackerAddr = format!("{host}:{port}").parse().unwrap();
        prop_assert_eq!(addr.host(), host.as_str());
        prop_assert_eq!(addr.port(), port);
    }

    #[test]
    fn prop_surrounding_whitespace_ignored(host in "[a-z]{1,10}", port in 1u16..) {
        let padded: TrackerAddr = format!("  {host}:{port} ").parse().unwrap();
        let plain: TrackerAddr = format!("{host}:{port}").parse().unwrap();
        prop_assert_eq!(padded, plain);
    }

    #[test]
    fn prop_entries_without_colon_rejected(s in "[^:,]*") {
        prop_assert!(s.parse::<TrackerAddr>().is_err());
    }

    #[test]
    fn prop_extra_colon_rejected(host in "[a-z]{1,10}", port in 1u16.., extra in "[0-9]{0,5}") {
        let entry = format!("{host}:{port}:{extra}");
        prop_assert!(entry.parse::<TrackerAddr>().is_err());
    }
}

// =============================================================================
// 2. Tracker lists
// =============================================================================

proptest! {
    #[test]
    fn prop_joined_and_split_lists_agree(
        entries in prop::collection::vec(("[a-z]{1,8}", 1u16..), 1..6)
    ) {
        let items: Vec<String> = entries.iter().map(|(h, p)| format!("{h}:{p}")).collect();

        let from_list = parse_tracker_list(&items).unwrap();
        let from_joined = parse_tracker_list([items.join(",")]).unwrap();

        prop_assert_eq!(from_list.len(), items.len());
        prop_assert_eq!(from_list, from_joined);
    }

    #[test]
    fn prop_config_preserves_tracker_order(
        entries in prop::collection::vec(("[a-z]{1,8}", 1u16..), 1..6)
    ) {
        let items: Vec<String> = entries.iter().map(|(h, p)| format!("{h}:{p}")).collect();
        let config = PoolConfig::builder(items.clone()).min_size(0).build().unwrap();

        let rendered: Vec<String> = config.trackers().iter().map(ToString::to_string).collect();
        prop_assert_eq!(rendered, items);
    }
}

// =============================================================================
// 3. Pool sizing and status
// =============================================================================

proptest! {
    #[test]
    fn prop_builder_enforces_size_order(min in 0usize..100, max in 0usize..100) {
        let result = PoolConfig::builder(["t:22122"]).min_size(min).max_size(max).build();
        prop_assert_eq!(result.is_ok(), max > 0 && min <= max);
    }

    #[test]
    fn prop_checked_out_never_exceeds_outstanding(idle in 0usize..1000, outstanding in 0usize..1000) {
        let status = PoolStatus {
            idle: IdleSessions::new(idle),
            outstanding: OutstandingSessions::new(outstanding),
            min_size: 0,
            max_size: MaxPoolSize::new(10),
        };
        prop_assert!(status.checked_out() <= outstanding);
    }

    #[test]
    fn prop_header_decode_reads_fields(body_len in 0i64.., cmd: u8, status: u8) {
        let header = Header { body_len, cmd, status };
        let bytes = header.encode();

        prop_assert_eq!(&bytes[..8], &body_len.to_be_bytes()[..]);
        prop_assert_eq!(Header::decode(&bytes), header);
    }
}
