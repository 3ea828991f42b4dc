//! Benchmarks for configuration-time parsing and header framing
//!
//! - tracker list parsing (list vs comma-joined)
//! - header encode/decode on the probe path
//!
//! Run with: cargo bench --bench tracker_parsing

use divan::{Bencher, black_box};
use fdfs_pool::constants::protocol::CMD_ACTIVE_TEST;
use fdfs_pool::protocol::Header;
use fdfs_pool::types::{TrackerAddr, parse_tracker_list};

fn main() {
    divan::main();
}

fn tracker_entries(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("tracker-{i}.example.com:{}", 22122 + i))
        .collect()
}

#[divan::bench]
fn parse_single_addr() -> TrackerAddr {
    black_box("192.168.1.100:22122").parse().unwrap()
}

#[divan::bench(args = [1, 4, 16])]
fn parse_list(bencher: Bencher, count: usize) {
    let entries = tracker_entries(count);
    bencher.bench(|| parse_tracker_list(black_box(&entries)).unwrap());
}

#[divan::bench(args = [1, 4, 16])]
fn parse_joined(bencher: Bencher, count: usize) {
    let joined = [tracker_entries(count).join(",")];
    bencher.bench(|| parse_tracker_list(black_box(&joined)).unwrap());
}

#[divan::bench]
fn encode_active_test() -> [u8; 10] {
    black_box(Header::request(CMD_ACTIVE_TEST)).encode()
}

#[divan::bench]
fn decode_response(bencher: Bencher) {
    let bytes = Header::request(CMD_ACTIVE_TEST).encode();
    bencher.bench(|| Header::decode(black_box(&bytes)));
}
