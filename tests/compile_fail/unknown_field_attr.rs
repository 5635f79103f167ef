//! Test unknown field attribute error.

use sqlfn::Record;

#[derive(Record)]
struct Point {
    #[sqlfn(flatten)]
    pub x: i32,
}

fn main() {}
