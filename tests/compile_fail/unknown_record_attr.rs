//! Test unknown record attribute error.

use sqlfn::Record;

#[derive(Record)]
#[sqlfn(table = "points")]
struct Point {
    pub x: i32,
}

fn main() {}
