//! Test empty record name error.

use sqlfn::Record;

#[derive(Record)]
#[sqlfn(name = "")]
struct Point {
    pub x: i32,
}

fn main() {}
