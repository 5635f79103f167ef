//! Test empty field rename error.

use sqlfn::Record;

#[derive(Record)]
struct Point {
    #[sqlfn(rename = "")]
    pub x: i32,
}

fn main() {}
