//! Test two exported fields with the same STRUCT name.

use sqlfn::Record;

#[derive(Record)]
struct Reading {
    pub value: i64,
    #[sqlfn(rename = "value")]
    pub raw: i64,
}

fn main() {}
