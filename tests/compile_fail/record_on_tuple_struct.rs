//! Test deriving Record on a tuple struct.

use sqlfn::Record;

#[derive(Record)]
struct Pair(pub i32, pub i32);

fn main() {}
