//! Test deriving Record on an enum.

use sqlfn::Record;

#[derive(Record)]
enum Shape {
    Circle,
}

fn main() {}
