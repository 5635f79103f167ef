//! Test rename on a field that is not exported.

use sqlfn::Record;

#[derive(Record)]
struct Account {
    pub id: i32,
    #[sqlfn(rename = "Secret")]
    secret: String,
}

fn main() {}
