//! GIFT format tests
//!
//! Import checks each block kind lands as the right question; export checks the written
//! file reads back into the same tree.

mod export;
mod import;

use std::path::PathBuf;

pub(crate) fn load_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("gift")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}
