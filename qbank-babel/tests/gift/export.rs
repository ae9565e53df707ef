//! Export tests for GIFT format (bank → GIFT)

use super::load_fixture;
use qbank_babel::format::Format;
use qbank_babel::formats::gift::{parse_gift_bank, GiftFormat};
use std::collections::HashMap;

#[test]
fn test_export_reads_back() {
    let bank = parse_gift_bank(&load_fixture("sample.gift")).unwrap();
    let written = GiftFormat.serialize(&bank).unwrap();
    assert_eq!(parse_gift_bank(&written).unwrap(), bank);
}

#[test]
fn test_category_headers() {
    let bank = parse_gift_bank(&load_fixture("sample.gift")).unwrap();
    let written = GiftFormat.serialize(&bank).unwrap();
    let headers: Vec<&str> = written
        .lines()
        .filter(|line| line.starts_with("$CATEGORY:"))
        .collect();
    assert_eq!(
        headers,
        vec![
            "$CATEGORY: $course$/top/General",
            "$CATEGORY: $course$/top/General/Fill",
        ]
    );
}

#[test]
fn test_comments_option() {
    let mut bank = parse_gift_bank(&load_fixture("sample.gift")).unwrap();
    bank.gen_dbids();
    let mut options = HashMap::new();
    options.insert("comments".to_string(), "true".to_string());

    let written = GiftFormat.serialize_with_options(&bank, &options).unwrap();
    assert_eq!(written.matches("// question: ").count(), 6);
    assert_eq!(parse_gift_bank(&written).unwrap().get_size(true), 6);
}
