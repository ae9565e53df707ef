//! Conversions through the default registry

use qbank_babel::{FormatError, FormatRegistry};
use std::collections::HashMap;

const GIFT: &str = "$CATEGORY: $course$/top/Planets\n\n::Closest::Which planet is closest to the sun? {=Mercury ~Venus ~Mars}\n\n::Blue::Is the sky blue? {T}\n";

#[test]
fn test_gift_to_aiken() {
    let registry = FormatRegistry::default();
    let bank = registry.parse(GIFT, "gift").unwrap();
    let aiken = registry.serialize(&bank, "aiken").unwrap();
    assert_eq!(
        aiken,
        "Which planet is closest to the sun?\nA. Mercury\nB. Venus\nC. Mars\nANSWER: A\n\n"
    );
}

#[test]
fn test_format_from_filename() {
    let registry = FormatRegistry::default();
    let format = registry
        .detect_format_from_filename("bank/planets.gift")
        .unwrap();
    let bank = registry.parse(GIFT, &format).unwrap();
    assert_eq!(bank.subcat("Planets").unwrap().questions().len(), 2);
}

#[test]
fn test_serialize_only_format_rejects_parsing() {
    let registry = FormatRegistry::default();
    assert!(matches!(
        registry.parse("anything", "treeviz"),
        Err(FormatError::NotSupported(_))
    ));
}

#[test]
fn test_options_pass_through() {
    let registry = FormatRegistry::default();
    let bank = registry.parse(GIFT, "gift").unwrap();

    let mut options = HashMap::new();
    options.insert("pretty".to_string(), "false".to_string());
    let json = registry.serialize_with_options(&bank, "json", &options).unwrap();
    assert!(!json.contains('\n'));

    options.insert("bogus".to_string(), "1".to_string());
    assert!(registry.serialize_with_options(&bank, "json", &options).is_err());
}
