use proptest::prelude::*;

use lumeos_types::{AccountName, Asset, DateOfBirth};

proptest! {
    /// Every string drawn from the ledger alphabet, not ending in '.', is a valid name.
    #[test]
    fn ledger_alphabet_names_are_valid(name in "[a-z1-5.]{0,11}[a-z1-5]") {
        let parsed = AccountName::new(name.clone());
        prop_assert!(parsed.is_ok());
        let parsed = parsed.unwrap();
        prop_assert_eq!(parsed.as_str(), name.as_str());
    }

    /// Any uppercase character makes the name invalid.
    #[test]
    fn uppercase_names_are_rejected(prefix in "[a-z]{0,5}", upper in "[A-Z]", suffix in "[a-z]{0,5}") {
        let name = format!("{prefix}{upper}{suffix}");
        prop_assert!(AccountName::new(name).is_err());
    }

    /// Display output parses back to the same LUME amount.
    #[test]
    fn lume_display_parses_back(amount in -Asset::MAX_AMOUNT..=Asset::MAX_AMOUNT) {
        let asset = Asset::lume(amount);
        let parsed: Asset = asset.to_string().parse().unwrap();
        prop_assert_eq!(parsed.amount(), amount);
    }

    /// Only calendar-shaped YYYYMMDD values are accepted.
    #[test]
    fn date_of_birth_components(year in 1900u32..2100, month in 1u32..=12, day in 1u32..=31) {
        let dob = DateOfBirth::new(year * 10_000 + month * 100 + day).unwrap();
        prop_assert_eq!((dob.year(), dob.month(), dob.day()), (year, month, day));
    }
}
