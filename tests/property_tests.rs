use img_squeeze_session::{compressed_file_name, format_file_size, MediaType, Savings};
use proptest::prelude::*;

proptest! {
    #[test]
    fn compressed_name_keeps_last_extension(
        base in "[a-zA-Z0-9_-]{1,12}(\\.[a-z]{1,4})?",
        extension in "[a-zA-Z]{1,4}"
    ) {
        let name = format!("{}.{}", base, extension);
        let derived = compressed_file_name(&name);

        let expected_suffix = format!("_compressed.{}", extension);
        prop_assert!(derived.ends_with(&expected_suffix));
        prop_assert!(derived.starts_with(&base));
        prop_assert_eq!(derived.len(), name.len() + "_compressed".len());
    }

    #[test]
    fn compressed_name_without_extension_appends_suffix(name in "[a-zA-Z0-9_-]{0,16}") {
        let derived = compressed_file_name(&name);
        prop_assert_eq!(derived, format!("{}_compressed", name));
    }

    #[test]
    fn savings_matches_rounded_formula(
        original in 1u64..=50_000_000u64,
        compressed in 0u64..=80_000_000u64
    ) {
        let savings = Savings::between(original, compressed);
        let raw = (original as f64 - compressed as f64) / original as f64 * 100.0;

        prop_assert!((savings.percent() - raw).abs() <= 0.05 + 1e-9);
        prop_assert_eq!(savings.is_reduction(), savings.percent() > 0.0);
        if compressed > original {
            prop_assert!(savings.percent() <= 0.0);
        }

        let shown = savings.to_string();
        prop_assert!(shown.ends_with('%'));
        let digits = shown.trim_end_matches('%');
        prop_assert_eq!(digits.split('.').nth(1).map(str::len), Some(1));
    }

    #[test]
    fn file_size_labels_use_known_units(bytes in 0u64..=u64::MAX / 2) {
        let label = format_file_size(bytes);
        let unit = label.rsplit(' ').next().unwrap();
        prop_assert!(matches!(unit, "Bytes" | "KB" | "MB" | "GB"));
        prop_assert!(!label.contains(".0 "));
    }

    #[test]
    fn only_exact_declared_types_are_accepted(declared in "[a-zA-Z/+.-]{0,16}") {
        let accepted = MediaType::from_declared(&declared).is_ok();
        prop_assert_eq!(accepted, declared == "image/jpeg" || declared == "image/png");
    }
}
