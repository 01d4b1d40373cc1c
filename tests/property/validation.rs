//! Property-based tests for input validation.
//!
//! Uses proptest to verify:
//! 1. Email normalization is idempotent and case-insensitive.
//! 2. Passwords built from every character class pass the strength check.
//! 3. Titles are accepted exactly when non-empty and within the UTF-16 length limit.
//! 4. Arbitrary task records never panic the decoder.

use proptest::prelude::*;
use taskboard_model::record;
use taskboard_model::validate::{self, MAX_TITLE_LENGTH, PASSWORD_MAX_LENGTH};

fn arb_email() -> impl Strategy<Value = String> {
    ("[a-z0-9]{1,12}", "[a-z]{1,10}", "[a-z]{2,6}")
        .prop_map(|(local, domain, tld)| format!("{local}@{domain}.{tld}"))
}

fn arb_strong_password() -> impl Strategy<Value = String> {
    ("[A-Z]{1,4}", "[a-z]{1,4}", "[0-9]{1,4}", "[!@#$%^&*]{1,4}", "[a-zA-Z0-9]{4,20}")
        .prop_map(|(upper, lower, digit, special, filler)| {
            format!("{filler}{special}{upper}{digit}{lower}")
        })
}

proptest! {
    #[test]
    fn email_normalization_is_idempotent(email in arb_email(), pad in " {0,3}") {
        let shouted = format!("{pad}{}{pad}", email.to_uppercase());
        let normalized = validate::email(&shouted).unwrap();
        prop_assert_eq!(&normalized, &email);
        prop_assert_eq!(validate::email(&normalized).unwrap(), normalized);
    }

    #[test]
    fn strong_passwords_pass(password in arb_strong_password()) {
        prop_assume!(password.chars().count() <= PASSWORD_MAX_LENGTH);
        prop_assert!(validate::password_strength(&password).is_ok());
        prop_assert!(validate::password_confirmation(&password, &password).is_ok());
    }

    #[test]
    fn passwords_without_digits_fail(password in "[A-Z][a-z]{6,20}[!?]") {
        let err = validate::password_strength(&password).unwrap_err();
        prop_assert_eq!(err.field, "password");
        prop_assert!(err.message.contains("number"));
    }

    #[test]
    fn title_length_boundary(len in 0usize..300) {
        let title = "x".repeat(len);
        let ok = validate::task_title(&title).is_ok();
        prop_assert_eq!(ok, len > 0 && len <= MAX_TITLE_LENGTH);
    }

    #[test]
    fn title_limit_counts_utf16_units(title in "\\PC{1,300}") {
        let units = title.encode_utf16().count();
        prop_assert_eq!(validate::task_title(&title).is_ok(), units <= MAX_TITLE_LENGTH);
    }

    #[test]
    fn random_bytes_decode_no_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = record::decode_tasks(&bytes);
        let _ = record::decode_users(&bytes);
        let _ = record::decode_session(&bytes);
    }
}
