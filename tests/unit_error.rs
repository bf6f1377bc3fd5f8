//! Unit tests for GuardError and GuardResult types

use instance_guard::{GuardError, GuardResult};
use std::error::Error;

#[test]
fn test_error_display_duplicate_construction() {
    let error = GuardError::DuplicateConstruction("app::Registry");
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Instance already constructed: app::Registry");
    assert!(display_str.contains("app::Registry"));
}

#[test]
fn test_error_display_encode_and_decode() {
    assert_eq!(
        GuardError::Encode("key must be a string".to_string()).to_string(),
        "Encode failed: key must be a string"
    );
    assert_eq!(
        GuardError::Decode("EOF while parsing".to_string()).to_string(),
        "Decode failed: EOF while parsing"
    );
}

#[test]
fn test_error_display_unknown_tag() {
    let error = GuardError::UnknownTag("Missing".to_string());
    assert_eq!(format!("{}", error), "Unknown member tag: Missing");
}

#[test]
fn test_error_display_not_singular() {
    let error = GuardError::NotSingular("Palette", 3);
    assert_eq!(format!("{}", error), "Palette has 3 members, expected exactly 1");

    let empty = GuardError::NotSingular("Empty", 0);
    assert!(empty.to_string().contains("0 members"));
}

#[test]
fn test_error_display_invalid_config() {
    let error = GuardError::InvalidConfig("LOG expects a boolean".to_string());
    assert_eq!(format!("{}", error), "Invalid configuration: LOG expects a boolean");
}

#[test]
fn test_error_is_std_error() {
    let error: Box<dyn Error> = Box::new(GuardError::UnknownTag("x".to_string()));
    assert!(error.source().is_none());
    assert_eq!(error.to_string(), "Unknown member tag: x");
}

#[test]
fn test_error_clone_and_eq() {
    let original = GuardError::Decode("bad".to_string());
    let cloned = original.clone();
    assert_eq!(original, cloned);
    assert_ne!(original, GuardError::Encode("bad".to_string()));
}

#[test]
fn test_guard_result_question_mark() {
    fn inner() -> GuardResult<u8> {
        Err(GuardError::NotSingular("Set", 2))
    }

    fn outer() -> GuardResult<u8> {
        let value = inner()?;
        Ok(value + 1)
    }

    assert_eq!(outer(), Err(GuardError::NotSingular("Set", 2)));
}
