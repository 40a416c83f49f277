//! Tests for core_kernel error types

use core_kernel::error::CoreError;

#[test]
fn test_core_error_invalid_identifier() {
    let error = CoreError::invalid_identifier("'abc' is not an order id");

    match error {
        CoreError::InvalidIdentifier(msg) => assert!(msg.contains("abc")),
        _ => panic!("Expected InvalidIdentifier error"),
    }
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing config");

    match error {
        CoreError::Configuration(msg) => assert_eq!(msg, "Missing config"),
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_core_error_display() {
    let error = CoreError::configuration("port must not be zero");
    let display = format!("{}", error);

    assert!(display.contains("Configuration error"));
    assert!(display.contains("port must not be zero"));
}
