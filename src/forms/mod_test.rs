use super::*;

#[test]
fn empty_errors_pass_value_through() {
    assert_eq!(ValidationErrors::new().into_result(5), Ok(5));
}

#[test]
fn display_lists_fields_in_order() {
    let mut errors = ValidationErrors::new();
    errors.add("latitude", "out of range");
    errors.add("content", "too short");
    errors.add("content", "blank");
    assert_eq!(errors.to_string(), "validation failed: content: too short, blank; latitude: out of range");
    assert_eq!(errors.field("content").len(), 2);
    assert!(errors.field("imageUrls").is_empty());
}
