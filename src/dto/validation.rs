//! Validation helpers for DTOs.

use validator::ValidationError;

/// Whether `value` is a `#rrggbb` hex color string.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Validates that a category name is 2 to 50 characters after trimming.
pub fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();

    if !(2..=50).contains(&length) {
        let mut err = ValidationError::new("category_name_length");
        err.message = Some(
            format!("Category name must be 2 to 50 characters (got {length})").into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a color is a `#rrggbb` hex string.
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if !is_hex_color(color) {
        let mut err = ValidationError::new("color_format");
        err.message = Some("Color must be a `#rrggbb` hex string".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_category_name_valid() {
        assert!(validate_category_name("Sub-10").is_ok());
        assert!(validate_category_name("  Sub-10  ").is_ok()); // trimmed
        assert!(validate_category_name("Ju").is_ok());
    }

    #[test]
    fn test_validate_category_name_invalid() {
        assert!(validate_category_name("").is_err());
        assert!(validate_category_name("S").is_err()); // too short
        assert!(validate_category_name("   A   ").is_err()); // too short after trim
        assert!(validate_category_name(&"x".repeat(51)).is_err()); // too long
    }

    #[test]
    fn test_validate_hex_color_valid() {
        assert!(validate_hex_color("#aabbcc").is_ok());
        assert!(validate_hex_color("#AABBCC").is_ok());
        assert!(validate_hex_color("#012def").is_ok());
    }

    #[test]
    fn test_validate_hex_color_invalid() {
        assert!(validate_hex_color("aabbcc").is_err()); // missing hash
        assert!(validate_hex_color("#abc").is_err()); // short form
        assert!(validate_hex_color("#aabbcg").is_err()); // invalid hex
        assert!(validate_hex_color("#aabbcc00").is_err()); // alpha channel
    }
}
