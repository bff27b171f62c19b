use crate::error::{AppError, Result};

/// Fails with a validation error naming every blank field.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Missing required field(s): {}",
            missing.join(", ")
        )))
    }
}

/// Validate a hex color string (#RGB or #RRGGBB)
pub fn validate_hex_color(color: &str) -> bool {
    if !color.starts_with('#') {
        return false;
    }
    let hex = &color[1..];
    (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Treats an empty or whitespace-only form value as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_fields_lists_blank_ones() {
        let err = require_fields(&[("title", "Hope"), ("author", "  "), ("code", "")])
            .unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("author"));
                assert!(msg.contains("code"));
                assert!(!msg.contains("title"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_require_fields_ok() {
        assert!(require_fields(&[("title", "Hope")]).is_ok());
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("#FFF"));
        assert!(validate_hex_color("#fff"));
        assert!(validate_hex_color("#2196F3"));
        assert!(!validate_hex_color("FFF"));
        assert!(!validate_hex_color("#GGGGGG"));
        assert!(!validate_hex_color("#12345"));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }
}
