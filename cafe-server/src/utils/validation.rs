//! Input validation helpers
//!
//! Text length limits for customer-supplied order fields.

// ── Text length limits ──────────────────────────────────────────────

/// Customer name
pub const MAX_NAME_LEN: usize = 100;

/// Customer phone
pub const MAX_PHONE_LEN: usize = 32;

/// Order notes and per-line instructions
pub const MAX_NOTE_LEN: usize = 500;

/// Line items per order
pub const MAX_ORDER_LINES: usize = 50;

/// Quantity per line
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    validate_len(value, field, max_len)
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), String> {
    match value {
        Some(v) => validate_len(v, field, max_len),
        None => Ok(()),
    }
}

fn validate_len(value: &str, field: &str, max_len: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len > max_len {
        return Err(format!("{field} is too long ({len} chars, max {max_len})"));
    }
    Ok(())
}

/// Phone numbers compare on digits only, keeping a leading `+`
///
/// `"+34 600-12-34"` and `"+3460012 34"` normalize to the same value.
pub fn normalize_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    let mut normalized = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        normalized.push('+');
    }
    normalized.extend(trimmed.chars().filter(char::is_ascii_digit));
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Ana", "customer_name", 100).is_ok());
        assert!(validate_required_text("   ", "customer_name", 100).is_err());
        let long = "x".repeat(101);
        let err = validate_required_text(&long, "customer_name", 100).unwrap_err();
        assert!(err.contains("max 100"));
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // 4 chars, 12 bytes
        assert!(validate_optional_text(Some("咖啡拿铁"), "notes", 4).is_ok());
        assert!(validate_optional_text(None, "notes", 0).is_ok());
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+34 600-12-34"), "+346001234");
        assert_eq!(normalize_phone("(600) 12 34"), "6001234");
        assert_eq!(normalize_phone(""), "");
    }
}
