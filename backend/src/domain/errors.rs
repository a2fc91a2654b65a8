use shared::{Feature, PlanTier};

/// Failures the domain layer reports to its callers.
///
/// Services return `anyhow::Result` and wrap these, so the IO layer can
/// downcast and pick a status code while storage errors stay opaque.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("The {feature} feature is not available on the {tier} plan")]
    FeatureLocked { feature: Feature, tier: PlanTier },
    #[error("{0}")]
    Unauthorized(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> anyhow::Error {
        DomainError::Validation(message.into()).into()
    }

    pub fn not_found(what: impl Into<String>) -> anyhow::Error {
        DomainError::NotFound(what.into()).into()
    }

    pub fn conflict(message: impl Into<String>) -> anyhow::Error {
        DomainError::Conflict(message.into()).into()
    }
}

/// Maximum length of descriptions and titles
pub const MAX_TEXT_LEN: usize = 256;
/// Maximum length of category and source names
pub const MAX_CATEGORY_LEN: usize = 64;

/// Trim a required text field and enforce its length limit
pub fn clean_required(field: &str, value: &str, max_len: usize) -> anyhow::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(DomainError::validation(format!(
            "{} cannot exceed {} characters",
            field, max_len
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank values become `None`
pub fn clean_optional(field: &str, value: Option<String>, max_len: usize) -> anyhow::Result<Option<String>> {
    match value {
        Some(v) if !v.trim().is_empty() => clean_required(field, &v, max_len).map(Some),
        _ => Ok(None),
    }
}

/// Amounts must be finite and strictly positive
pub fn validate_amount(field: &str, amount: f64) -> anyhow::Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(DomainError::validation(format!("{} must be positive", field)));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_required_trims() {
        assert_eq!(clean_required("Description", "  lunch ", 10).unwrap(), "lunch");
    }

    #[test]
    fn test_clean_required_rejects_blank_and_long() {
        let err = clean_required("Description", "   ", 10).unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::Validation(_))));
        assert!(clean_required("Description", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn test_clean_optional_blank_is_none() {
        assert_eq!(clean_optional("Location", Some("  ".to_string()), 10).unwrap(), None);
        assert_eq!(clean_optional("Location", None, 10).unwrap(), None);
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("Amount", 0.0).is_err());
        assert!(validate_amount("Amount", -3.0).is_err());
        assert!(validate_amount("Amount", f64::NAN).is_err());
        assert_eq!(validate_amount("Amount", 3.5).unwrap(), 3.5);
    }
}
