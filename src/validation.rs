use std::fmt;

pub const SOFT_DESCRIPTOR_MAX_LEN: usize = 13;
pub const MIN_INSTALLMENTS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_positive_amount(amount: Option<i64>) -> ValidationResult {
    let amount = match amount {
        Some(amount) => amount,
        None => return Err(ValidationError::new("amount", "is required")),
    };

    if amount <= 0 {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_min_installments(installments: u32) -> ValidationResult {
    if installments < MIN_INSTALLMENTS {
        return Err(ValidationError::new(
            "installments",
            format!("must be at least {}", MIN_INSTALLMENTS),
        ));
    }

    Ok(())
}

pub fn validate_transaction_id(id: i64) -> ValidationResult {
    if id <= 0 {
        return Err(ValidationError::new("id", "must be a positive integer"));
    }

    Ok(())
}

/// Trims a soft descriptor to the maximum length the card networks accept.
/// The API rejects longer values, so the truncation is applied silently.
pub fn truncate_soft_descriptor(value: &str) -> String {
    value.chars().take(SOFT_DESCRIPTOR_MAX_LEN).collect()
}
