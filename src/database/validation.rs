use thiserror::Error;

/// Request-body validation failures raised before anything touches storage
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("invalid field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingRequiredField(field))
}

/// Like [`required`], but blank strings count as missing
pub fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError::MissingRequiredField(field)),
    }
}

pub fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn email(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = required_text(field, value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(value.to_lowercase()),
        _ => Err(ValidationError::Invalid {
            field,
            reason: "must be an email address".to_string(),
        }),
    }
}

pub fn positive(field: &'static str, value: i32) -> Result<i32, ValidationError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ValidationError::Invalid {
            field,
            reason: "must be greater than zero".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_missing() {
        assert_eq!(
            required_text("name", Some("   ".into())),
            Err(ValidationError::MissingRequiredField("name"))
        );
        assert_eq!(required_text("name", Some(" Ada ".into())).unwrap(), "Ada");
        assert_eq!(optional_text(Some("".into())), None);
    }

    #[test]
    fn email_shape() {
        assert_eq!(email("email", Some("Ada@Example.com".into())).unwrap(), "ada@example.com");
        assert!(matches!(email("email", Some("nope".into())), Err(ValidationError::Invalid { .. })));
        assert!(matches!(email("email", None), Err(ValidationError::MissingRequiredField("email"))));
    }
}
