use crate::error::{AppError, AppResult};
use regex::Regex;

pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();

    if !email_regex.is_match(email) {
        return Err(AppError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> AppResult<()> {
    if username.len() < 2 || username.len() > 30 {
        return Err(AppError::ValidationError(
            "Username length must be between 2 and 30 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user.name+tag@sub.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ab").is_ok());
        assert!(validate_username("a").is_err());
        assert!(validate_username(&"x".repeat(31)).is_err());
    }
}
