use crate::error::ApiError;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validate a username for registration or author provisioning.
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(ApiError::validation(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LENGTH
        )));
    }
    Ok(())
}

/// Validate a password for registration.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Validate an email address: one '@', no whitespace, and a domain with a
/// dot that has non-empty text on both sides.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::validation("Invalid email address"));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_boundary() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
    }

    #[test]
    fn password_boundary() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("reader@example.com").is_ok());
        assert!(validate_email("a.b@mail.example.co").is_ok());

        assert!(validate_email("foo@bar").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("foo@.com").is_err());
        assert!(validate_email("foo@bar.").is_err());
        assert!(validate_email("foo bar@example.com").is_err());
        assert!(validate_email("foo@@example.com").is_err());
        assert!(validate_email("").is_err());
    }
}
