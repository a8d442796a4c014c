use common::error::{AppError, Res};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Structural email check, not RFC validation. The server is the authority;
/// this only catches obvious typos before a network round trip.
pub fn validate_email(email: &str) -> Res<()> {
    let trimmed = email.trim();
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || trimmed.contains(' ') {
        return Err(AppError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str, confirmation: &str) -> Res<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password != confirmation {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

pub fn validate_code(code: &str) -> Res<()> {
    if code.len() != VERIFICATION_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Verification code must be 6 digits".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_required(value: &str, field: &str) -> Res<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
