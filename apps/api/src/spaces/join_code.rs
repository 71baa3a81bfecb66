use uuid::Uuid;

use crate::errors::AppError;

pub const JOIN_CODE_LEN: usize = 6;

const MIN_CODE: u128 = 100_000;
const CODE_RANGE: u128 = 900_000;

/// A fresh six-digit join code in `100000..=999999`.
pub fn generate_join_code() -> String {
    let n = Uuid::new_v4().as_u128() % CODE_RANGE + MIN_CODE;
    n.to_string()
}

/// Checks a user-entered code and returns it trimmed.
pub fn validate_join_code(input: &str) -> Result<&str, AppError> {
    let code = input.trim();
    if code.len() == JOIN_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(code)
    } else {
        Err(AppError::Validation(
            "Please enter a valid 6-digit code.".to_string(),
        ))
    }
}
