use validator::ValidationError;

/// UT NIM: nine ASCII digits.
pub(crate) fn validate_nim(nim: &str) -> Result<(), ValidationError> {
    let valid = nim.len() == 9 && nim.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("nim").with_message("nim must be exactly 9 digits".into()))
    }
}

/// Phone numbers arrive as 08xxx or +628xxx, 10 to 15 digits total.
pub(crate) fn validate_no_hp(no_hp: &str) -> Result<(), ValidationError> {
    let digits = no_hp.strip_prefix('+').unwrap_or(no_hp);
    let valid = (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("no_hp").with_message("no_hp must be a valid phone number".into()))
    }
}

pub(crate) fn validate_quiz_sesi(quiz_sesi: &Vec<i16>) -> Result<(), ValidationError> {
    if quiz_sesi.iter().all(|sesi| (1..=8).contains(sesi)) {
        Ok(())
    } else {
        Err(ValidationError::new("quiz_sesi")
            .with_message("quiz_sesi entries must be between 1 and 8".into()))
    }
}
