//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted team name, in characters.
pub const MAX_TEAM_NAME_LEN: usize = 64;

/// Validates that a team name is non-blank and carries no surrounding whitespace.
///
/// Names are compared case-sensitively, so `"Alpha"` and `"alpha"` are distinct
/// teams, but `" Alpha"` would be indistinguishable on screen and is refused.
///
/// # Examples
///
/// ```ignore
/// validate_team_name("Alpha")   // Ok
/// validate_team_name("   ")     // Err - blank
/// validate_team_name(" Alpha")  // Err - padded
/// ```
pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("team_name_blank");
        err.message = Some("Team name must not be blank".into());
        return Err(err);
    }

    if name.trim() != name {
        let mut err = ValidationError::new("team_name_padding");
        err.message = Some("Team name must not start or end with whitespace".into());
        return Err(err);
    }

    if name.chars().count() > MAX_TEAM_NAME_LEN {
        let mut err = ValidationError::new("team_name_length");
        err.message = Some(
            format!("Team name must be at most {MAX_TEAM_NAME_LEN} characters").into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_team_name_valid() {
        assert!(validate_team_name("Alpha").is_ok());
        assert!(validate_team_name("Team 42").is_ok());
        assert!(validate_team_name("équipe").is_ok());
    }

    #[test]
    fn test_validate_team_name_blank_or_padded() {
        assert!(validate_team_name("").is_err());
        assert!(validate_team_name("   ").is_err());
        assert!(validate_team_name(" Alpha").is_err());
        assert!(validate_team_name("Alpha\n").is_err());
    }

    #[test]
    fn test_validate_team_name_too_long() {
        let name = "x".repeat(MAX_TEAM_NAME_LEN + 1);
        assert!(validate_team_name(&name).is_err());
        assert!(validate_team_name(&name[1..]).is_ok());
    }
}
