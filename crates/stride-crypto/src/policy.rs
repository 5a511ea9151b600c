//! Passphrase acceptance policy and strength scoring
//!
//! Policy gates setup (and rotation): length ≥ 12 plus upper, lower, and
//! digit classes. Validation reports the specific missing requirements so
//! a UI can render a live checklist. The 0–100 strength score is a purely
//! visual meter and never decides acceptance.

/// Minimum passphrase length accepted at setup.
pub const MIN_PASSPHRASE_LENGTH: usize = 12;

/// A single unmet passphrase requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
}

impl Requirement {
    /// Checklist label for this requirement.
    pub fn describe(&self) -> &'static str {
        match self {
            Requirement::MinLength => "At least 12 characters",
            Requirement::Uppercase => "One uppercase letter",
            Requirement::Lowercase => "One lowercase letter",
            Requirement::Digit => "One number",
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Outcome of validating a candidate passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyCheck {
    /// Requirements the candidate does not meet, in checklist order.
    pub missing: Vec<Requirement>,
}

impl PolicyCheck {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Validate a candidate passphrase for setup.
pub fn validate_passphrase(passphrase: &str) -> PolicyCheck {
    let mut missing = Vec::new();

    if passphrase.chars().count() < MIN_PASSPHRASE_LENGTH {
        missing.push(Requirement::MinLength);
    }
    if !passphrase.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push(Requirement::Uppercase);
    }
    if !passphrase.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push(Requirement::Lowercase);
    }
    if !passphrase.chars().any(|c| c.is_ascii_digit()) {
        missing.push(Requirement::Digit);
    }

    PolicyCheck { missing }
}

/// Score a passphrase 0–100 for the strength meter.
///
/// Length tiers (≥8, ≥12, ≥16) and the four character classes each
/// contribute a fixed weight, capped at 100.
pub fn passphrase_strength(passphrase: &str) -> u8 {
    let len = passphrase.chars().count();
    let mut score: u32 = 0;

    if len >= 8 {
        score += 15;
    }
    if len >= 12 {
        score += 15;
    }
    if len >= 16 {
        score += 10;
    }

    if passphrase.chars().any(|c| c.is_ascii_lowercase()) {
        score += 15;
    }
    if passphrase.chars().any(|c| c.is_ascii_uppercase()) {
        score += 15;
    }
    if passphrase.chars().any(|c| c.is_ascii_digit()) {
        score += 15;
    }
    if passphrase.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 15;
    }

    score.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_passphrase() {
        let check = validate_passphrase("short1A");
        assert!(!check.is_valid());
        assert!(check.missing.contains(&Requirement::MinLength));
    }

    #[test]
    fn test_rejects_missing_uppercase() {
        let check = validate_passphrase("alllowercase12345");
        assert_eq!(check.missing, vec![Requirement::Uppercase]);
    }

    #[test]
    fn test_rejects_missing_lowercase() {
        let check = validate_passphrase("ALLUPPER12345");
        assert_eq!(check.missing, vec![Requirement::Lowercase]);
    }

    #[test]
    fn test_rejects_missing_digit() {
        let check = validate_passphrase("NoDigitsHereAtAll");
        assert_eq!(check.missing, vec![Requirement::Digit]);
    }

    #[test]
    fn test_accepts_valid_passphrase() {
        assert!(validate_passphrase("Valid1Passphrase").is_valid());
    }

    #[test]
    fn test_reports_all_missing_requirements() {
        let check = validate_passphrase("abc");
        assert_eq!(
            check.missing,
            vec![
                Requirement::MinLength,
                Requirement::Uppercase,
                Requirement::Digit
            ]
        );
    }

    #[test]
    fn test_strength_monotonic_over_richer_passphrases() {
        let weak = passphrase_strength("abc");
        let medium = passphrase_strength("abcABC123");
        let strong = passphrase_strength("abcABC123!@#longer");

        assert!(weak < medium, "{weak} !< {medium}");
        assert!(medium < strong, "{medium} !< {strong}");
    }

    #[test]
    fn test_strength_capped_at_100() {
        assert_eq!(passphrase_strength("aA1!aA1!aA1!aA1!aA1!"), 100);
    }

    #[test]
    fn test_strength_empty_is_zero() {
        assert_eq!(passphrase_strength(""), 0);
    }
}
