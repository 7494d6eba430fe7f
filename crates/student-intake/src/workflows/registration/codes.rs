use std::collections::BTreeSet;

use super::domain::SubmissionCode;

pub const CODE_PREFIX: &str = "EMT";

const CODE_DIGITS: usize = 3;
const MAX_CODE_LEN: usize = 10;
const RANDOM_HEX_LEN: usize = 6;

/// How a colliding candidate is disambiguated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Append the number of existing matches once and stop. A suffixed code that also exists
    /// is returned anyway; the record store's uniqueness check is the only backstop.
    SinglePass,
    /// Append 1, 2, 3, ... until the code is absent from the snapshot.
    #[default]
    Retry,
}

/// Which generator produces the candidate code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeStrategy {
    /// `EMT` followed by the last three digits of the matric number.
    #[default]
    MatricDigits,
    /// `EMT` followed by six random uppercase hex characters.
    Random,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("no free suffix for {candidate} within 10 characters")]
    Exhausted { candidate: String },
}

/// Derive a tracking code from `identifier`, disambiguating against `existing`.
pub fn generate_code(
    identifier: &str,
    existing: &BTreeSet<String>,
    policy: CollisionPolicy,
) -> Result<SubmissionCode, CodeError> {
    let candidate = candidate_code(identifier);

    match policy {
        CollisionPolicy::SinglePass => {
            let count = existing.iter().filter(|code| **code == candidate).count();
            if count == 0 {
                Ok(SubmissionCode(candidate))
            } else {
                Ok(SubmissionCode(format!("{candidate}{count}")))
            }
        }
        CollisionPolicy::Retry => {
            if !existing.contains(&candidate) {
                return Ok(SubmissionCode(candidate));
            }

            let free = (1u32..)
                .map(|suffix| format!("{candidate}{suffix}"))
                .take_while(|code| code.len() <= MAX_CODE_LEN)
                .find(|code| !existing.contains(code));

            free.map(SubmissionCode)
                .ok_or(CodeError::Exhausted { candidate })
        }
    }
}

/// Legacy generator: `EMT` plus six uppercase hex characters from a v4 UUID.
pub fn random_code() -> SubmissionCode {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    SubmissionCode(format!(
        "{CODE_PREFIX}{}",
        hex[..RANDOM_HEX_LEN].to_ascii_uppercase()
    ))
}

fn candidate_code(identifier: &str) -> String {
    let digits: Vec<char> = identifier.chars().filter(char::is_ascii_digit).collect();
    let tail: String = digits[digits.len().saturating_sub(CODE_DIGITS)..]
        .iter()
        .collect();
    format!("{CODE_PREFIX}{tail:0>width$}", width = CODE_DIGITS)
}

/// Configured generator + collision policy pair used by the registration service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeIssuer {
    pub strategy: CodeStrategy,
    pub policy: CollisionPolicy,
}

impl CodeIssuer {
    pub fn new(strategy: CodeStrategy, policy: CollisionPolicy) -> Self {
        Self { strategy, policy }
    }

    pub fn issue(
        &self,
        identifier: &str,
        existing: &BTreeSet<String>,
    ) -> Result<SubmissionCode, CodeError> {
        self.issue_with(self.strategy, identifier, existing)
    }

    pub fn issue_with(
        &self,
        strategy: CodeStrategy,
        identifier: &str,
        existing: &BTreeSet<String>,
    ) -> Result<SubmissionCode, CodeError> {
        match strategy {
            CodeStrategy::MatricDigits => generate_code(identifier, existing, self.policy),
            // Collisions across 16^6 codes are left to the store's uniqueness check.
            CodeStrategy::Random => Ok(random_code()),
        }
    }
}
