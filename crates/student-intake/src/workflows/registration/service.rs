use std::sync::Arc;

use tracing::{info, warn};

use super::codes::{CodeError, CodeIssuer, CodeStrategy};
use super::domain::{NewSubmission, Submission, SubmissionForm, SubmissionId};
use super::export::{export, ExportDocument, ExportError, ExportFormat, ExportOptions};
use super::media::MediaLocator;
use super::repository::{RepositoryError, SubmissionRepository};
use super::validation::{FormValidator, ValidatedSubmission, ValidationErrors};

/// Attempts at assigning a code before giving up on a submission.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Knobs the service needs from configuration.
#[derive(Debug, Clone, Default)]
pub struct RegistrationSettings {
    pub codes: CodeIssuer,
    pub media: MediaLocator,
}

/// Validates forms, assigns tracking codes, and renders exports over a record store.
pub struct RegistrationService<R> {
    repository: Arc<R>,
    validator: FormValidator,
    settings: RegistrationSettings,
}

impl<R> RegistrationService<R>
where
    R: SubmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>, settings: RegistrationSettings) -> Self {
        Self {
            repository,
            validator: FormValidator,
            settings,
        }
    }

    pub fn settings(&self) -> &RegistrationSettings {
        &self.settings
    }

    /// Accept a public form submission and issue its tracking code.
    pub fn submit(&self, form: SubmissionForm) -> Result<Submission, RegistrationError> {
        let validated = self.validator.validate(form)?;
        self.register(validated, self.settings.codes.strategy)
    }

    /// Staff-created record. Uses the random legacy code like the admin tooling always has.
    pub fn create(&self, form: SubmissionForm) -> Result<Submission, RegistrationError> {
        let validated = self.validator.validate(form)?;
        self.register(validated, CodeStrategy::Random)
    }

    fn register(
        &self,
        validated: ValidatedSubmission,
        strategy: CodeStrategy,
    ) -> Result<Submission, RegistrationError> {
        let ValidatedSubmission { details, passport } = validated;
        let passport = passport.map(|upload| upload.storage_path());

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let existing = self.repository.codes()?;
            let submission_code = self
                .settings
                .codes
                .issue_with(strategy, &details.matric_number, &existing)
                .map_err(|CodeError::Exhausted { candidate }| {
                    warn!(%candidate, "tracking code space exhausted");
                    RegistrationError::NotUniqueAfterGeneration { attempts: attempt }
                })?;

            let new = NewSubmission {
                details: details.clone(),
                passport: passport.clone(),
                submission_code,
            };

            match self.repository.insert(new) {
                Ok(stored) => {
                    info!(
                        code = %stored.submission_code,
                        id = %stored.id,
                        attempt,
                        "submission accepted"
                    );
                    return Ok(stored);
                }
                Err(RepositoryError::Conflict(code)) => {
                    warn!(%code, attempt, "tracking code taken concurrently, regenerating");
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(RegistrationError::NotUniqueAfterGeneration {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    /// All submissions, or those matching `search`, newest first.
    pub fn list(&self, search: Option<&str>) -> Result<Vec<Submission>, RegistrationError> {
        let records = match search.map(str::trim).filter(|query| !query.is_empty()) {
            Some(query) => self.repository.search(query)?,
            None => self.repository.all()?,
        };
        Ok(records)
    }

    pub fn get(&self, id: SubmissionId) -> Result<Submission, RegistrationError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Replace the student fields of an existing record. Id, tracking code and submission date
    /// are kept; the passport path only changes when a new file is named.
    pub fn update(
        &self,
        id: SubmissionId,
        form: SubmissionForm,
    ) -> Result<Submission, RegistrationError> {
        let ValidatedSubmission { details, passport } = self.validator.validate(form)?;
        let mut record = self.get(id)?;

        record.details = details;
        if let Some(upload) = passport {
            record.passport = Some(upload.storage_path());
        }

        let stored = self.repository.update(record)?;
        info!(code = %stored.submission_code, id = %stored.id, "submission updated");
        Ok(stored)
    }

    pub fn delete(&self, id: SubmissionId) -> Result<(), RegistrationError> {
        self.repository.delete(id)?;
        info!(id = %id, "submission deleted");
        Ok(())
    }

    pub fn export(
        &self,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<ExportDocument, RegistrationError> {
        let records = self.list(options.search.as_deref())?;
        let document = export(&records, format, options.columns, &self.settings.media)?;
        info!(
            %format,
            records = records.len(),
            bytes = document.bytes.len(),
            "export rendered"
        );
        Ok(document)
    }
}

/// Error raised by the registration service.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("could not assign a unique submission code after {attempts} attempts")]
    NotUniqueAfterGeneration { attempts: usize },
}
