//! Student registration intake: tracking-code issuance and the JSON/CSV/XLSX exports used by
//! registry staff.

pub mod codes;
pub mod domain;
pub mod export;
pub mod media;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use codes::{
    generate_code, random_code, CodeError, CodeIssuer, CodeStrategy, CollisionPolicy, CODE_PREFIX,
};
pub use domain::{
    MaritalStatus, ModeOfEntry, NewSubmission, StudentDetails, Submission, SubmissionCode,
    SubmissionForm, SubmissionId,
};
pub use export::{
    export, ColumnSet, ExportDocument, ExportError, ExportFormat, ExportOptions,
    COLUMN_SET_VERSION, REGISTRATION_COLUMNS,
};
pub use media::{MediaLocator, PassportUpload};
pub use repository::{sort_newest_first, RepositoryError, SubmissionRepository};
pub use router::{registration_router, AdminAccess};
pub use service::{RegistrationError, RegistrationService, RegistrationSettings};
pub use validation::{FormValidator, ValidatedSubmission, ValidationErrors};
