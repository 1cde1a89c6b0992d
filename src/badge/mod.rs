pub mod ledger;
pub mod notify;

use ledger::LedgerError;

/// Failure taxonomy of one badge event, as surfaced to the kiosk.
#[derive(Debug, derive_more::Display)]
pub enum BadgeError {
    #[display(fmt = "Matricule requis")]
    MissingMatricule,
    #[display(fmt = "Matricule invalide ou employé inactif")]
    UnknownEmployee,
    /// Ledger refusal; the transaction is rolled back untouched.
    #[display(fmt = "{}", _0)]
    Ledger(LedgerError),
    /// Anything the datastore threw at us; rolled back, generic message.
    #[display(fmt = "Erreur lors du pointage: {}", _0)]
    Processing(sqlx::Error),
}

impl std::error::Error for BadgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BadgeError::Ledger(e) => Some(e),
            BadgeError::Processing(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for BadgeError {
    fn from(e: sqlx::Error) -> Self {
        BadgeError::Processing(e)
    }
}

impl From<LedgerError> for BadgeError {
    fn from(e: LedgerError) -> Self {
        BadgeError::Ledger(e)
    }
}
