use diesel::result::DatabaseErrorKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("name already taken: {0}")]
    Conflict(String),

    #[error("missing or unknown api key")]
    Auth,

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl Error {
    /// Turns a unique-violation on a name column into [`Error::Conflict`]
    /// carrying the offending name.
    pub(crate) fn on_unique_name(name: &str) -> impl FnOnce(diesel::result::Error) -> Error + '_ {
        move |error| match error {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                Error::Conflict(name.to_owned())
            }
            other => Error::Database(other),
        }
    }
}
