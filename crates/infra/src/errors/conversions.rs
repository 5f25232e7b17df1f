//! Conversions from external infrastructure errors into domain errors.

use calbridge_domain::CalBridgeError;
use r2d2::Error as PoolError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CalBridgeError);

impl From<InfraError> for CalBridgeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CalBridgeError> for InfraError {
    fn from(value: CalBridgeError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → CalBridgeError */
/* -------------------------------------------------------------------------- */

impl From<SqlError> for InfraError {
    fn from(err: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        let domain = match err {
            RE::SqliteFailure(code, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match code.code {
                    ErrorCode::DatabaseBusy => CalBridgeError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        CalBridgeError::Database("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => CalBridgeError::Database(format!(
                        "constraint violation (code {}): {}",
                        code.extended_code, message
                    )),
                    _ => CalBridgeError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        code.code, code.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                CalBridgeError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                CalBridgeError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                CalBridgeError::Database(format!("invalid column type: {ty}"))
            }
            other => CalBridgeError::Database(format!("sqlite error: {other}")),
        };

        InfraError(domain)
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → CalBridgeError */
/* -------------------------------------------------------------------------- */

impl From<PoolError> for InfraError {
    fn from(err: PoolError) -> Self {
        InfraError(CalBridgeError::Database(format!("connection pool error: {err}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CalBridgeError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let domain = if err.is_timeout() {
            CalBridgeError::Network(format!("HTTP request timed out: {err}"))
        } else if err.is_connect() {
            CalBridgeError::Network(format!("HTTP connection failed: {err}"))
        } else if err.is_decode() {
            CalBridgeError::Network(format!("HTTP response decoding failed: {err}"))
        } else {
            CalBridgeError::Network(format!("HTTP request failed: {err}"))
        };
        InfraError(domain)
    }
}
