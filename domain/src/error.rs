//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `entity_api`, and `web` is dependent on `domain`,
/// but `web` should not be dependent, directly, on `entity_api`. Ultimately the various
/// `error_kind`s are used by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    /// A marketplace rule refused the operation.
    Rule(RuleErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Unauthenticated,
    AlreadyExists,
    DbTransaction,
    Other(String),
}

#[derive(Debug, PartialEq)]
pub enum RuleErrorKind {
    /// The request itself breaks a rule, e.g. a bid below the starting price.
    Invalid(String),
    /// The record is in a state that does not allow the operation.
    Conflict(String),
    /// The caller is not the party allowed to do this.
    Forbidden(String),
}

impl Error {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::rule(RuleErrorKind::Invalid(reason.into()))
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::rule(RuleErrorKind::Conflict(reason.into()))
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::rule(RuleErrorKind::Forbidden(reason.into()))
    }

    fn rule(kind: RuleErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Rule(kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        if err.error_kind == EntityApiErrorKind::RecordConflict {
            return Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Rule(RuleErrorKind::Conflict(
                    "record changed concurrently".to_string(),
                )),
            };
        }

        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::InvalidQueryTerm | EntityApiErrorKind::ValidationError => {
                EntityErrorKind::Invalid
            }
            EntityApiErrorKind::RecordUnauthenticated => EntityErrorKind::Unauthenticated,
            EntityApiErrorKind::RecordAlreadyExists => EntityErrorKind::AlreadyExists,
            _ => EntityErrorKind::Other("EntityErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_not_found_becomes_domain_not_found() {
        let err: Error = EntityApiError {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
        .into();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
    }

    #[test]
    fn entity_conflict_becomes_a_rule_conflict() {
        let err: Error = EntityApiError {
            source: None,
            error_kind: EntityApiErrorKind::RecordConflict,
        }
        .into();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Rule(RuleErrorKind::Conflict(_))
        ));
    }

    #[test]
    fn rule_constructors_carry_the_reason() {
        assert_eq!(
            Error::conflict("auction is closed").error_kind,
            DomainErrorKind::Rule(RuleErrorKind::Conflict("auction is closed".to_string()))
        );
    }
}
