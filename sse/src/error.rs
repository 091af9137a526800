//! Error types for the `sse` crate.
//!
//! Almost every failure inside this crate is recovered locally (logged and
//! swallowed), so these errors mostly travel between internal layers. The one
//! error callers see is `ConnectionLimit` from `Manager::subscribe`.
use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: SseErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum SseErrorKind {
    /// The shared presence store could not be reached or rejected a command.
    Store,
    /// Publishing to, or subscribing on, the cross-instance bus failed.
    Bus,
    /// An envelope could not be encoded or decoded.
    Decode,
    /// A bus channel name did not map to any known topic.
    UnknownChannel(String),
    /// The topic already holds the configured maximum of open connections.
    ConnectionLimit { topic: String, limit: usize },
}

impl Error {
    pub(crate) fn store(err: redis::RedisError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: SseErrorKind::Store,
        }
    }

    pub(crate) fn bus(err: redis::RedisError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: SseErrorKind::Bus,
        }
    }

    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        Error {
            source: Some(reason.into().into()),
            error_kind: SseErrorKind::Decode,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "SSE Error ({:?}): {source}", self.error_kind),
            None => write!(f, "SSE Error ({:?})", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: SseErrorKind::Decode,
        }
    }
}
