use std::fmt;

/// Coarse classification of a [`ReproError`], one per failure class the
/// tools can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connect,
    Query,
    Decode,
    Engine,
    Close,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Query => "query",
            Self::Decode => "decode",
            Self::Engine => "engine",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReproError {
    Connect { url: String, message: String },
    Query { what: &'static str, message: String },
    Decode { column: String, message: String },
    Engine { what: &'static str, message: String },
    Close { resource: &'static str, message: String },
}

impl ReproError {
    pub fn connect(url: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Connect {
            url: url.into(),
            message: err.to_string(),
        }
    }

    pub fn query(what: &'static str, err: impl fmt::Display) -> Self {
        Self::Query {
            what,
            message: err.to_string(),
        }
    }

    pub fn decode(column: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Decode {
            column: column.into(),
            message: err.to_string(),
        }
    }

    pub fn engine(what: &'static str, err: impl fmt::Display) -> Self {
        Self::Engine {
            what,
            message: err.to_string(),
        }
    }

    pub fn close(resource: &'static str, err: impl fmt::Display) -> Self {
        Self::Close {
            resource,
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connect { .. } => ErrorKind::Connect,
            Self::Query { .. } => ErrorKind::Query,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Engine { .. } => ErrorKind::Engine,
            Self::Close { .. } => ErrorKind::Close,
        }
    }
}

impl fmt::Display for ReproError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect { url, message } => {
                write!(f, "unable to connect to database {url}: {message}")
            }
            Self::Query { what, message } => write!(f, "{what} failed: {message}"),
            Self::Decode { column, message } => {
                write!(f, "decode column `{column}` failed: {message}")
            }
            Self::Engine { what, message } => write!(f, "{what} failed: {message}"),
            Self::Close { resource, message } => write!(f, "close {resource} failed: {message}"),
        }
    }
}

impl std::error::Error for ReproError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_map_to_their_kind() {
        let cases = [
            (ReproError::connect("postgresql://x", "refused"), ErrorKind::Connect),
            (ReproError::query("list sessions", "syntax"), ErrorKind::Query),
            (ReproError::decode("session_id", "null"), ErrorKind::Decode),
            (ReproError::engine("open engine", "missing"), ErrorKind::Engine),
            (ReproError::close("iterator", "corrupt"), ErrorKind::Close),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "wrong kind for {err}");
        }
    }

    #[test]
    fn display_carries_context_and_cause() {
        insta::assert_snapshot!(
            ReproError::query("cancel session (query path)", "permission denied").to_string(),
            @"cancel session (query path) failed: permission denied"
        );
        insta::assert_snapshot!(
            ReproError::decode("last_active_query", "unexpected NULL").to_string(),
            @"decode column `last_active_query` failed: unexpected NULL"
        );
        insta::assert_snapshot!(
            ReproError::close("snapshot iterator", "checksum mismatch").to_string(),
            @"close snapshot iterator failed: checksum mismatch"
        );
    }
}
