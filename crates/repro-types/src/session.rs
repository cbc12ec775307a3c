use facet::Facet;

/// One row of the cluster-wide session listing.
///
/// `session_start` is kept as the server's own text rendering; the tools
/// only ever print it.
#[derive(Facet, Clone, Debug, PartialEq, Eq, Default)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_name: String,
    pub session_start: String,
    pub last_active_query: String,
    pub application_name: String,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>, last_active_query: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            last_active_query: last_active_query.into(),
            ..Self::default()
        }
    }

    pub fn with_application(mut self, application_name: impl Into<String>) -> Self {
        self.application_name = application_name.into();
        self
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<&tokio_postgres::Row> for SessionRecord {
    type Error = crate::ReproError;

    fn try_from(row: &tokio_postgres::Row) -> Result<Self, Self::Error> {
        fn text(row: &tokio_postgres::Row, column: &str) -> Result<String, crate::ReproError> {
            row.try_get::<_, String>(column)
                .map_err(|e| crate::ReproError::decode(column, e))
        }

        Ok(Self {
            session_id: text(row, "session_id")?,
            user_name: text(row, "user_name")?,
            session_start: text(row, "session_start")?,
            last_active_query: text(row, "last_active_query")?,
            application_name: text(row, "application_name")?,
        })
    }
}
