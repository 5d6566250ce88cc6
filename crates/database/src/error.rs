use nexus_runtime::NexusError;

/// Maps a driver error on `what` into the domain error. Unique violations become
/// conflicts, dangling references and missing rows become not-found.
pub(crate) fn db_err(what: &str) -> impl Fn(sqlx::Error) -> NexusError + '_ {
    move |e| match e {
        sqlx::Error::RowNotFound => NexusError::not_found(what),
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            NexusError::conflict(format!("{what} already exists"))
        }
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            NexusError::not_found(format!("{what} reference"))
        }
        e => NexusError::Storage(anyhow::Error::new(e).context(format!("[PgStore] {what}"))),
    }
}
