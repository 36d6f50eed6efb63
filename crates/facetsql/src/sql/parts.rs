/// A piece of a [`Sql`](super::Sql) statement.
#[derive(Debug, Clone)]
pub(crate) enum SqlPart {
    /// Statement text, appended verbatim.
    Raw(String),
    /// A bound parameter; rendered as `$n` by position.
    Param,
}
