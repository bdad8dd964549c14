use thiserror::Error;

/// Configuration errors, detected when configuration is applied and surfaced
/// synchronously to the caller rather than silently coerced.
///
/// Recoverable validation failures (a cell or form field rejecting a draft
/// value) are not represented here; they stay local to the offending
/// cell/field as inline messages.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate column key `{0}`")]
    DuplicateColumnKey(String),

    #[error("page size must be at least 1")]
    InvalidPageSize,

    #[error("unknown filter operator `{0}`")]
    UnknownFilterOp(String),

    #[error("filter references unknown column `{0}`")]
    UnknownFilterColumn(String),

    #[error("column `{0}` is not filterable")]
    ColumnNotFilterable(String),

    #[error("sort references unknown column `{0}`")]
    UnknownSortColumn(String),

    #[error("column `{0}` is not sortable")]
    ColumnNotSortable(String),

    #[error("duplicate field name `{0}`")]
    DuplicateFieldName(String),

    #[error("visibility condition references unknown field `{0}`")]
    UnknownDependencyField(String),

    #[error("invalid validation pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
