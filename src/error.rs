//! Error types.

/// Fatal reconciliation failures. Both abort the run: they point at malformed or
/// incompatible input tables, not at transient faults.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Missing column '{target}' in {table} table: {hint}")]
    MissingColumn {
        table: String,
        target: String,
        hint: String,
    },
    #[error(
        "No shared columns between the {left} and {right} tables after name normalisation"
    )]
    Alignment { left: String, right: String },
}

impl ReconcileError {
    pub fn missing_column(table: &str, target: &str) -> Self {
        ReconcileError::MissingColumn {
            table: table.to_string(),
            target: target.to_string(),
            hint: format!("expected a column named '{target}' or a close variant"),
        }
    }
}
