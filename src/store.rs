//! Persistence adapter contract
//!
//! The pipeline consumes storage only through this trait. A fetch failure is
//! fatal to the run; a delete or insert failure is fatal and must never leave
//! the run reporting success. Implementations targeting strict consistency
//! under concurrent replacement of the same scope should serialize per scope
//! or wrap delete-then-insert in a single transaction.

use crate::error::Result;
use crate::models::{Insight, Transaction};

/// Storage operations the analysis pipeline depends on
///
/// Scope is the `(user_id, file_id?)` pair. A `None` file id addresses the
/// whole of the user's insight context, as defined by the implementation.
pub trait AnalysisStore {
    /// Fetch transactions in scope, most recent first when `newest_first`,
    /// capped at `limit`
    fn fetch_transactions(
        &self,
        user_id: i64,
        file_id: Option<&str>,
        limit: usize,
        newest_first: bool,
    ) -> Result<Vec<Transaction>>;

    /// Delete all insights in scope, returning how many were removed
    fn delete_insights(&self, user_id: i64, file_id: Option<&str>) -> Result<usize>;

    /// Insert a batch of insights; all-or-nothing
    fn insert_insights(&self, insights: &[Insight]) -> Result<()>;
}
