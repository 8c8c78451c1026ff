use std::future::Future;

use sales_assistant_core::opportunity::Opportunity;
use sales_assistant_core::query::{
    OpportunitySearch, OpportunityUpdate, RevenueQuery, RevenueSummary,
};
use thiserror::Error;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Data store holding the synced opportunities.
///
/// Every call is one logical query. Implementations must bind user-provided
/// values instead of splicing them into query text.
pub trait OpportunityStore: Send + Sync {
    /// Open opportunities whose name contains every search term.
    fn search(
        &self,
        search: &OpportunitySearch,
    ) -> impl Future<Output = Result<Vec<Opportunity>, StoreError>> + Send;

    fn fetch(&self, id: &str) -> impl Future<Output = Result<Option<Opportunity>, StoreError>> + Send;

    /// Apply a single-field change. Returns the number of rows touched.
    fn apply_update(
        &self,
        update: &OpportunityUpdate,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn revenue(
        &self,
        query: &RevenueQuery,
    ) -> impl Future<Output = Result<RevenueSummary, StoreError>> + Send;
}
