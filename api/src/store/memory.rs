//! In-memory opportunity store for dialog tests.

use std::sync::Mutex;

use sales_assistant_core::opportunity::{FieldChange, Opportunity};
use sales_assistant_core::query::{
    OpportunitySearch, OpportunityUpdate, RevenueQuery, RevenueSummary,
};

use super::{OpportunityStore, StoreError};

struct Stored {
    record: Opportunity,
    closed: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Stored>>,
    revenue: Option<RevenueSummary>,
    failing: bool,
    pub searches: Mutex<Vec<OpportunitySearch>>,
    pub updates: Mutex<Vec<OpportunityUpdate>>,
    pub fetches: Mutex<Vec<String>>,
    pub revenue_queries: Mutex<Vec<RevenueQuery>>,
}

impl MemoryStore {
    pub fn with_open(records: Vec<Opportunity>) -> Self {
        let store = Self::default();
        for record in records {
            store.insert(record, false);
        }
        store
    }

    pub fn insert(&self, record: Opportunity, closed: bool) {
        self.records
            .lock()
            .unwrap()
            .push(Stored { record, closed });
    }

    pub fn with_revenue(mut self, summary: RevenueSummary) -> Self {
        self.revenue = Some(summary);
        self
    }

    /// Every call fails with a database error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn get(&self, id: &str) -> Option<Opportunity> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.record.id == id)
            .map(|s| s.record.clone())
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl OpportunityStore for MemoryStore {
    async fn search(&self, search: &OpportunitySearch) -> Result<Vec<Opportunity>, StoreError> {
        self.check()?;
        self.searches.lock().unwrap().push(search.clone());
        let mut found: Vec<Opportunity> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|s| !s.closed && search.matches_name(&s.record.name))
            .map(|s| s.record.clone())
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn fetch(&self, id: &str) -> Result<Option<Opportunity>, StoreError> {
        self.check()?;
        self.fetches.lock().unwrap().push(id.to_string());
        Ok(self.get(id))
    }

    async fn apply_update(&self, update: &OpportunityUpdate) -> Result<u64, StoreError> {
        self.check()?;
        self.updates.lock().unwrap().push(update.clone());
        let mut records = self.records.lock().unwrap();
        let Some(stored) = records
            .iter_mut()
            .find(|s| s.record.id == update.opportunity_id)
        else {
            return Ok(0);
        };
        let record = &mut stored.record;
        match &update.change {
            FieldChange::Amount(amount) => record.amount = *amount,
            FieldChange::CloseDate(date) => record.close_date = *date,
            FieldChange::Stage(stage) => record.stage = stage.clone(),
            FieldChange::NextSteps(steps) => record.next_steps = Some(steps.clone()),
        }
        Ok(1)
    }

    async fn revenue(&self, query: &RevenueQuery) -> Result<RevenueSummary, StoreError> {
        self.check()?;
        self.revenue_queries.lock().unwrap().push(query.clone());
        Ok(self.revenue.clone().unwrap_or(RevenueSummary {
            total: None,
            count: 0,
        }))
    }
}
