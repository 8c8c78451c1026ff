use chrono::NaiveDate;
use sales_assistant_core::opportunity::{FieldChange, Opportunity};
use sales_assistant_core::query::{
    OpportunitySearch, OpportunityUpdate, RevenueQuery, RevenueSummary, like_pattern,
};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{OpportunityStore, StoreError};
use crate::config::SchemaName;

const OPPORTUNITY_COLUMNS: &str = "opp.sfid, opp.name, COALESCE(opp.amount, 0)::float8 AS amount, \
     opp.closedate, opp.stagename, opp.nextstep";

/// Opportunity store over the CRM's Postgres mirror.
#[derive(Clone)]
pub struct PgOpportunityStore {
    pool: PgPool,
    schema: SchemaName,
}

impl PgOpportunityStore {
    pub fn new(pool: PgPool, schema: SchemaName) -> Self {
        Self { pool, schema }
    }

    fn select_opportunities(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(OPPORTUNITY_COLUMNS)
            .push(" FROM ")
            .push(self.schema.table("opportunity"))
            .push(" AS opp WHERE ");
        qb
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct OpportunityRow {
    sfid: String,
    name: String,
    amount: f64,
    closedate: NaiveDate,
    stagename: Option<String>,
    nextstep: Option<String>,
}

impl From<OpportunityRow> for Opportunity {
    fn from(row: OpportunityRow) -> Self {
        Opportunity {
            id: row.sfid,
            name: row.name,
            amount: row.amount,
            close_date: row.closedate,
            stage: row.stagename.unwrap_or_default(),
            next_steps: row.nextstep,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RevenueRow {
    totalrevenue: Option<f64>,
    totalopps: i64,
}

impl PgOpportunityStore {
    fn search_query(&self, search: &OpportunitySearch) -> QueryBuilder<'static, Postgres> {
        let mut qb = self.select_opportunities();
        for term in search.terms() {
            qb.push("opp.name ILIKE ")
                .push_bind(like_pattern(term))
                .push(" ESCAPE '\\' AND ");
        }
        qb.push("opp.isclosed = false ORDER BY opp.name");
        qb
    }

    fn fetch_query(&self, id: &str) -> QueryBuilder<'static, Postgres> {
        let mut qb = self.select_opportunities();
        qb.push("opp.sfid = ").push_bind(id.to_string());
        qb
    }

    fn update_query(&self, update: &OpportunityUpdate) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE ");
        qb.push(self.schema.table("opportunity")).push(" SET ");
        match &update.change {
            FieldChange::Amount(amount) => {
                qb.push("amount = ").push_bind(*amount).push("::numeric");
            }
            FieldChange::CloseDate(date) => {
                qb.push("closedate = ").push_bind(*date);
            }
            FieldChange::Stage(stage) => {
                qb.push("stagename = ").push_bind(stage.clone());
            }
            FieldChange::NextSteps(next_steps) => {
                qb.push("nextstep = ").push_bind(next_steps.clone());
            }
        }
        qb.push(" WHERE sfid = ")
            .push_bind(update.opportunity_id.clone());
        qb
    }

    fn revenue_query(&self, query: &RevenueQuery) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(
            "SELECT SUM(opp.amount)::float8 AS totalrevenue, COUNT(*) AS totalopps FROM ",
        );
        qb.push(self.schema.table("opportunity"))
            .push(" AS opp LEFT JOIN ")
            .push(self.schema.table("period"))
            .push(" AS p ON opp.closedate >= p.startdate AND opp.closedate <= p.enddate")
            .push(" WHERE opp.ownerid = ")
            .push_bind(query.owner_id.clone())
            .push(" AND p.startdate <= CURRENT_DATE AND p.enddate >= CURRENT_DATE AND p.type = ")
            .push_bind(query.period.period_type())
            .push(" AND opp.probability >= ")
            .push_bind(query.probability_floor);
        if query.open_only {
            qb.push(" AND opp.isclosed = false");
        }
        qb
    }
}

impl OpportunityStore for PgOpportunityStore {
    async fn search(&self, search: &OpportunitySearch) -> Result<Vec<Opportunity>, StoreError> {
        let mut qb = self.search_query(search);
        let rows = qb
            .build_query_as::<OpportunityRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Opportunity::from).collect())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Opportunity>, StoreError> {
        let mut qb = self.fetch_query(id);
        let row = qb
            .build_query_as::<OpportunityRow>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Opportunity::from))
    }

    async fn apply_update(&self, update: &OpportunityUpdate) -> Result<u64, StoreError> {
        let mut qb = self.update_query(update);
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn revenue(&self, query: &RevenueQuery) -> Result<RevenueSummary, StoreError> {
        let mut qb = self.revenue_query(query);
        let row = qb
            .build_query_as::<RevenueRow>()
            .fetch_one(&self.pool)
            .await?;
        Ok(RevenueSummary {
            total: row.totalrevenue,
            count: row.totalopps,
        })
    }
}
