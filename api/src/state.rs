use std::sync::Arc;

use sqlx::PgPool;

use crate::dialog::Dialog;
use crate::identity::SalesforceIdentity;
use crate::store::postgres::PgOpportunityStore;

pub type SkillDialog = Dialog<PgOpportunityStore, SalesforceIdentity>;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub dialog: Arc<SkillDialog>,
}
