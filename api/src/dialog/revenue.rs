use sales_assistant_core::compose;
use sales_assistant_core::query::RevenueQuery;
use sales_assistant_core::skill::ResponseBody;

use super::{DialogError, Turn};
use crate::store::OpportunityStore;

pub(super) async fn handle<S: OpportunityStore>(
    turn: &mut Turn<'_, S>,
) -> Result<ResponseBody, DialogError> {
    let owner_id = turn
        .session
        .user_id()
        .ok_or(DialogError::MissingUser)?
        .to_string();
    let policy = turn.settings.revenue;

    let query = RevenueQuery {
        owner_id,
        period: policy.period,
        probability_floor: policy.probability_floor,
        open_only: policy.open_only,
    };
    let summary = turn.store.revenue(&query).await?;
    tracing::debug!(total = ?summary.total, count = summary.count, "revenue summary");

    let speech = compose::revenue_report(&summary, policy.period);
    Ok(ResponseBody::speak(&speech).keep_open())
}
