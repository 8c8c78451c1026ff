use sales_assistant_core::compose::{self, ANYTHING_ELSE_TO_UPDATE};
use sales_assistant_core::opportunity::{
    self, FieldChange, UpdateField, UpdateRequest, parse_amount, parse_date,
};
use sales_assistant_core::query::OpportunityUpdate;
use sales_assistant_core::skill::{Intent, ResponseBody};
use sales_assistant_core::speech::Speech;

use super::{DialogError, Turn};
use crate::store::OpportunityStore;

const WHICH_OPPORTUNITY: &str = "Which opportunity do you want to update? Find one by saying: opportunity, and then providing some key words.";
const WHAT_TO_UPDATE: &str =
    "What would you like to update: the opportunity size, closing date, stage, or next steps?";

pub(super) async fn handle<S: OpportunityStore>(
    turn: &mut Turn<'_, S>,
    intent: &Intent,
) -> Result<ResponseBody, DialogError> {
    let Some(focus) = turn.session.focus().cloned() else {
        tracing::debug!("update requested without an opportunity in session");
        let prompt = Speech::text(WHICH_OPPORTUNITY);
        return Ok(ResponseBody::speak(&prompt).reprompt(&prompt).keep_open());
    };

    let request = UpdateRequest::from_slots(&intent.slots);
    tracing::debug!(opportunity_id = %focus.id, request = ?request, "update request");

    let change = match request {
        UpdateRequest::Empty => {
            return Ok(ResponseBody::speak(&Speech::text(WHAT_TO_UPDATE)).keep_open());
        }
        UpdateRequest::FieldSelector(field) => return Ok(ask_for_value(field)),
        UpdateRequest::Amount(text) => FieldChange::Amount(parse_amount(&text)?),
        UpdateRequest::ClosingDate(text) => FieldChange::CloseDate(parse_date(&text)?),
        UpdateRequest::Stage(stage) => FieldChange::Stage(stage),
        UpdateRequest::NextSteps(text) => FieldChange::NextSteps(text),
    };

    let field = change.field();
    let spoken_value = match &change {
        FieldChange::Amount(amount) => compose::spoken_amount(*amount),
        FieldChange::CloseDate(date) => opportunity::iso_date(*date),
        FieldChange::Stage(stage) => stage.clone(),
        FieldChange::NextSteps(text) => text.clone(),
    };

    let affected = turn
        .store
        .apply_update(&OpportunityUpdate {
            opportunity_id: focus.id.clone(),
            change,
        })
        .await?;
    tracing::info!(
        opportunity_id = %focus.id,
        field = field.slot_name(),
        affected,
        "opportunity updated"
    );

    let record = turn
        .store
        .fetch(&focus.id)
        .await?
        .ok_or_else(|| DialogError::FocusLost {
            id: focus.id.clone(),
        })?;
    turn.session.focus_on(&record);

    let speech = compose::update_confirmation(field, &spoken_value);
    Ok(turn
        .composer
        .opportunity_with(&record, &speech, ANYTHING_ELSE_TO_UPDATE))
}

fn ask_for_value(field: UpdateField) -> ResponseBody {
    let prompt = Speech::text(field.prompt());
    ResponseBody::speak(&prompt)
        .reprompt(&prompt)
        .directive(compose::elicit_update_field(field))
        .keep_open()
}
