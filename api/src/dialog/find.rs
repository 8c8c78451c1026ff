use sales_assistant_core::compose::{self, KEYWORDS_SLOT};
use sales_assistant_core::keywords;
use sales_assistant_core::query::OpportunitySearch;
use sales_assistant_core::skill::{Intent, ResponseBody};
use sales_assistant_core::slots;
use sales_assistant_core::speech::Speech;

use super::{DialogError, Turn};
use crate::store::OpportunityStore;

const ASK_FOR_KEYWORDS: &str = "First, we need to find an opportunity. Please say some keywords to look up your opportunity.";
const KEYWORDS_REPROMPT: &str = "Please say some keywords to look up your opportunity.";

pub(super) async fn handle<S: OpportunityStore>(
    turn: &mut Turn<'_, S>,
    intent: &Intent,
) -> Result<ResponseBody, DialogError> {
    if let Some(focus) = turn.session.focus() {
        tracing::debug!(opportunity_id = %focus.id, "opportunity already in session");
        let speech = Speech::text(&format!(
            "You have an opportunity in session: {}",
            focus.name
        ));
        turn.session.reset();
        return Ok(ResponseBody::speak(&speech));
    }

    let Some(spoken) = slots::resolve(intent.slots.get(KEYWORDS_SLOT)) else {
        let prompt = Speech::text(ASK_FOR_KEYWORDS);
        return Ok(ResponseBody::speak(&prompt)
            .reprompt(&prompt)
            .directive(compose::elicit_keywords())
            .keep_open());
    };

    match narrow(turn, &spoken).await {
        Err(DialogError::NoMatch { keywords }) => {
            tracing::info!(keywords = %keywords, "no opportunity matched");
            turn.session.clear_keywords();
            Ok(no_match(&keywords))
        }
        other => other,
    }
}

/// Search with the accumulated terms and branch on the number of matches.
async fn narrow<S: OpportunityStore>(
    turn: &mut Turn<'_, S>,
    spoken: &str,
) -> Result<ResponseBody, DialogError> {
    let accumulated = keywords::accumulate(spoken, turn.session.keywords());
    let search = OpportunitySearch::new(accumulated.terms.clone());
    let mut found = turn.store.search(&search).await?;
    tracing::debug!(terms = ?search.terms(), matches = found.len(), "opportunity search");

    match found.len() {
        0 => Err(DialogError::NoMatch {
            keywords: accumulated.terms.join(" "),
        }),
        1 => {
            let record = found.remove(0);
            turn.session.focus_on(&record);
            Ok(turn.composer.opportunity(&record))
        }
        _ => {
            turn.session.remember_keywords(accumulated.text);
            Ok(turn.composer.candidates(&found))
        }
    }
}

fn no_match(keywords: &str) -> ResponseBody {
    let speech = Speech::text(&format!(
        "I couldn't find an open opportunity matching {keywords}. Please say some different keywords."
    ));
    ResponseBody::speak(&speech)
        .reprompt(&Speech::text(KEYWORDS_REPROMPT))
        .directive(compose::elicit_keywords())
        .keep_open()
}
