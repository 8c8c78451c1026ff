//! Turning domain results into spoken, carded and rendered responses.

use chrono::Datelike;

use crate::opportunity::{Opportunity, UpdateField};
use crate::query::{RevenuePeriod, RevenueSummary};
use crate::skill::{
    BodyTemplate, Card, CardImage, Directive, ElicitSlot, ImageSource, RenderTemplate,
    ResponseBody, RichText, StandardCard, TemplateImage, TextContent,
};
use crate::speech::{Interpret, Speech};

pub const GET_OPPORTUNITY_INTENT: &str = "GetOpportunity";
pub const UPDATE_OPPORTUNITY_INTENT: &str = "UpdateOpportunity";
pub const KEYWORDS_SLOT: &str = "keywords";

pub const OPPORTUNITY_REPROMPT: &str =
    "You can make updates to your opportunity by telling me what you want to update.";
pub const ANYTHING_ELSE_TO_UPDATE: &str = "Is there anything else you'd like to update?";
pub const NARROW_DOWN_PROMPT: &str = "Can you give me another term to narrow it down further?";
pub const LOOKUP_NUDGE: &str = "I can help you look up an opportunity by name, just ask.";
pub const APOLOGY: &str = "Sorry, something unexpected happened. Please try Sales Assistant later.";
pub const LINK_ACCOUNT_PROMPT: &str = "You need to link a Salesforce account before you can use this skill. I've sent a card to your Alexa app to help.";

/// Per-request presentation settings.
#[derive(Debug, Clone, Copy)]
pub struct Composer<'a> {
    image_url: &'a str,
    supports_display: bool,
}

impl<'a> Composer<'a> {
    pub fn new(image_url: &'a str, supports_display: bool) -> Self {
        Self {
            image_url,
            supports_display,
        }
    }

    /// Details of a freshly read opportunity. Keeps the session open.
    pub fn opportunity(&self, record: &Opportunity) -> ResponseBody {
        let speech = opportunity_speech(record).say(OPPORTUNITY_REPROMPT);
        self.opportunity_with(record, &speech, OPPORTUNITY_REPROMPT)
    }

    /// Details of an opportunity with caller-provided speech and reprompt.
    pub fn opportunity_with(
        &self,
        record: &Opportunity,
        speech: &Speech,
        reprompt: &str,
    ) -> ResponseBody {
        let title = format!("Opportunity: {}", record.name);
        let text = opportunity_card_text(record);

        let mut body = ResponseBody::speak(speech)
            .reprompt(&Speech::text(reprompt))
            .card(self.standard_card(&title, &text))
            .keep_open();
        if self.supports_display {
            body = body.directive(self.body_template(&title, &text));
        }
        body
    }

    /// Several matches: list them and ask for another keyword.
    pub fn candidates(&self, records: &[Opportunity]) -> ResponseBody {
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        let speech = Speech::text(NARROW_DOWN_PROMPT).say(&format!(
            "I have {} results so far: {}",
            records.len(),
            names.join(", ")
        ));

        ResponseBody::speak(&speech)
            .reprompt(&Speech::text(NARROW_DOWN_PROMPT))
            .card(self.standard_card("Select an Opportunity", &names.join("\n")))
            .directive(elicit_keywords())
            .keep_open()
    }

    fn standard_card(&self, title: &str, text: &str) -> Card {
        Card::Standard(StandardCard {
            title: title.to_string(),
            text: text.to_string(),
            image: Some(CardImage {
                large_image_url: self.image_url.to_string(),
            }),
        })
    }

    fn body_template(&self, title: &str, text: &str) -> Directive {
        Directive::RenderTemplate(RenderTemplate {
            template: BodyTemplate {
                kind: "BodyTemplate2".to_string(),
                token: "opportunity".to_string(),
                back_button: "HIDDEN".to_string(),
                image: TemplateImage {
                    sources: vec![ImageSource {
                        url: self.image_url.to_string(),
                    }],
                },
                title: title.to_string(),
                text_content: TextContent {
                    primary_text: RichText {
                        text: text.replace('\n', "<br/>"),
                        kind: "RichText".to_string(),
                    },
                },
            },
        })
    }
}

/// "I found an opportunity, ..." up to and including the next steps line.
pub fn opportunity_speech(record: &Opportunity) -> Speech {
    Speech::text(&format!("I found an opportunity, {}, worth", record.name))
        .say_dollars(&spoken_amount(record.amount))
        .say(&format!(", in stage: {}, closing on", record.stage))
        .say_as(&spoken_month_day(record), Interpret::Date)
        .say(".")
        .say(&next_steps_line(record))
}

/// Card body shared by the standard card and the display template.
pub fn opportunity_card_text(record: &Opportunity) -> String {
    let date = record.close_date;
    format!(
        "This opportunity size is {} and is in {} stage.\n\nIt is set to close on {}/{}/{}.\n\n{}",
        format_usd(record.amount),
        record.stage,
        date.month(),
        date.day(),
        date.year(),
        next_steps_line(record)
    )
}

pub fn next_steps_line(record: &Opportunity) -> String {
    match record.next_steps.as_deref().map(str::trim) {
        Some(steps) if !steps.is_empty() => format!("The next steps are: {steps}."),
        _ => "There are no next steps.".to_string(),
    }
}

/// Confirmation spoken after a successful update.
pub fn update_confirmation(field: UpdateField, spoken_value: &str) -> Speech {
    let speech = match field {
        UpdateField::Amount => Speech::text("I updated the opportunity size to")
            .say_dollars(spoken_value)
            .say("."),
        UpdateField::ClosingDate => Speech::text("I updated the closing date to")
            .say_as(spoken_value, Interpret::Date)
            .say("."),
        UpdateField::Stage => Speech::text(&format!("I updated the stage to {spoken_value}.")),
        UpdateField::NextSteps => Speech::text("I updated the next steps."),
    };
    speech.say(ANYTHING_ELSE_TO_UPDATE)
}

/// Revenue report speech, always ending with the lookup nudge.
pub fn revenue_report(summary: &RevenueSummary, period: RevenuePeriod) -> Speech {
    let speech = match summary.rounded_total() {
        Some(total) => Speech::text(&format!(
            "Your projected revenue for this fiscal {} is",
            period.spoken()
        ))
        .say_dollars(&total.to_string())
        .say(&format!(" across {} opportunities.", summary.count)),
        None => Speech::text(&format!(
            "You don't have any projected revenue this {}.",
            period.spoken()
        ))
        .say(&format!(
            "Check your Salesforce opportunities to make sure you have some that are set to close this {}.",
            period.spoken()
        )),
    };
    speech.say(LOOKUP_NUDGE)
}

pub fn elicit_keywords() -> Directive {
    Directive::ElicitSlot(ElicitSlot::new(
        GET_OPPORTUNITY_INTENT,
        KEYWORDS_SLOT,
        &[KEYWORDS_SLOT],
    ))
}

/// Elicit the value slot of `field`, restating every update slot.
pub fn elicit_update_field(field: UpdateField) -> Directive {
    let mut slot_names = vec![crate::opportunity::UPDATE_OPTION_SLOT];
    slot_names.extend(UpdateField::ALL.iter().map(|f| f.slot_name()));
    Directive::ElicitSlot(ElicitSlot::new(
        UPDATE_OPPORTUNITY_INTENT,
        field.slot_name(),
        &slot_names,
    ))
}

/// Account-linking prompt. Ends the session.
pub fn link_account() -> ResponseBody {
    ResponseBody::speak(&Speech::text(LINK_ACCOUNT_PROMPT)).card(Card::LinkAccount)
}

/// Generic apology for failures nobody handled. Ends the session.
pub fn apology() -> ResponseBody {
    ResponseBody::speak(&Speech::text(APOLOGY))
}

/// Amount as spoken inside a unit `say-as`: plain digits, no separators.
pub fn spoken_amount(amount: f64) -> String {
    amount.to_string()
}

/// Month and day with the year left out, e.g. `????0308`.
pub fn spoken_month_day(record: &Opportunity) -> String {
    record.close_date.format("????%m%d").to_string()
}

/// US dollar formatting with separators and up to two fraction digits.
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{sign}${grouped}"),
        f if f % 10 == 0 => format!("{sign}${grouped}.{}", f / 10),
        f => format!("{sign}${grouped}.{f:02}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn record(next_steps: Option<&str>) -> Opportunity {
        Opportunity {
            id: "006xx".to_string(),
            name: "West Coast Expansion".to_string(),
            amount: 125000.0,
            close_date: NaiveDate::from_ymd_opt(2018, 3, 8).unwrap(),
            stage: "Prospecting".to_string(),
            next_steps: next_steps.map(str::to_string),
        }
    }

    const IMAGE: &str = "https://example.com/sales.png";

    #[test]
    fn formats_dollars() {
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(999.0), "$999");
        assert_eq!(format_usd(1234.0), "$1,234");
        assert_eq!(format_usd(125000.0), "$125,000");
        assert_eq!(format_usd(1234567.5), "$1,234,567.5");
        assert_eq!(format_usd(12.346), "$12.35");
        assert_eq!(format_usd(-4200.0), "-$4,200");
    }

    #[test]
    fn spoken_forms() {
        let r = record(None);
        assert_eq!(spoken_month_day(&r), "????0308");
        assert_eq!(spoken_amount(5000.0), "5000");
        assert_eq!(spoken_amount(12500.5), "12500.5");
    }

    #[test]
    fn record_speech_and_card_share_next_steps_line() {
        let r = record(Some("Send the proposal"));
        let body = Composer::new(IMAGE, false).opportunity(&r);

        let ssml = &body.output_speech.as_ref().unwrap().ssml;
        assert_eq!(
            ssml,
            "<speak>I found an opportunity, West Coast Expansion, worth <say-as interpret-as=\"unit\">$125000</say-as>, in stage: Prospecting, closing on <say-as interpret-as=\"date\">????0308</say-as>. The next steps are: Send the proposal. You can make updates to your opportunity by telling me what you want to update.</speak>"
        );

        match body.card.as_ref().unwrap() {
            Card::Standard(card) => {
                assert_eq!(card.title, "Opportunity: West Coast Expansion");
                assert_eq!(
                    card.text,
                    "This opportunity size is $125,000 and is in Prospecting stage.\n\nIt is set to close on 3/8/2018.\n\nThe next steps are: Send the proposal."
                );
            }
            other => panic!("unexpected card: {other:?}"),
        }
        assert_eq!(body.should_end_session, Some(false));
        assert!(body.directives.is_empty());
    }

    #[test]
    fn missing_next_steps_default() {
        assert_eq!(next_steps_line(&record(None)), "There are no next steps.");
        assert_eq!(next_steps_line(&record(Some("  "))), "There are no next steps.");
    }

    #[test]
    fn display_devices_get_body_template() {
        let body = Composer::new(IMAGE, true).opportunity(&record(None));
        let value = serde_json::to_value(&body.directives).unwrap();
        assert_eq!(
            value,
            json!([{
                "type": "Display.RenderTemplate",
                "template": {
                    "type": "BodyTemplate2",
                    "token": "opportunity",
                    "backButton": "HIDDEN",
                    "image": { "sources": [{ "url": IMAGE }] },
                    "title": "Opportunity: West Coast Expansion",
                    "textContent": {
                        "primaryText": {
                            "text": "This opportunity size is $125,000 and is in Prospecting stage.<br/><br/>It is set to close on 3/8/2018.<br/><br/>There are no next steps.",
                            "type": "RichText"
                        }
                    }
                }
            }])
        );
    }

    #[test]
    fn candidate_card_lists_names_one_per_line() {
        let mut a = record(None);
        a.name = "Acme Deal".to_string();
        let mut b = record(None);
        b.name = "Globex Deal".to_string();

        let body = Composer::new(IMAGE, false).candidates(&[a, b]);
        match body.card.as_ref().unwrap() {
            Card::Standard(card) => {
                assert_eq!(card.title, "Select an Opportunity");
                assert_eq!(card.text, "Acme Deal\nGlobex Deal");
            }
            other => panic!("unexpected card: {other:?}"),
        }
        assert_eq!(
            body.output_speech.unwrap().ssml,
            "<speak>Can you give me another term to narrow it down further? I have 2 results so far: Acme Deal, Globex Deal</speak>"
        );
        assert_eq!(body.directives, vec![elicit_keywords()]);
        assert_eq!(body.should_end_session, Some(false));
    }

    #[test]
    fn update_confirmations() {
        assert_eq!(
            update_confirmation(UpdateField::Amount, "5000").to_ssml(),
            "<speak>I updated the opportunity size to <say-as interpret-as=\"unit\">$5000</say-as>. Is there anything else you&apos;d like to update?</speak>"
        );
        assert_eq!(
            update_confirmation(UpdateField::Stage, "Closed Won").to_ssml(),
            "<speak>I updated the stage to Closed Won. Is there anything else you&apos;d like to update?</speak>"
        );
    }

    #[test]
    fn revenue_report_speech() {
        let summary = RevenueSummary { total: Some(48_700.0), count: 4 };
        assert_eq!(
            revenue_report(&summary, RevenuePeriod::Quarter).to_ssml(),
            "<speak>Your projected revenue for this fiscal quarter is <say-as interpret-as=\"unit\">$49000</say-as> across 4 opportunities. I can help you look up an opportunity by name, just ask.</speak>"
        );

        let empty = RevenueSummary { total: None, count: 0 };
        let ssml = revenue_report(&empty, RevenuePeriod::Quarter).to_ssml();
        assert!(ssml.contains("You don&apos;t have any projected revenue this quarter."));
        assert!(ssml.ends_with("just ask.</speak>"));
    }

    #[test]
    fn update_field_elicitation_restates_all_slots() {
        match elicit_update_field(UpdateField::ClosingDate) {
            Directive::ElicitSlot(elicit) => {
                assert_eq!(elicit.slot_to_elicit, "closingDate");
                assert_eq!(elicit.updated_intent.name, "UpdateOpportunity");
                let mut names: Vec<&str> =
                    elicit.updated_intent.slots.keys().map(String::as_str).collect();
                names.sort();
                assert_eq!(names, vec!["amount", "closingDate", "nextSteps", "stage", "updateOption"]);
            }
            other => panic!("unexpected directive: {other:?}"),
        }
    }
}
