//! Keyword accumulation across turns.
//!
//! Each turn may add search terms to the ones spoken earlier. The search built
//! from the terms requires every term to match, so the candidate set can only
//! shrink as the user keeps talking.

/// Result of merging a turn's keywords with the accumulated ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulated {
    /// Text to persist in the session for the next turn.
    pub text: String,
    /// Individual terms, new ones first.
    pub terms: Vec<String>,
}

/// Merge newly spoken terms with previously accumulated text.
///
/// The persisted text is `"<new> <previous>"`, so a first search for `deal`
/// stores `"deal "`.
pub fn accumulate(new_text: &str, previous_text: Option<&str>) -> Accumulated {
    let new_terms = split_terms(new_text);
    let previous_terms = split_terms(previous_text.unwrap_or_default());

    let text = format!("{} {}", new_terms.join(" "), previous_terms.join(" "));
    let terms = new_terms.into_iter().chain(previous_terms).collect();

    Accumulated { text, terms }
}

fn split_terms(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_turn_keeps_trailing_separator() {
        let acc = accumulate("deal", None);
        assert_eq!(acc.text, "deal ");
        assert_eq!(acc.terms, vec!["deal"]);
    }

    #[test]
    fn new_terms_come_before_previous_ones() {
        let acc = accumulate("west coast", Some("deal "));
        assert_eq!(acc.text, "west coast deal");
        assert_eq!(acc.terms, vec!["west", "coast", "deal"]);
    }

    #[test]
    fn irregular_whitespace_is_normalised() {
        let acc = accumulate("  big   renewal ", Some(" acme  "));
        assert_eq!(acc.text, "big renewal acme");
        assert_eq!(acc.terms, vec!["big", "renewal", "acme"]);
    }

    #[test]
    fn stepwise_and_single_turn_give_same_term_set() {
        let stepwise = accumulate("b", Some(&accumulate("a", None).text));
        let at_once = accumulate("b a", None);

        let mut left = stepwise.terms.clone();
        let mut right = at_once.terms.clone();
        left.sort();
        right.sort();
        assert_eq!(left, right);
    }
}
