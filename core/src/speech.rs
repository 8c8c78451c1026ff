//! SSML output speech.

/// How a `<say-as>` fragment should be interpreted by the speech synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpret {
    Unit,
    Date,
}

impl Interpret {
    fn as_str(self) -> &'static str {
        match self {
            Interpret::Unit => "unit",
            Interpret::Date => "date",
        }
    }
}

/// Incrementally built speech. Fragments are joined with single spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Speech {
    parts: Vec<String>,
}

impl Speech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: &str) -> Self {
        Self::new().say(text)
    }

    /// Append plain text. Text starting with punctuation is attached to the
    /// previous fragment without a space.
    pub fn say(mut self, text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return self;
        }
        let escaped = escape(text);
        match self.parts.last_mut() {
            Some(last) if text.starts_with(['.', ',', '?', '!', ':']) => last.push_str(&escaped),
            _ => self.parts.push(escaped),
        }
        self
    }

    pub fn say_as(mut self, word: &str, interpret: Interpret) -> Self {
        self.parts.push(format!(
            "<say-as interpret-as=\"{}\">{}</say-as>",
            interpret.as_str(),
            escape(word.trim())
        ));
        self
    }

    /// Dollar amount read as a unit, e.g. `$5000`.
    pub fn say_dollars(self, amount: &str) -> Self {
        self.say_as(&format!("${amount}"), Interpret::Unit)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn to_ssml(&self) -> String {
        format!("<speak>{}</speak>", self.parts.join(" "))
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
