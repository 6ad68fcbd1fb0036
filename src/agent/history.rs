//! Append-only conversation record used to re-prompt the model each round.

use serde_json::Value;

/// Line separator between entries in the rendered prompt.
pub const SEPARATOR: &str = "\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    /// Start a history with the user's request as its only entry.
    pub fn new(user_input: &str) -> Self {
        Self {
            entries: vec![user_input.to_string()],
        }
    }

    /// Rebuild a history from a rendered prompt.
    ///
    /// Only single-line entries survive `render` then `parse`: an entry that
    /// itself contains a newline (e.g. a multi-line backend answer) comes back
    /// split into several entries.
    pub fn parse(text: &str) -> Self {
        Self {
            entries: text.split(SEPARATOR).map(str::to_string).collect(),
        }
    }

    pub fn push_tool_result(&mut self, tool: &str, result: &Value) {
        self.entries
            .push(format!("The result of {} is {}.", tool, value_text(result)));
    }

    pub fn push_tool_error(&mut self, tool: &str, message: &str) {
        self.entries
            .push(format!("The result of {} is an error: {}.", tool, message));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The prompt text for the next model invocation.
    pub fn render(&self) -> String {
        self.entries.join(SEPARATOR)
    }
}

/// Text form of a tool result: strings verbatim, everything else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_with_user_input() {
        let h = History::new("add 2 and 5");
        assert_eq!(h.entries(), ["add 2 and 5"]);
        assert_eq!(h.render(), "add 2 and 5");
    }

    #[test]
    fn non_string_results_are_coerced() {
        let mut h = History::new("q");
        h.push_tool_result("add", &json!(7));
        h.push_tool_result("query_tool", &json!("Lomaa IT builds software"));
        h.push_tool_result("lookup", &json!({"k": [1, 2]}));
        assert_eq!(
            h.render(),
            "q\nThe result of add is 7.\n\
             The result of query_tool is Lomaa IT builds software.\n\
             The result of lookup is {\"k\":[1,2]}."
        );
    }

    #[test]
    fn render_parse_round_trip() {
        let mut h = History::new("add 2 and 5 multiply by 7");
        h.push_tool_result("add", &json!(7));
        h.push_tool_error("multiply", "Integer overflow");
        h.push_tool_result("multiply", &json!(49));

        let parsed = History::parse(&h.render());
        assert_eq!(parsed, h);
        assert_eq!(parsed.len(), 4);
    }

    #[test]
    fn multi_line_entries_split_on_parse() {
        let mut h = History::new("look it up");
        h.push_tool_result("query_tool", &json!("line one\nline two"));
        assert_eq!(h.len(), 2);

        let parsed = History::parse(&h.render());
        assert_eq!(parsed.len(), 3);
        assert_ne!(parsed, h);
        assert_eq!(parsed.render(), h.render());
    }
}
