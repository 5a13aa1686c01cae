//! Assertion message generation

use crate::metadata::Value;

use super::formatter::ValueFormatter;

/// Message for a failed assertion.
///
/// The template may reference the expected value as `{1}` and the actual
/// value as `{2}`. Missing values render as a raw `null`.
pub struct AssertionMessage<'a> {
    template: &'a str,
    assertion: &'a str,
    formatter: &'a dyn ValueFormatter,
    expected: Option<&'a Value>,
    actual: Option<&'a Value>,
}

impl<'a> AssertionMessage<'a> {
    pub fn new(
        template: &'a str,
        assertion: &'a str,
        formatter: &'a dyn ValueFormatter,
        expected: Option<&'a Value>,
        actual: Option<&'a Value>,
    ) -> Self {
        Self {
            template,
            assertion,
            formatter,
            expected,
            actual,
        }
    }

    fn render(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => "null".to_string(),
            Some(v) => self.formatter.format(v),
        }
    }

    pub fn generate(&self) -> String {
        let body = self
            .template
            .replace("{1}", &self.render(self.expected))
            .replace("{2}", &self.render(self.actual));

        format!("Assertion {} failed: {}", self.assertion, body)
    }
}
