//! Prompt templating.
//!
//! A template is a fixed string with exactly one `{placeholder}` slot.
//! No validation is performed on the substituted value; the caller
//! guarantees the placeholder name matches the template.

/// A fixed template with a single named placeholder.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    placeholder: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Substitute the placeholder slot with `value`.
    pub fn format(&self, value: &str) -> String {
        let slot = format!("{{{}}}", self.placeholder);
        self.template.replacen(&slot, value, 1)
    }
}

/// Template for a plain chat turn.
pub fn chat_template() -> PromptTemplate {
    PromptTemplate::new("Human: {human_input}\n\nAssistant:", "human_input")
}

/// Template wrapping a base64-encoded image for the vision model.
pub fn vision_template() -> PromptTemplate {
    PromptTemplate::new(
        "Describe the provided image in detail:\n\n{image}\n\nResponse:\n",
        "image",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_substitutes_placeholder() {
        let template = PromptTemplate::new("Hello, {name}!", "name");
        assert_eq!(template.format("world"), "Hello, world!");
    }

    #[test]
    fn test_format_substitutes_first_occurrence_only() {
        let template = PromptTemplate::new("{x} and {x}", "x");
        assert_eq!(template.format("a"), "a and {x}");
    }

    #[test]
    fn test_chat_template_shape() {
        let prompt = chat_template().format("What is Rust?");
        assert_eq!(prompt, "Human: What is Rust?\n\nAssistant:");
    }

    #[test]
    fn test_vision_template_embeds_payload() {
        let prompt = vision_template().format("aGVsbG8=");
        assert!(prompt.starts_with("Describe the provided image"));
        assert!(prompt.contains("aGVsbG8="));
        assert!(!prompt.contains("{image}"));
    }
}
