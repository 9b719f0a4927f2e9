//! JSDoc type strings for generated functions

use crate::js::printer::string_literal;

/// Branded string type exported by the runtime
pub const LOCALIZED_STRING: &str = "LocalizedString";

/// Element type of a parts sequence
pub const MESSAGE_PARTS: &str = "import('../runtime.js').MessagePart[]";

/// Typedef line pulling [`LOCALIZED_STRING`] in from the runtime
pub const LOCALIZED_STRING_IMPORT: &str = "import('../runtime.js').LocalizedString";

/// `"en" | "de"`, or `never` for an empty list
pub fn locales_union<'a>(locales: impl IntoIterator<Item = &'a str>) -> String {
    let union = locales
        .into_iter()
        .map(string_literal)
        .collect::<Vec<_>>()
        .join(" | ");
    if union.is_empty() {
        "never".to_string()
    } else {
        union
    }
}

/// `{ locale?: "en" | "de" }`
pub fn options_type<'a>(locales: impl IntoIterator<Item = &'a str>) -> String {
    format!("{{ locale?: {} }}", locales_union(locales))
}

/// Type of a per-locale message function
pub fn message_function_type(input_type: &str) -> String {
    format!("(inputs: {input_type}) => {LOCALIZED_STRING}")
}

/// Type of a per-locale parts function
pub fn message_parts_type(input_type: &str) -> String {
    format!("(inputs: {input_type}) => {MESSAGE_PARTS}")
}

/// Type of a message function carrying the parts capability
pub fn message_with_parts_type(input_type: &str) -> String {
    format!(
        "({}) & {{ parts: {} }}",
        message_function_type(input_type),
        message_parts_type(input_type)
    )
}

/// Signatures of a bundle dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherTypes {
    pub input_type: String,
    pub options_type: String,
    /// Whether callers must pass an inputs object
    pub requires_inputs: bool,
    pub markup_schema: String,
}

impl DispatcherTypes {
    fn parameters(&self) -> String {
        let inputs = if self.requires_inputs { "inputs" } else { "inputs?" };
        format!(
            "{inputs}: {}, options?: {}",
            self.input_type, self.options_type
        )
    }

    pub fn function_type(&self) -> String {
        format!("({}) => {LOCALIZED_STRING}", self.parameters())
    }

    pub fn parts_type(&self) -> String {
        format!("({}) => {MESSAGE_PARTS}", self.parameters())
    }

    pub fn metadata_type(&self) -> String {
        format!(
            "import('../runtime.js').MessageMetadata<{}, {}, {}>",
            self.input_type, self.options_type, self.markup_schema
        )
    }

    /// Full type of the exported dispatcher
    pub fn exported_type(&self, has_markup: bool) -> String {
        if has_markup {
            format!(
                "({}) & {{ parts: {} }} & {}",
                self.function_type(),
                self.parts_type(),
                self.metadata_type()
            )
        } else {
            format!("({}) & {}", self.function_type(), self.metadata_type())
        }
    }

    /// Lines of the JSDoc block above the dispatcher
    pub fn doc_lines(&self, bundle_id: &str, locales: &[&str]) -> Vec<String> {
        let plural = if locales.len() == 1 { "" } else { "s" };
        let mut lines = vec![
            format!(
                "Message {} in {} locale{plural}.",
                string_literal(bundle_id),
                locales.len()
            ),
            String::new(),
            "Generated by glossa. Edits are overwritten by the next build; change the".to_string(),
            "message catalog instead.".to_string(),
            String::new(),
        ];
        lines.push(format!("@param {{{}}} inputs", self.input_type));
        lines.push(format!("@param {{{}}} options", self.options_type));
        lines.push(format!("@returns {{{LOCALIZED_STRING}}}"));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locales_union() {
        assert_eq!(locales_union(["en", "de"]), "\"en\" | \"de\"");
        assert_eq!(locales_union([]), "never");
        assert_eq!(options_type(["en"]), "{ locale?: \"en\" }");
    }

    #[test]
    fn test_dispatcher_types() {
        let types = DispatcherTypes {
            input_type: "Greeting_Inputs".to_string(),
            options_type: options_type(["en"]),
            requires_inputs: false,
            markup_schema: "{}".to_string(),
        };
        assert_eq!(
            types.function_type(),
            "(inputs?: Greeting_Inputs, options?: { locale?: \"en\" }) => LocalizedString"
        );
        assert!(types.exported_type(true).contains("& { parts: "));
        assert!(
            types
                .doc_lines("greeting", &["en"])
                .contains(&"@param {Greeting_Inputs} inputs".to_string())
        );
    }
}
