//! Prompt synthesis for structured replies.
//!
//! Builds the instruction block that teaches a model to answer with a fenced
//! payload matching a declared schema. The schema is declared field by field
//! rather than derived from a type, so the prompt and the deserialization
//! target can evolve independently.

use std::fmt::Write;

/// Payload format the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    #[default]
    Yaml,
    Json,
}

/// One field of the requested payload.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    /// Human-readable type hint, e.g. `string` or `list of string`.
    pub type_hint: String,
    pub description: String,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        type_hint: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_hint: type_hint.into(),
            description: description.into(),
        }
    }
}

/// Declarative schema rendered into extraction instructions.
///
/// ```
/// use cogflow::prompt::SchemaPrompt;
///
/// let schema = SchemaPrompt::yaml()
///     .field("name", "string", "The candidate's full name")
///     .field("skills", "list of string", "Skills mentioned in the resume");
///
/// let rendered = schema.render();
/// assert!(rendered.contains("```yaml"));
/// assert!(rendered.contains("skills"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaPrompt {
    format: PayloadFormat,
    fields: Vec<FieldSpec>,
}

impl SchemaPrompt {
    /// A schema asking for a fenced YAML payload.
    pub fn yaml() -> Self {
        Self {
            format: PayloadFormat::Yaml,
            fields: Vec::new(),
        }
    }

    /// A schema asking for a fenced JSON payload.
    pub fn json() -> Self {
        Self {
            format: PayloadFormat::Json,
            fields: Vec::new(),
        }
    }

    /// Append a field to the schema.
    pub fn field(
        mut self,
        name: impl Into<String>,
        type_hint: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldSpec::new(name, type_hint, description));
        self
    }

    /// The declared fields.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Render the format instructions: a fenced template of the payload
    /// followed by per-field descriptions.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(
            "Please analyze the provided data and extract information in the \
             following structured format:\n\n",
        );

        match self.format {
            PayloadFormat::Yaml => {
                out.push_str("Output the result in YAML format with the following structure:\n\n");
                out.push_str("```yaml\n");
                for field in &self.fields {
                    let _ = writeln!(out, "{}: <{}>", field.name, field.type_hint);
                }
                out.push_str("```\n\n");
            }
            PayloadFormat::Json => {
                out.push_str("Output the result in JSON format with the following structure:\n\n");
                out.push_str("```json\n{\n");
                for (i, field) in self.fields.iter().enumerate() {
                    let comma = if i + 1 < self.fields.len() { "," } else { "" };
                    let _ = writeln!(out, "  \"{}\": <{}>{}", field.name, field.type_hint, comma);
                }
                out.push_str("}\n```\n\n");
            }
        }

        out.push_str("Field descriptions:\n");
        for field in &self.fields {
            let _ = writeln!(out, "- {}: {}", field.name, field.description);
        }
        out.push_str(
            "\nEnsure all fields are properly filled based on the available data. \
             If a field cannot be determined from the data, use appropriate \
             default values or leave it empty as applicable.",
        );
        out
    }

    /// Wrap input data and optional context notes around the rendered
    /// schema, producing a complete extraction prompt.
    pub fn parsing_prompt(&self, input: &str, context: &[String]) -> String {
        let mut out = String::new();
        out.push_str("Analyze the following data and extract the requested information.\n\n");

        out.push_str("**Input Data:**\n```\n");
        out.push_str(input);
        out.push_str("\n```\n\n");

        for (i, note) in context.iter().enumerate() {
            let _ = writeln!(out, "**Additional Context {}:**\n{}\n", i + 1, note);
        }

        out.push_str(&self.render());
        out
    }
}
