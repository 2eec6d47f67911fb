//! Schema declarations: the shape a structured agent response must have.
//!
//! A [`Schema`] names a record type and lists its fields. Each field has a
//! [`FieldType`] (primitive, literal set, list, nested record) plus the
//! length constraints the validator enforces. Record types implement
//! [`StructuredOutput`] to pair their serde shape with a schema.

use serde::de::DeserializeOwned;
use std::fmt::Write;

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Bool,
    Integer,
    Number,
    String { min_len: usize },
    /// A string restricted to a fixed set of literals.
    OneOf(Vec<String>),
    List { item: Box<FieldType>, min_len: usize },
    Object(Schema),
}

impl FieldType {
    pub fn string() -> Self {
        FieldType::String { min_len: 0 }
    }

    /// A string of at least `min_len` characters.
    pub fn text(min_len: usize) -> Self {
        FieldType::String { min_len }
    }

    pub fn one_of<S: AsRef<str>>(choices: &[S]) -> Self {
        FieldType::OneOf(choices.iter().map(|c| c.as_ref().to_string()).collect())
    }

    pub fn list(item: FieldType) -> Self {
        FieldType::List {
            item: Box::new(item),
            min_len: 0,
        }
    }

    /// A list with at least `min_len` items.
    pub fn non_empty_list(item: FieldType, min_len: usize) -> Self {
        FieldType::List {
            item: Box::new(item),
            min_len,
        }
    }

    pub fn object(schema: Schema) -> Self {
        FieldType::Object(schema)
    }

    /// Short human-readable name used in violation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Bool => "boolean",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::String { .. } | FieldType::OneOf(_) => "string",
            FieldType::List { .. } => "array",
            FieldType::Object(_) => "object",
        }
    }

    fn describe(&self, indent: usize, out: &mut String) {
        match self {
            FieldType::Bool | FieldType::Integer | FieldType::Number => {
                out.push_str(self.type_name());
            }
            FieldType::String { min_len } => {
                out.push_str("string");
                if *min_len > 0 {
                    let _ = write!(out, " (at least {min_len} characters)");
                }
            }
            FieldType::OneOf(choices) => {
                let quoted: Vec<String> = choices.iter().map(|c| format!("\"{c}\"")).collect();
                let _ = write!(out, "one of {}", quoted.join(" | "));
            }
            FieldType::List { item, min_len } => {
                out.push('[');
                item.describe(indent, out);
                out.push(']');
                if *min_len > 0 {
                    let _ = write!(out, " (at least {min_len} item");
                    if *min_len > 1 {
                        out.push('s');
                    }
                    out.push(')');
                }
            }
            FieldType::Object(schema) => schema.describe_into(indent, out),
        }
    }
}

/// A single declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub required: bool,
}

/// A named record shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a required field.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            required: true,
        });
        self
    }

    /// Add a field that may be absent or null.
    pub fn optional(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            required: false,
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render the expected shape for inclusion in a prompt.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(0, &mut out);
        out
    }

    fn describe_into(&self, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent + 1);
        out.push_str("{\n");
        for (i, field) in self.fields.iter().enumerate() {
            let _ = write!(out, "{pad}\"{}\": ", field.name);
            field.ty.describe(indent + 1, out);
            if !field.required {
                out.push_str(" (optional)");
            }
            if i + 1 < self.fields.len() {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str(&"  ".repeat(indent));
        out.push('}');
    }
}

/// A record type an agent can be asked to produce.
pub trait StructuredOutput: DeserializeOwned {
    fn schema() -> Schema;
}
