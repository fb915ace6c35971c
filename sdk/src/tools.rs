//! Tool descriptors advertised to the host through `tools/list`.

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A callable operation.
///
/// The description is the only documentation the calling agent gets, so it should say what the
/// tool returns as well as what it does.
#[derive(Debug, Clone, PartialEq, Builder, Deserialize, Serialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Unique name the host uses in `tools/call`.
    #[builder(setter(into))]
    pub name: String,

    #[builder(setter(into))]
    pub description: String,

    /// Shape of the accepted arguments.
    #[builder(default)]
    pub input_schema: InputSchema,
}

impl Tool {
    pub fn builder() -> ToolBuilder {
        ToolBuilder::default()
    }
}

impl ToolBuilder {
    fn validate(&self) -> Result<(), String> {
        let name = self.name.as_deref().unwrap_or_default();
        if name.is_empty() {
            return Err("tool name must not be empty".to_string());
        }
        if let Some(schema) = &self.input_schema {
            for required in &schema.required {
                if !schema.properties.contains_key(required) {
                    return Err(format!(
                        "tool {name} requires argument {required}, which it does not declare"
                    ));
                }
            }
        }
        Ok(())
    }
}

/// JSON-schema subset describing a flat argument object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub kind: ValueType,
    /// Declared arguments, kept in declaration order so the host lists them the way we wrote them.
    #[serde(default)]
    pub properties: IndexMap<String, Property>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for InputSchema {
    fn default() -> Self {
        Self {
            kind: ValueType::Object,
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }
}

impl InputSchema {
    /// An argument object with no declared arguments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declares an optional argument.
    pub fn optional(mut self, name: impl Into<String>, property: Property) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Declares an argument the caller must supply.
    pub fn required(mut self, name: impl Into<String>, property: Property) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, property);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub kind: ValueType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
}

impl Property {
    fn new(kind: ValueType, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            items: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(ValueType::String, description)
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::new(ValueType::Integer, description)
    }

    /// A list of strings, e.g. tags.
    pub fn string_list(description: impl Into<String>) -> Self {
        Self {
            items: Some(Box::new(Self::new(ValueType::String, ""))),
            ..Self::new(ValueType::Array, description)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Object,
    String,
    Integer,
    Array,
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::{assert_json_snapshot, assert_snapshot};

    #[test]
    fn test_tool_serialization() {
        let tool = Tool::builder()
            .name("search")
            .description("Search things. Returns: {total, items}")
            .input_schema(
                InputSchema::empty()
                    .required("query", Property::string("Search term"))
                    .optional("per_page", Property::integer("Results per page (default 25)"))
                    .optional("tags", Property::string_list("Tags to match")),
            )
            .build()
            .unwrap();

        assert_json_snapshot!(tool, @r#"
        {
          "name": "search",
          "description": "Search things. Returns: {total, items}",
          "inputSchema": {
            "type": "object",
            "properties": {
              "query": {
                "type": "string",
                "description": "Search term"
              },
              "per_page": {
                "type": "integer",
                "description": "Results per page (default 25)"
              },
              "tags": {
                "type": "array",
                "description": "Tags to match",
                "items": {
                  "type": "string"
                }
              }
            },
            "required": [
              "query"
            ]
          }
        }
        "#);
    }

    #[test]
    fn test_tool_without_arguments() {
        let tool = Tool::builder()
            .name("get_stats")
            .description("Account summary")
            .build()
            .unwrap();
        assert!(tool.input_schema.properties.is_empty());
        assert_eq!(tool.input_schema.kind, ValueType::Object);
    }

    #[test]
    fn test_builder_validation() {
        let err = Tool::builder().name("").description("x").build().unwrap_err();
        assert_snapshot!(err, @"tool name must not be empty");

        let mut schema = InputSchema::empty();
        schema.required.push("video_id".to_string());
        let err = Tool::builder()
            .name("get_video")
            .description("x")
            .input_schema(schema)
            .build()
            .unwrap_err();
        assert_snapshot!(err, @"tool get_video requires argument video_id, which it does not declare");
    }

    #[test]
    fn test_value_types() {
        let kinds = [
            ValueType::Object,
            ValueType::String,
            ValueType::Integer,
            ValueType::Array,
        ];
        assert_json_snapshot!(kinds, @r#"
        [
          "object",
          "string",
          "integer",
          "array"
        ]
        "#);
        assert!(serde_json::from_str::<ValueType>(r#""boolean""#).is_err());
    }
}
