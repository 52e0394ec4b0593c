use serde_json::{json, Map, Value};
use std::fmt::Debug;

use crate::errors::{ToolError, ToolResult};

/// Named arguments passed to a tool handler
pub type ToolArguments = Map<String, Value>;

/// The function that powers a tool
pub type ToolHandler = Box<dyn Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Integer => "integer",
            ParameterType::Number => "number",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParameterType::String => value.is_string(),
            ParameterType::Integer => value.is_i64() || value.is_u64(),
            ParameterType::Number => value.is_number(),
            ParameterType::Boolean => value.is_boolean(),
            ParameterType::Array => value.is_array(),
            ParameterType::Object => value.is_object(),
        }
    }
}

/// A single named parameter of a tool
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub param_type: ParameterType,
    pub description: String,
    pub required: bool,
}

impl Parameter {
    pub fn required<N: Into<String>, D: Into<String>>(
        name: N,
        param_type: ParameterType,
        description: D,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional<N: Into<String>, D: Into<String>>(
        name: N,
        param_type: ParameterType,
        description: D,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// What the model is told about a tool: its name, purpose and parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
}

impl ToolSchema {
    pub fn new<N, D>(name: N, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// The parameters as a JSON schema object
    pub fn parameters_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({ "type": p.param_type.as_str(), "description": p.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Parse the raw argument text sent by the model and check it against the declared parameters.
    ///
    /// An empty payload (or `null`) means no arguments.
    pub fn parse_arguments(&self, payload: &str) -> ToolResult<ToolArguments> {
        let invalid = |reason: String| ToolError::ArgumentParse {
            tool: self.name.clone(),
            reason,
        };

        let payload = payload.trim();
        let arguments = if payload.is_empty() {
            Map::new()
        } else {
            match serde_json::from_str::<Value>(payload) {
                Ok(Value::Object(map)) => map,
                Ok(Value::Null) => Map::new(),
                Ok(other) => return Err(invalid(format!("expected a JSON object, got {}", other))),
                Err(e) => return Err(invalid(format!("{} in {}", e, payload))),
            }
        };

        for key in arguments.keys() {
            if !self.parameters.iter().any(|p| &p.name == key) {
                return Err(invalid(format!("unexpected parameter '{}'", key)));
            }
        }

        for parameter in &self.parameters {
            match arguments.get(&parameter.name) {
                Some(value) if !parameter.param_type.matches(value) => {
                    return Err(invalid(format!(
                        "parameter '{}' must be of type {}",
                        parameter.name,
                        parameter.param_type.as_str()
                    )));
                }
                None if parameter.required => {
                    return Err(invalid(format!(
                        "missing required parameter '{}'",
                        parameter.name
                    )));
                }
                _ => {}
            }
        }

        Ok(arguments)
    }
}

/// A tool that can be used by a model.
pub struct Tool {
    pub schema: ToolSchema,
    pub function: ToolHandler,
}

impl Tool {
    pub fn new(
        schema: ToolSchema,
        function: impl Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Tool {
            schema,
            function: Box::new(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }
}

impl Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("schema", &self.schema)
            .field("function", &"<function>")
            .finish()
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// The argument object exactly as the model sent it
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new<I, N, A>(id: I, name: N, arguments: A) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location_schema() -> ToolSchema {
        ToolSchema::new("get_current_weather", "Get the current weather in a given location")
            .with_parameter(Parameter::required(
                "location",
                ParameterType::String,
                "The city and state, e.g. San Francisco, CA",
            ))
            .with_parameter(Parameter::optional(
                "days",
                ParameterType::Integer,
                "How many days to forecast",
            ))
    }

    #[test]
    fn test_parameters_json() {
        let spec = location_schema().parameters_json();
        assert_eq!(spec["type"], "object");
        assert_eq!(spec["properties"]["location"]["type"], "string");
        assert_eq!(spec["properties"]["days"]["type"], "integer");
        assert_eq!(spec["required"], json!(["location"]));
    }

    #[test]
    fn test_parameters_json_without_parameters() {
        let spec = ToolSchema::new("get_weather", "Returns the current weather (mock).").parameters_json();
        assert_eq!(
            spec,
            json!({"type": "object", "properties": {}, "required": []})
        );
    }

    #[test]
    fn test_parse_arguments() {
        let schema = location_schema();
        let args = schema
            .parse_arguments(r#"{"location": "Chicago, IL", "days": 3}"#)
            .unwrap();
        assert_eq!(args["location"], "Chicago, IL");
        assert_eq!(args["days"], 3);

        let args = schema.parse_arguments(r#"{"location": "Chicago, IL"}"#).unwrap();
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_parse_empty_arguments() {
        let schema = ToolSchema::new("get_weather", "mock");
        assert!(schema.parse_arguments("").unwrap().is_empty());
        assert!(schema.parse_arguments("  ").unwrap().is_empty());
        assert!(schema.parse_arguments("{}").unwrap().is_empty());
        assert!(schema.parse_arguments("null").unwrap().is_empty());
    }

    #[test]
    fn test_parse_arguments_rejects_bad_payloads() {
        let schema = location_schema();
        let cases = [
            ("invalid json {", "line"),
            ("[1, 2]", "expected a JSON object"),
            (r#"{"days": 3}"#, "missing required parameter 'location'"),
            (r#"{"location": 42}"#, "must be of type string"),
            (r#"{"location": "x", "days": 1.5}"#, "must be of type integer"),
            (r#"{"location": "x", "unit": "c"}"#, "unexpected parameter 'unit'"),
        ];

        for (payload, expected) in cases {
            match schema.parse_arguments(payload) {
                Err(ToolError::ArgumentParse { tool, reason }) => {
                    assert_eq!(tool, "get_current_weather");
                    assert!(reason.contains(expected), "{} -> {}", payload, reason);
                }
                other => panic!("expected argument error for {}, got {:?}", payload, other),
            }
        }
    }

    #[test]
    fn test_tool_function_execution() {
        let tool = Tool::new(location_schema(), |args| {
            Ok(json!({ "location": args["location"], "temperature": 72 }))
        });

        let args = tool.schema.parse_arguments(r#"{"location": "Chicago, IL"}"#).unwrap();
        let result = (tool.function)(&args).unwrap();
        assert_eq!(result["temperature"], 72);
        assert_eq!(result["location"], "Chicago, IL");
    }

    #[test]
    fn test_tool_debug_output() {
        let tool = Tool::new(ToolSchema::new("test_tool", "Test description"), |_| Ok(json!({})));

        let debug_output = format!("{:?}", tool);
        assert!(debug_output.contains("test_tool"));
        assert!(debug_output.contains("Test description"));
        assert!(debug_output.contains("<function>"));
    }
}
