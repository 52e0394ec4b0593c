use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::errors::{ToolError, ToolResult};
use crate::models::tool::{Tool, ToolSchema};

/// The tools the model may call, keyed by name and kept in registration order
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, failing if its name is already taken or could not be sent to the model
    pub fn register(&mut self, tool: Tool) -> ToolResult<()> {
        let name = tool.name().to_string();
        if !is_valid_function_name(&name) {
            return Err(ToolError::InvalidName(name));
        }
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }

        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> ToolResult<&Tool> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Schemas of every registered tool, in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|tool| tool.schema.clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(Tool::name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

lazy_static! {
    static ref FUNCTION_NAME: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").expect("function name pattern");
}

fn is_valid_function_name(name: &str) -> bool {
    FUNCTION_NAME.is_match(name)
}
