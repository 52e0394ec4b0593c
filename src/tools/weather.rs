use rand::seq::SliceRandom;
use serde_json::Value;

use crate::models::tool::{Tool, ToolSchema};

pub const CONDITIONS: [&str; 3] = ["sunny", "rainy", "cloudy"];

/// The weather chat opens with an empty system message
pub const SYSTEM_PROMPT: &str = "";

/// A random weather condition, standing in for a real forecast
pub fn get_weather() -> &'static str {
    CONDITIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CONDITIONS[0])
}

pub fn weather_tool() -> Tool {
    Tool::new(
        ToolSchema::new("get_weather", "Returns the current weather (mock)."),
        |_| Ok(Value::String(get_weather().to_string())),
    )
}
