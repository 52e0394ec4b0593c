use anyhow::{anyhow, Context, Result};
use indoc::indoc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Command;
use tracing::debug;

use crate::config::EnvConfig;
use crate::errors::ConfigError;
use crate::models::tool::{Parameter, ParameterType, Tool, ToolArguments, ToolSchema};

pub const DEFAULT_CONTAINER: &str = "shared-box";
pub const SANDBOX_DIR: &str = "/home/sandbox";

pub const SYSTEM_PROMPT: &str = indoc! {r#"
    You are a container-shell operator agent.
    You can only run commands by calling the tool `run_in_container(command, workdir)`; you cannot run anything else.
    Each invocation is stateless: no directory, environment variable, or shell history is preserved between calls.
    Therefore, before every command you must specify the directory you want to work in.
    The tool will execute your command by doing:

        docker exec <container> bash -c "cd <workdir> && <command>"

    and will return:
    - stdout: the command's standard output
    - stderr: the command's standard error
    - exit_code: the numeric exit code

    Use full shell syntax (redirection, pipes, &&/||, quoting) inside the `command` string.
    Do not attempt to run `cd` by itself. Instead, always pass:

        { "command": "ls", "workdir": "/some/path" }

    to list files in `/some/path`.
    Avoid dangerous operations like `rm -rf /` or `kill -9 1`.
    Be precise, minimal, and always include both parameters.
"#};

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerConfig {
    /// Name of the running container
    pub name: String,
    /// The container runtime binary
    pub program: String,
}

impl ContainerConfig {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            program: "docker".to_string(),
        }
    }
}

impl EnvConfig for ContainerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let name = Self::get_env("TOOLCHAT_CONTAINER", false, Some(DEFAULT_CONTAINER.to_string()))?
            .unwrap_or_else(|| DEFAULT_CONTAINER.to_string());
        Ok(Self::new(name))
    }
}

/// What a command printed and how it exited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Runs shell commands inside one persistent container.
///
/// Nothing but the filesystem survives between calls: every command starts a fresh
/// `bash` in the requested working directory.
#[derive(Debug, Clone)]
pub struct ContainerExecutor {
    config: ContainerConfig,
}

impl ContainerExecutor {
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    pub fn container(&self) -> &str {
        &self.config.name
    }

    pub fn exec_args(&self, command: &str, workdir: &str) -> Vec<String> {
        vec![
            "exec".to_string(),
            self.config.name.clone(),
            "bash".to_string(),
            "-c".to_string(),
            format!("cd {} && {}", workdir, command),
        ]
    }

    /// Run a command; a non-zero exit code is a normal result, failing to start the runtime is not
    pub fn run(&self, command: &str, workdir: &str) -> Result<ExecOutput> {
        debug!(container = %self.config.name, %workdir, %command, "running command");
        let output = Command::new(&self.config.program)
            .args(self.exec_args(command, workdir))
            .output()
            .with_context(|| {
                format!(
                    "Failed to run '{} exec' in container '{}'",
                    self.config.program, self.config.name
                )
            })?;

        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            // killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

fn string_arg<'a>(args: &'a ToolArguments, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("'{}' must be a string", key))
}

pub fn run_in_container_tool(executor: ContainerExecutor) -> Tool {
    let schema = ToolSchema::new(
        "run_in_container",
        "Execute a bash command in a persistent container at a specific working directory.",
    )
    .with_parameter(Parameter::required(
        "command",
        ParameterType::String,
        "The shell command to run (supports pipes, redirects, &&, etc.)",
    ))
    .with_parameter(Parameter::required(
        "workdir",
        ParameterType::String,
        "The absolute path inside the container to cd into before running the command",
    ));

    Tool::new(schema, move |args| {
        let output = executor.run(string_arg(args, "command")?, string_arg(args, "workdir")?)?;
        Ok(Value::String(serde_json::to_string(&output)?))
    })
}
