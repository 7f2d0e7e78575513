//! The tool-chain driver.

use std::rc::Rc;

use tracing::debug;

use crate::callback::Callback;
use crate::command::{CommandRunner, RunOptions};
use crate::error::{CommandError, RegistryError, ToolError};
use crate::param::ValueMap;
use crate::plugin::frontend::FrontEnd;
use crate::plugin::tool::{Tool, ToolDecl};
use crate::registry::PluginRegistry;

/// Binds a front-end to a queue of tools and drives them in order.
///
/// Tools communicate across the chain through the shared `tool_data`
/// bag: each queued tool is constructed from the bag's current contents,
/// and anything it writes there is visible to the tools after it. A
/// running tool may also append to the chain; the driver re-reads the
/// chain length every step, so additions made mid-run are executed.
pub struct Interface {
    frontend: Box<dyn FrontEnd>,
    registry: Option<Rc<PluginRegistry>>,
    chain: Vec<ToolDecl>,
    current_tool_index: Option<usize>,

    /// Data shared by every tool in the chain.
    pub tool_data: ValueMap,
    /// Subprocess launcher with the interface's working environment.
    pub command_runner: CommandRunner,
    /// Mirrors each subprocess stdout line.
    pub on_write_stdout: Callback<str>,
    /// Mirrors each subprocess stderr line.
    pub on_write_stderr: Callback<str>,
    /// Fired after any chain mutation (add or clear).
    pub on_tool_chain_modified: Callback<()>,
}

impl Interface {
    pub fn new(frontend: Box<dyn FrontEnd>) -> Self {
        Self {
            frontend,
            registry: None,
            chain: Vec::new(),
            current_tool_index: None,
            tool_data: ValueMap::new(),
            command_runner: CommandRunner::new(),
            on_write_stdout: Callback::new(),
            on_write_stderr: Callback::new(),
            on_tool_chain_modified: Callback::new(),
        }
    }

    /// An interface that can resolve tool names through `registry`.
    pub fn with_registry(frontend: Box<dyn FrontEnd>, registry: Rc<PluginRegistry>) -> Self {
        let mut interface = Self::new(frontend);
        interface.registry = Some(registry);
        interface
    }

    /// Append a tool declaration to the chain.
    pub fn add_tool(&mut self, decl: ToolDecl) {
        debug!(tool = %decl.name, "queueing tool");
        self.chain.push(decl);
        self.on_tool_chain_modified.invoke(&());
    }

    /// Append a tool by registry name.
    pub fn add_tool_named(&mut self, name: &str) -> Result<(), RegistryError> {
        let registry = self
            .registry
            .as_ref()
            .ok_or_else(|| RegistryError::ToolNotFound(name.to_string()))?;
        let decl = registry.get_tool(name)?.clone();
        self.add_tool(decl);
        Ok(())
    }

    pub fn clear_tool_chain(&mut self) {
        self.chain.clear();
        self.current_tool_index = None;
        self.on_tool_chain_modified.invoke(&());
    }

    pub fn tool_count(&self) -> usize {
        self.chain.len()
    }

    pub fn get_tool(&self, index: usize) -> Option<&ToolDecl> {
        self.chain.get(index)
    }

    /// Index of the tool currently (or most recently) running; `None`
    /// before the chain starts.
    pub fn current_tool_index(&self) -> Option<usize> {
        self.current_tool_index
    }

    /// Resolve a single tool's parameters and execute it.
    ///
    /// Hidden parameters are silently assigned their validated default;
    /// visible parameters go through the front-end's prompt. Prompting
    /// happens in declaration order.
    pub fn invoke(&mut self, tool: &mut dyn Tool) -> Result<i32, ToolError> {
        for param in tool.params().iter() {
            if param.hidden() {
                let validated = param.validate(param.default())?;
                param.set_value(validated);
            } else {
                self.frontend.prompt_parameter(param)?;
            }
        }
        tool.execute(self)
    }

    /// Drive the chain to completion.
    ///
    /// Each step constructs the next tool from the current `tool_data`
    /// and invokes it. A non-zero result stops the chain and is
    /// returned; a construction or execution error is reported through
    /// the front-end and yields `1`; an exhausted chain yields `0`. The
    /// chain length is re-read every step, so tools appended mid-run are
    /// picked up.
    pub fn run(&mut self) -> i32 {
        loop {
            let next = self.current_tool_index.map_or(0, |index| index + 1);
            if next >= self.chain.len() {
                return 0;
            }
            self.current_tool_index = Some(next);

            let decl = self.chain[next].clone();
            debug!(tool = %decl.name, index = next, "running tool");
            let mut tool = match decl.construct(&self.tool_data) {
                Ok(tool) => tool,
                Err(err) => {
                    self.error(&format!("could not construct tool {}", decl.name), Some(&err.to_string()));
                    return 1;
                }
            };
            match self.invoke(tool.as_mut()) {
                Ok(0) => {}
                Ok(code) => return code,
                Err(err) => {
                    self.error(&err.to_string(), None);
                    return 1;
                }
            }
        }
    }

    pub fn message(&mut self, message: &str) {
        self.frontend.message(message);
    }

    pub fn warning(&mut self, message: &str) {
        self.frontend.warning(message);
    }

    pub fn error(&mut self, message: &str, details: Option<&str>) {
        self.frontend.error(message, details);
    }

    pub fn ask(&mut self, question: &str) -> bool {
        self.frontend.ask(question)
    }

    pub fn progress_start(&mut self) {
        self.frontend.progress_start();
    }

    pub fn progress_update(&mut self, message: &str, fraction: f64) {
        self.frontend.progress_update(message, fraction);
    }

    pub fn progress_end(&mut self) {
        self.frontend.progress_end();
    }

    pub fn write_stdout(&self, line: &str) {
        self.on_write_stdout.invoke(line);
    }

    pub fn write_stderr(&self, line: &str) {
        self.on_write_stderr.invoke(line);
    }

    /// Run a shell command through the interface's [`CommandRunner`],
    /// mirroring each output line to the stdout/stderr callbacks.
    pub fn run_subprocess(&self, command: &str) -> Result<i32, CommandError> {
        let stdout = |line: &str| self.write_stdout(line);
        let stderr = |line: &str| self.write_stderr(line);
        let options = RunOptions {
            on_stdout_line: Some(&stdout),
            on_stderr_line: Some(&stderr),
            ..RunOptions::default()
        };
        let result = self.command_runner.run_shell_with(command, &options)?;
        Ok(result.exit_code)
    }
}

impl std::fmt::Debug for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interface")
            .field("chain", &self.chain)
            .field("current_tool_index", &self.current_tool_index)
            .field("tool_data", &self.tool_data)
            .finish()
    }
}
