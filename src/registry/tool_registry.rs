/// Tool registry implementation
///
/// Keeps tools in registration order (that is the order `tools/list`
/// reports) with a name index for lookup.

use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, info};

use crate::dispatch::{ExecutionContext, ToolError, ToolOutput};
use crate::domain::{Arguments, ParameterSpec};
use crate::registry::{RegistryError, Tool};

/// Registry lifecycle: Open accepts registrations, Frozen never again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Open,
    Frozen,
}

#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    index: HashMap<String, usize>,
    state: RegistryState,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            state: RegistryState::Open,
        }
    }

    /// Add a tool to the registry
    ///
    /// Fails if the registry is frozen or the name is taken. A failed
    /// registration leaves the registry exactly as it was.
    pub fn register(&mut self, tool: Tool) -> Result<(), RegistryError> {
        if self.state == RegistryState::Frozen {
            return Err(RegistryError::RegistryFrozen(tool.name().to_string()));
        }

        if self.index.contains_key(tool.name()) {
            return Err(RegistryError::DuplicateName(tool.name().to_string()));
        }

        debug!("Registered tool '{}' ({} parameters)", tool.name(), tool.parameters().len());
        self.index.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Register a tool from its parts and an async closure handler
    pub fn register_tool<F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParameterSpec>,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Arguments, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
    {
        self.register(Tool::from_fn(name, description, parameters, handler))
    }

    pub fn lookup(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Make the registry read-only; calling it again is a no-op
    pub fn freeze(&mut self) {
        if self.state == RegistryState::Open {
            info!("Tool registry frozen with {} tools", self.tools.len());
            self.state = RegistryState::Frozen;
        }
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state == RegistryState::Frozen
    }

    /// All tools in registration order
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
