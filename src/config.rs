/// Default bound on concurrently executing handlers
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Server configuration
///
/// Identification reported to clients on `initialize`, and the knobs of the
/// transport loop's scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server name as reported in `serverInfo`
    pub name: String,
    /// Server version as reported in `serverInfo`
    pub version: String,
    /// Run tool calls as independent tasks. When false, requests are
    /// processed strictly in arrival order and responses follow that order.
    pub concurrent: bool,
    /// Upper bound on handlers running at once in concurrent mode
    ///
    /// Only running handlers count. Reading continues while the bound is
    /// reached, and calls waiting for a slot are queued without limit.
    pub max_in_flight: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Hello World MCP Server".to_string(),
            version: "1.0.0".to_string(),
            concurrent: true,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl ServerConfig {
    /// Same configuration with concurrency disabled
    pub fn sequential(mut self) -> Self {
        self.concurrent = false;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }
}
