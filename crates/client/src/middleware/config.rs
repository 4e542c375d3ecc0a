use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A deferred configuration callback, evaluated by the middleware whenever it
/// needs the value.
pub type ConfigBlock = Arc<dyn Fn() -> Value + Send + Sync>;

/// Configuration handed to [`MiddlewareDefinition::build`](super::MiddlewareDefinition::build).
///
/// Positional `args` and an optional zero-argument `block`.
#[derive(Clone, Default)]
pub struct MiddlewareConfig {
    args: Vec<Value>,
    block: Option<ConfigBlock>,
}

impl MiddlewareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Sets the configuration callback, replacing any previous one
    #[must_use]
    pub fn block<F, T>(mut self, f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Into<Value>,
    {
        self.block = Some(Arc::new(move || f().into()));
        self
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    /// Returns a handle to the callback, for middleware that evaluate it later
    pub fn block_fn(&self) -> Option<ConfigBlock> {
        self.block.as_ref().map(Arc::clone)
    }

    pub fn call_block(&self) -> Option<Value> {
        self.block.as_ref().map(|block| block())
    }
}

impl fmt::Debug for MiddlewareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareConfig").field("args", &self.args).field("block", &self.block.is_some()).finish()
    }
}
