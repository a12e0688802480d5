//! The [`Command`] trait every concrete command implements, and the
//! per-invocation [`CommandContext`].

use async_trait::async_trait;
use serde_json::Value;

use crate::args::ParsedArgs;
use crate::client::HttpClient;
use crate::error::CommandError;
use crate::options::{OptionDescriptor, OptionSchema, OptionSet};
use crate::output::Renderer;
use crate::session::Session;
use crate::validation::{Validator, ValidatorChain};

/// Everything a command declares at construction time: its option schema
/// and its validator chain.
#[derive(Default)]
pub struct CommandDefinition {
    schema: OptionSchema,
    validators: ValidatorChain,
}

impl CommandDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn option(mut self, option: OptionDescriptor) -> Self {
        self.schema.push_option(option);
        self
    }

    pub fn option_set(mut self, set: OptionSet) -> Self {
        self.schema.push_option_set(set);
        self
    }

    /// Accept undeclared options and keep them as untyped extras.
    pub fn allow_unknown_options(mut self) -> Self {
        self.schema.set_allows_unknown_options(true);
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn schema(&self) -> &OptionSchema {
        &self.schema
    }

    pub fn validators(&self) -> &ValidatorChain {
        &self.validators
    }
}

/// Collaborators available to a command body for one invocation.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub session: &'a Session,
    pub http: &'a dyn HttpClient,
    pub renderer: &'a dyn Renderer,
}

#[async_trait]
pub trait Command: Send + Sync {
    /// Verb path, e.g. `"aad user set"`.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn definition(&self) -> &CommandDefinition;

    /// Properties shown by text and csv output.
    fn default_properties(&self) -> Option<&'static [&'static str]> {
        None
    }

    fn requires_connection(&self) -> bool {
        true
    }

    /// The command body. Returns the value to render, if any.
    async fn run(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, CommandError>;
}
