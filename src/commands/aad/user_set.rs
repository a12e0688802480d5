use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{OBJECT_ID, user_option_set, user_options, user_url};
use crate::args::ParsedArgs;
use crate::command::{Command, CommandContext, CommandDefinition};
use crate::error::CommandError;
use crate::options::OptionDescriptor;
use crate::request::{ACCEPT_JSON, RequestDescriptor};
use crate::validation::guid_option;

const ACCOUNT_ENABLED: &str = "accountEnabled";

/// `aad user set`: updates properties of a user.
///
/// Options the command does not declare are forwarded into the PATCH body
/// as string values, so any writable user property can be set.
pub struct UserSet {
    definition: CommandDefinition,
}

impl UserSet {
    pub fn new() -> Self {
        let [object_id, upn] = user_options();
        UserSet {
            definition: CommandDefinition::new()
                .option(object_id)
                .option(upn)
                .option(
                    OptionDescriptor::boolean(ACCOUNT_ENABLED)
                        .autocomplete(&["true", "false"])
                        .help("Whether the account is enabled"),
                )
                .option_set(user_option_set())
                .allow_unknown_options()
                .validator(guid_option(OBJECT_ID)),
        }
    }
}

impl Default for UserSet {
    fn default() -> Self {
        Self::new()
    }
}

/// PATCH payload: `AccountEnabled` when given, then every extra verbatim.
fn request_body(args: &ParsedArgs) -> Value {
    let mut body = Map::new();
    if let Some(enabled) = args.get_bool(ACCOUNT_ENABLED) {
        body.insert("AccountEnabled".to_string(), Value::Bool(enabled));
    }
    for (name, value) in args.extras() {
        body.insert(name.clone(), Value::String(value.clone()));
    }
    Value::Object(body)
}

#[async_trait]
impl Command for UserSet {
    fn name(&self) -> &'static str {
        "aad user set"
    }

    fn description(&self) -> &'static str {
        "Updates information about the specified user"
    }

    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    async fn run(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, CommandError> {
        let request = RequestDescriptor::patch(user_url(ctx.session, args))
            .accept(ACCEPT_JSON)
            .json(request_body(args));
        ctx.http.send(request).await?;
        Ok(None)
    }
}
