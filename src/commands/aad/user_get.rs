use async_trait::async_trait;
use serde_json::Value;

use super::{OBJECT_ID, user_option_set, user_options, user_url};
use crate::args::ParsedArgs;
use crate::command::{Command, CommandContext, CommandDefinition};
use crate::error::CommandError;
use crate::options::OptionDescriptor;
use crate::request::{ACCEPT_JSON, RequestDescriptor, encode_query_value};
use crate::validation::guid_option;

const PROPERTIES: &str = "properties";

const DEFAULT_PROPERTIES: &[&str] = &["id", "displayName", "mail", "userPrincipalName"];

/// `aad user get`: retrieves a single user.
pub struct UserGet {
    definition: CommandDefinition,
}

impl UserGet {
    pub fn new() -> Self {
        let [object_id, upn] = user_options();
        UserGet {
            definition: CommandDefinition::new()
                .option(object_id)
                .option(upn)
                .option(
                    OptionDescriptor::string(PROPERTIES)
                        .short('p')
                        .help("Comma-separated list of properties to retrieve"),
                )
                .option_set(user_option_set())
                .validator(guid_option(OBJECT_ID)),
        }
    }
}

impl Default for UserGet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for UserGet {
    fn name(&self) -> &'static str {
        "aad user get"
    }

    fn description(&self) -> &'static str {
        "Gets information about the specified user"
    }

    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    fn default_properties(&self) -> Option<&'static [&'static str]> {
        Some(DEFAULT_PROPERTIES)
    }

    async fn run(
        &self,
        ctx: &CommandContext<'_>,
        args: &ParsedArgs,
    ) -> Result<Option<Value>, CommandError> {
        let mut url = user_url(ctx.session, args);
        if let Some(properties) = args.get_str(PROPERTIES) {
            let select = properties
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(",");
            url = format!("{url}?$select={}", encode_query_value(&select));
        }
        let user = ctx
            .http
            .send(RequestDescriptor::get(url).accept(ACCEPT_JSON))
            .await?;
        Ok(Some(user))
    }
}
