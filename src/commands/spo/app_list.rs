use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::tenant_app_catalog_url;
use crate::args::ParsedArgs;
use crate::command::{Command, CommandContext, CommandDefinition};
use crate::error::CommandError;
use crate::options::OptionDescriptor;
use crate::request::{ACCEPT_JSON_NOMETADATA, RequestDescriptor};
use crate::validation::{from_fn, is_valid_sharepoint_url};

const APP_CATALOG_SCOPE: &str = "appCatalogScope";
const APP_CATALOG_URL: &str = "appCatalogUrl";

const TENANT: &str = "tenant";
const SITE_COLLECTION: &str = "sitecollection";

const DEFAULT_PROPERTIES: &[&str] = &["Title", "ID", "Deployed", "AppCatalogVersion"];

/// `spo app list`: lists apps in the tenant or a site collection app catalog.
pub struct AppList {
    definition: CommandDefinition,
}

impl AppList {
    pub fn new() -> Self {
        AppList {
            definition: CommandDefinition::new()
                .option(
                    OptionDescriptor::string(APP_CATALOG_SCOPE)
                        .short('s')
                        .autocomplete(&[TENANT, SITE_COLLECTION])
                        .help("Scope of the app catalog. Default tenant"),
                )
                .option(
                    OptionDescriptor::string(APP_CATALOG_URL)
                        .short('u')
                        .help("URL of the site collection app catalog"),
                )
                .validator(from_fn(|args: &ParsedArgs| match scope(args) {
                    Some(scope) if scope != TENANT && scope != SITE_COLLECTION => Err(format!(
                        "{APP_CATALOG_SCOPE} must be either '{TENANT}' or '{SITE_COLLECTION}' if specified"
                    )),
                    _ => Ok(()),
                }))
                .validator(from_fn(|args: &ParsedArgs| {
                    if scope(args).as_deref() == Some(SITE_COLLECTION)
                        && !args.is_present(APP_CATALOG_URL)
                    {
                        return Err(format!(
                            "You must specify {APP_CATALOG_URL} when the {APP_CATALOG_SCOPE} is {SITE_COLLECTION}"
                        ));
                    }
                    Ok(())
                }))
                .validator(from_fn(|args: &ParsedArgs| {
                    match args.get_str(APP_CATALOG_URL) {
                        Some(url) => is_valid_sharepoint_url(url),
                        None => Ok(()),
                    }
                })),
        }
    }
}

impl Default for AppList {
    fn default() -> Self {
        Self::new()
    }
}

fn scope(args: &ParsedArgs) -> Option<String> {
    args.get_str(APP_CATALOG_SCOPE).map(str::to_lowercase)
}

#[async_trait]
impl Command for AppList {
    fn name(&self) -> &'static str {
        "spo app list"
    }

    fn description(&self) -> &'static str {
        "Lists apps from the specified app catalog"
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
        let scope = scope(args).unwrap_or_else(|| TENANT.to_string());
        let catalog_url = if scope == SITE_COLLECTION {
            args.get_str(APP_CATALOG_URL)
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string()
        } else {
            tenant_app_catalog_url(ctx).await?
        };

        info!(catalog_url = %catalog_url, scope = %scope, "retrieving apps");

        let response = ctx
            .http
            .send(
                RequestDescriptor::get(format!(
                    "{catalog_url}/_api/web/{scope}appcatalog/AvailableApps"
                ))
                .accept(ACCEPT_JSON_NOMETADATA),
            )
            .await?;

        match response.get("value").and_then(Value::as_array) {
            Some(apps) if !apps.is_empty() => Ok(Some(Value::Array(apps.clone()))),
            _ => {
                if args.is_verbose() {
                    ctx.renderer.status("No apps found.");
                }
                Ok(None)
            }
        }
    }
}
