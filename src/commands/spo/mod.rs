//! SharePoint Online commands.
//!
//! SharePoint REST calls need the tenant root URL. It comes from the
//! session when configured and is otherwise discovered through Graph.

mod app_list;

pub use app_list::AppList;

use serde_json::Value;
use tracing::debug;

use crate::command::CommandContext;
use crate::error::CommandError;
use crate::request::{ACCEPT_JSON, ACCEPT_JSON_NOMETADATA, RequestDescriptor};

pub const CATALOG_NOT_CONFIGURED: &str = "Tenant app catalog is not configured.";

/// Tenant root URL, e.g. `https://contoso.sharepoint.com`.
pub async fn spo_url(ctx: &CommandContext<'_>) -> Result<String, CommandError> {
    if let Some(url) = ctx.session.spo_url() {
        return Ok(url.to_string());
    }

    let url = format!("{}/v1.0/sites/root?$select=webUrl", ctx.session.graph_url());
    let site = ctx
        .http
        .send(RequestDescriptor::get(url).accept(ACCEPT_JSON))
        .await?;
    let web_url = site
        .get("webUrl")
        .and_then(Value::as_str)
        .ok_or_else(|| CommandError::unexpected("SharePoint root site has no webUrl"))?;
    debug!(web_url, "discovered SharePoint URL");
    Ok(web_url.trim_end_matches('/').to_string())
}

/// URL of the tenant app catalog site.
pub async fn tenant_app_catalog_url(ctx: &CommandContext<'_>) -> Result<String, CommandError> {
    let spo_url = spo_url(ctx).await?;
    let settings = ctx
        .http
        .send(
            RequestDescriptor::get(format!("{spo_url}/_api/SP_TenantSettings_Current"))
                .accept(ACCEPT_JSON_NOMETADATA),
        )
        .await?;
    settings
        .get("CorporateCatalogUrl")
        .and_then(Value::as_str)
        .map(|url| url.trim().trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CommandError::precondition(CATALOG_NOT_CONFIGURED))
}
