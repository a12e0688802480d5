//! Execution Engine.
//!
//! [`execute`] runs one invocation: parse tokens against the command's
//! schema, validate, check the session, invoke the command body, and hand
//! any result to the renderer. Failures from the body are already
//! normalized (`RequestError` converts into `CommandError` through `?`).
//! Nothing is retried.

use tracing::{debug, info};

use crate::args::parse_tokens;
use crate::command::{Command, CommandContext};
use crate::error::CommandError;
use crate::output::RenderOptions;
use crate::validation::validate;

pub const NOT_CONNECTED: &str = "Log in to Microsoft 365 first";

pub async fn execute<S: AsRef<str>>(
    command: &dyn Command,
    ctx: &CommandContext<'_>,
    tokens: &[S],
) -> Result<(), CommandError> {
    let definition = command.definition();

    let raw = parse_tokens(definition.schema(), tokens)?;
    let args = validate(definition, raw).await?;
    debug!(command = command.name(), ?args, "arguments validated");

    if command.requires_connection() && !ctx.session.is_connected() {
        return Err(CommandError::precondition(NOT_CONNECTED));
    }

    info!(command = command.name(), "executing command");
    let output = command.run(ctx, &args).await.inspect_err(|err| {
        debug!(kind = ?err.kind, code = ?err.code, body = ?err.body, "command failed");
    })?;

    if let Some(value) = output {
        ctx.renderer.render(
            &value,
            &RenderOptions {
                format: args.global().output,
                default_properties: command.default_properties(),
            },
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ParsedArgs;
    use crate::client::HttpClient;
    use crate::command::CommandDefinition;
    use crate::error::{ErrorKind, RequestError};
    use crate::options::{OptionDescriptor, OptionSet};
    use crate::output::MemoryRenderer;
    use crate::request::RequestDescriptor;
    use crate::session::Session;
    use crate::validation::from_fn;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Answers every request with a canned result and records the URLs.
    struct StubClient {
        response: Result<Value, (u16, &'static str)>,
        urls: Mutex<Vec<String>>,
    }

    impl StubClient {
        fn ok(value: Value) -> Self {
            StubClient {
                response: Ok(value),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16, body: &'static str) -> Self {
            StubClient {
                response: Err((status, body)),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.urls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpClient for StubClient {
        async fn send(&self, request: RequestDescriptor) -> Result<Value, RequestError> {
            self.urls.lock().unwrap().push(request.url);
            match &self.response {
                Ok(value) => Ok(value.clone()),
                Err((status, body)) => Err(RequestError::Http {
                    status: StatusCode::from_u16(*status).unwrap(),
                    body: body.to_string(),
                }),
            }
        }
    }

    const PROBE_PROPERTIES: &[&str] = &["id"];

    struct Probe {
        definition: CommandDefinition,
    }

    impl Probe {
        fn new() -> Self {
            Probe {
                definition: CommandDefinition::new()
                    .option(OptionDescriptor::string("id"))
                    .option(OptionDescriptor::string("name"))
                    .option_set(OptionSet::new(&["id", "name"]))
                    .validator(from_fn(|args: &ParsedArgs| match args.get_str("name") {
                        Some("forbidden") => Err("name is forbidden".to_string()),
                        _ => Ok(()),
                    })),
            }
        }
    }

    #[async_trait]
    impl Command for Probe {
        fn name(&self) -> &'static str {
            "probe get"
        }

        fn description(&self) -> &'static str {
            "Gets a probe"
        }

        fn definition(&self) -> &CommandDefinition {
            &self.definition
        }

        fn default_properties(&self) -> Option<&'static [&'static str]> {
            Some(PROBE_PROPERTIES)
        }

        async fn run(
            &self,
            ctx: &CommandContext<'_>,
            args: &ParsedArgs,
        ) -> Result<Option<Value>, CommandError> {
            let id = args.get_str("id").or(args.get_str("name")).unwrap_or_default();
            let value = ctx
                .http
                .send(RequestDescriptor::get(format!("https://example.test/probes/{id}")))
                .await?;
            Ok((!value.is_null()).then_some(value))
        }
    }

    async fn invoke(
        session: &Session,
        http: &StubClient,
        renderer: &MemoryRenderer,
        tokens: &[&str],
    ) -> Result<(), CommandError> {
        let ctx = CommandContext {
            session,
            http,
            renderer,
        };
        execute(&Probe::new(), &ctx, tokens).await
    }

    fn session() -> Session {
        Session::connected("https://graph.microsoft.com", None)
    }

    #[tokio::test]
    async fn successful_invocation_renders_output() {
        let http = StubClient::ok(json!({"id": "1"}));
        let renderer = MemoryRenderer::default();
        invoke(&session(), &http, &renderer, &["--id", "1"]).await.unwrap();
        assert_eq!(renderer.values(), vec![json!({"id": "1"})]);
        assert_eq!(http.calls(), 1);
    }

    #[tokio::test]
    async fn validation_failure_issues_no_request() {
        let http = StubClient::ok(json!({}));
        let renderer = MemoryRenderer::default();

        for tokens in [
            vec![],
            vec!["--id", "1", "--name", "x"],
            vec!["--name", "forbidden"],
            vec!["--id", "1", "--unknown", "x"],
        ] {
            let err = invoke(&session(), &http, &renderer, &tokens).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{tokens:?}");
        }
        assert_eq!(http.calls(), 0);
        assert_eq!(renderer.line_count(), 0);
    }

    #[tokio::test]
    async fn validator_message_is_surfaced_verbatim() {
        let http = StubClient::ok(json!({}));
        let renderer = MemoryRenderer::default();
        let err = invoke(&session(), &http, &renderer, &["--name", "forbidden"])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "name is forbidden");
    }

    #[tokio::test]
    async fn disconnected_session_fails_before_request() {
        let http = StubClient::ok(json!({}));
        let renderer = MemoryRenderer::default();
        let err = invoke(&Session::disconnected(), &http, &renderer, &["--id", "1"])
            .await
            .unwrap_err();
        assert_eq!(err.message, NOT_CONNECTED);
        assert_eq!(err.kind, ErrorKind::Precondition);
        assert_eq!(http.calls(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_normalized_and_not_retried() {
        let http = StubClient::failing(
            404,
            r#"{"error":{"code":"Request_ResourceNotFound","message":"Resource '1' does not exist."}}"#,
        );
        let renderer = MemoryRenderer::default();
        let err = invoke(&session(), &http, &renderer, &["--id", "1"])
            .await
            .unwrap_err();
        assert_eq!(err.message, "Resource '1' does not exist.");
        assert_eq!(err.code.as_deref(), Some("Request_ResourceNotFound"));
        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(http.calls(), 1);
        assert_eq!(renderer.line_count(), 0);
    }

    #[tokio::test]
    async fn no_output_renders_nothing() {
        let http = StubClient::ok(Value::Null);
        let renderer = MemoryRenderer::default();
        invoke(&session(), &http, &renderer, &["--id", "1"]).await.unwrap();
        assert_eq!(renderer.line_count(), 0);
    }
}
