//! Validator Chain.
//!
//! [`validate`] runs, in order:
//! 1. required-option and type coercion checks per descriptor,
//! 2. option-set exclusivity,
//! 3. the command's own validators, in declaration order.
//!
//! The first failure short-circuits and becomes the rejection message.
//! Nothing here issues the command's primary request.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::args::{OptionValue, ParsedArgs, RawArgs};
use crate::command::CommandDefinition;
use crate::error::CommandError;
use crate::options::{DEBUG, GlobalOptions, OUTPUT, OptionSchema, OptionType, VERBOSE};

/// Result of one validator: `Ok` to continue, `Err` with the message shown
/// to the user.
pub type Validation = Result<(), String>;

/// A predicate over parsed arguments. May be asynchronous.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, args: &ParsedArgs) -> Validation;
}

/// Adapter for synchronous closures. Created by [`from_fn`].
pub struct FnValidator<F>(F);

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(&ParsedArgs) -> Validation + Send + Sync,
{
    async fn validate(&self, args: &ParsedArgs) -> Validation {
        (self.0)(args)
    }
}

pub fn from_fn<F>(f: F) -> FnValidator<F>
where
    F: Fn(&ParsedArgs) -> Validation + Send + Sync,
{
    FnValidator(f)
}

/// Append-only, ordered list of validators owned by a command.
#[derive(Default)]
pub struct ValidatorChain {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorChain {
    pub fn push(&mut self, validator: impl Validator + 'static) {
        self.validators.push(Box::new(validator));
    }

    /// Runs validators sequentially. The first rejection wins.
    pub async fn run(&self, args: &ParsedArgs) -> Validation {
        for validator in &self.validators {
            validator.validate(args).await?;
        }
        Ok(())
    }
}

/// Coerces `raw` against the command's schema and runs the full chain.
pub async fn validate(
    definition: &CommandDefinition,
    raw: RawArgs,
) -> Result<ParsedArgs, CommandError> {
    let args = coerce(definition.schema(), raw).map_err(CommandError::validation)?;
    check_option_sets(definition.schema(), &args).map_err(CommandError::validation)?;
    definition
        .validators()
        .run(&args)
        .await
        .map_err(CommandError::validation)?;
    Ok(args)
}

fn coerce(schema: &OptionSchema, raw: RawArgs) -> Result<ParsedArgs, String> {
    let RawArgs { values: mut raw_values, extras } = raw;

    let mut values = BTreeMap::new();
    for descriptor in schema.all_options() {
        let Some(raw_value) = raw_values.remove(descriptor.long) else {
            if descriptor.required {
                return Err(format!("Required option {} not specified", descriptor.long));
            }
            continue;
        };

        let value = match descriptor.kind {
            OptionType::String => OptionValue::String(raw_value),
            OptionType::Boolean => match raw_value.as_str() {
                "true" => OptionValue::Boolean(true),
                "false" => OptionValue::Boolean(false),
                other => {
                    return Err(format!(
                        "Option '{}' expects a boolean value (true or false) but got '{other}'",
                        descriptor.long
                    ));
                }
            },
            OptionType::Number => match raw_value.parse::<f64>() {
                Ok(n) if n.is_finite() => OptionValue::Number(n),
                _ => {
                    return Err(format!(
                        "Option '{}' expects a number but got '{raw_value}'",
                        descriptor.long
                    ));
                }
            },
        };
        values.insert(descriptor.long.to_string(), value);
    }

    if let Some(name) = raw_values.keys().next() {
        return Err(format!("Invalid option: '{name}'"));
    }

    let global = global_options(&mut values)?;
    Ok(ParsedArgs::new(values, extras, global))
}

/// Moves the global options out of the command's value map.
fn global_options(values: &mut BTreeMap<String, OptionValue>) -> Result<GlobalOptions, String> {
    let flag = |value: Option<OptionValue>| matches!(value, Some(OptionValue::Boolean(true)));
    let debug = flag(values.remove(DEBUG));
    let verbose = flag(values.remove(VERBOSE)) || debug;
    let output = match values.remove(OUTPUT) {
        Some(OptionValue::String(s)) => s.parse()?,
        _ => Default::default(),
    };
    Ok(GlobalOptions {
        debug,
        verbose,
        output,
    })
}

fn check_option_sets(schema: &OptionSchema, args: &ParsedArgs) -> Validation {
    for set in schema.option_sets() {
        let present = set
            .options
            .iter()
            .filter(|name| args.is_present(name))
            .count();
        let members = set.options.join(", ");
        if present == 0 && !set.optional {
            return Err(format!("Specify one of the following options: {members}."));
        }
        if present > 1 {
            return Err(format!(
                "Specify one of the following options: {members}, but not multiple."
            ));
        }
    }
    Ok(())
}

static GUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\{?[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\}?$")
        .expect("GUID pattern is valid")
});

pub fn is_valid_guid(value: &str) -> bool {
    GUID.is_match(value)
}

/// Accepts absolute `https://` URLs with a host.
pub fn is_valid_sharepoint_url(value: &str) -> Validation {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "https" && url.host_str().is_some() => Ok(()),
        _ => Err(format!("'{value}' is not a valid SharePoint Online site URL")),
    }
}

/// Rejects `option` when it is present and not a GUID.
pub fn guid_option(option: &'static str) -> impl Validator {
    from_fn(move |args: &ParsedArgs| match args.get_str(option) {
        Some(value) if !is_valid_guid(value) => Err(format!("{value} is not a valid GUID")),
        _ => Ok(()),
    })
}
