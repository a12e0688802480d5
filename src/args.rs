//! Raw token parsing and the parsed-argument model.
//!
//! [`parse_tokens`] turns the tokens that follow a command path into
//! [`RawArgs`]: option names resolved to their long form, values still
//! uncoerced strings. Coercion to [`OptionValue`] happens in the validator
//! chain, which produces the immutable [`ParsedArgs`].
//!
//! Grammar:
//! - `--name value`, `--name=value`, `-n value`
//! - boolean options take the next token as their value unless it starts
//!   with `-`; a bare boolean flag means `true`
//! - options of any other type require a value, which may not be another
//!   `--name` or a declared `-x`
//! - unknown names are rejected unless the schema allows pass-through, in
//!   which case they are kept verbatim in [`RawArgs::extras`]

use std::collections::BTreeMap;

use crate::error::CommandError;
use crate::options::{GlobalOptions, OptionSchema, OptionType};

/// Option values before type coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArgs {
    /// Declared options (command and global), keyed by long name.
    pub values: BTreeMap<String, String>,
    /// Undeclared options, kept only when the schema allows them.
    pub extras: BTreeMap<String, String>,
}

enum Name {
    Long(String),
    Short(char),
}

/// Parses the tokens following the command path against `schema`.
pub fn parse_tokens<S: AsRef<str>>(
    schema: &OptionSchema,
    tokens: &[S],
) -> Result<RawArgs, CommandError> {
    let mut raw = RawArgs::default();
    let mut iter = tokens
        .iter()
        .map(<S as AsRef<str>>::as_ref)
        .peekable();

    let takes_value = |next: &&str| !next.starts_with("--") && !names_option(schema, next);

    while let Some(token) = iter.next() {
        let (name, inline) = split_token(token)?;

        let descriptor = match &name {
            Name::Long(long) => schema.find_long(long),
            Name::Short(short) => schema.find_short(*short),
        };

        let display = match &name {
            Name::Long(long) => long.clone(),
            Name::Short(short) => short.to_string(),
        };

        let Some(descriptor) = descriptor else {
            if !schema.allows_unknown_options() {
                return Err(CommandError::validation(format!(
                    "Invalid option: '{display}'"
                )));
            }
            let value = match inline {
                Some(value) => value,
                None => match iter.next_if(|next| !next.starts_with("--")) {
                    Some(value) => value.to_string(),
                    None => "true".to_string(),
                },
            };
            insert_once(&mut raw.extras, display, value)?;
            continue;
        };

        let value = match inline {
            Some(value) => value,
            None if descriptor.kind == OptionType::Boolean => {
                match iter.next_if(|next| !next.starts_with('-')) {
                    Some(value) => value.to_string(),
                    None => "true".to_string(),
                }
            }
            None => match iter.next_if(takes_value) {
                Some(value) => value.to_string(),
                None => {
                    return Err(CommandError::validation(format!(
                        "Option '{}' requires a value",
                        descriptor.long
                    )));
                }
            },
        };

        insert_once(&mut raw.values, descriptor.long.to_string(), value)?;
    }

    Ok(raw)
}

/// True for `-x` when `x` is a declared short name.
fn names_option(schema: &OptionSchema, token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some(short), None) => schema.find_short(short).is_some(),
        _ => false,
    }
}

fn split_token(token: &str) -> Result<(Name, Option<String>), CommandError> {
    if let Some(rest) = token.strip_prefix("--") {
        if rest.is_empty() {
            return Err(CommandError::validation("Invalid option: '--'"));
        }
        return Ok(match rest.split_once('=') {
            Some((name, value)) => (Name::Long(name.to_string()), Some(value.to_string())),
            None => (Name::Long(rest.to_string()), None),
        });
    }

    if let Some(rest) = token.strip_prefix('-') {
        let mut chars = rest.chars();
        if let (Some(short), None) = (chars.next(), chars.next()) {
            return Ok((Name::Short(short), None));
        }
    }

    Err(CommandError::validation(format!(
        "Unexpected argument '{token}'"
    )))
}

fn insert_once(
    map: &mut BTreeMap<String, String>,
    name: String,
    value: String,
) -> Result<(), CommandError> {
    if map.contains_key(&name) {
        return Err(CommandError::validation(format!(
            "Option '{name}' was specified more than once"
        )));
    }
    map.insert(name, value);
    Ok(())
}

/// A coerced option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Boolean(bool),
    Number(f64),
}

/// Arguments of one invocation after coercion.
///
/// Created by [`validate`](crate::validation::validate) and never mutated
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    values: BTreeMap<String, OptionValue>,
    extras: BTreeMap<String, String>,
    global: GlobalOptions,
}

impl ParsedArgs {
    pub(crate) fn new(
        values: BTreeMap<String, OptionValue>,
        extras: BTreeMap<String, String>,
        global: GlobalOptions,
    ) -> Self {
        ParsedArgs {
            values,
            extras,
            global,
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(OptionValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(OptionValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Undeclared options passed through by commands that allow them.
    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extras
    }

    pub fn global(&self) -> &GlobalOptions {
        &self.global
    }

    pub fn is_verbose(&self) -> bool {
        self.global.verbose || self.global.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionDescriptor;

    fn schema(allow_unknown: bool) -> OptionSchema {
        let mut schema = OptionSchema::new();
        schema.push_option(OptionDescriptor::string("objectId").short('i'));
        schema.push_option(OptionDescriptor::string("userPrincipalName").short('n'));
        schema.push_option(OptionDescriptor::boolean("accountEnabled"));
        schema.push_option(OptionDescriptor::number("top"));
        schema.set_allows_unknown_options(allow_unknown);
        schema
    }

    #[test]
    fn long_short_and_inline_forms_resolve_to_long_names() {
        let raw = parse_tokens(
            &schema(false),
            &["-i", "abc", "--top=5", "--accountEnabled", "false"],
        )
        .unwrap();
        assert_eq!(raw.values["objectId"], "abc");
        assert_eq!(raw.values["top"], "5");
        assert_eq!(raw.values["accountEnabled"], "false");
        assert!(raw.extras.is_empty());
    }

    #[test]
    fn bare_boolean_flag_means_true() {
        let raw = parse_tokens(&schema(false), &["--accountEnabled", "--debug"]).unwrap();
        assert_eq!(raw.values["accountEnabled"], "true");
        assert_eq!(raw.values["debug"], "true");
    }

    #[test]
    fn boolean_consumes_non_flag_value_for_later_coercion() {
        let raw = parse_tokens(&schema(false), &["--accountEnabled", "maybe"]).unwrap();
        assert_eq!(raw.values["accountEnabled"], "maybe");
    }

    #[test]
    fn declared_short_option_is_not_taken_as_a_value() {
        let err = parse_tokens(&schema(false), &["-i", "-n", "john@contoso.com"]).unwrap_err();
        assert_eq!(err.message, "Option 'objectId' requires a value");

        // A dash-prefixed value that names no option is still a value.
        let raw = parse_tokens(&schema(false), &["--top", "-5", "-i", "-x"]).unwrap();
        assert_eq!(raw.values["top"], "-5");
        assert_eq!(raw.values["objectId"], "-x");
    }

    #[test]
    fn string_option_without_value_is_rejected() {
        let err = parse_tokens(&schema(false), &["--objectId"]).unwrap_err();
        assert_eq!(err.message, "Option 'objectId' requires a value");
    }

    #[test]
    fn unknown_option_is_rejected_by_default() {
        let err = parse_tokens(&schema(false), &["--department", "Sales"]).unwrap_err();
        assert_eq!(err.message, "Invalid option: 'department'");
    }

    #[test]
    fn unknown_options_pass_through_when_allowed() {
        let raw = parse_tokens(
            &schema(true),
            &["--department", "Sales", "--usageLocation=NL", "--flag"],
        )
        .unwrap();
        assert_eq!(raw.extras["department"], "Sales");
        assert_eq!(raw.extras["usageLocation"], "NL");
        assert_eq!(raw.extras["flag"], "true");
    }

    #[test]
    fn repeated_option_is_rejected() {
        let err = parse_tokens(&schema(false), &["-i", "a", "--objectId", "b"]).unwrap_err();
        assert!(err.message.contains("more than once"));
    }

    #[test]
    fn positional_token_is_rejected() {
        let err = parse_tokens(&schema(false), &["stray"]).unwrap_err();
        assert_eq!(err.message, "Unexpected argument 'stray'");
    }

    #[test]
    fn negative_number_value_is_accepted() {
        let raw = parse_tokens(&schema(false), &["--top", "-3"]).unwrap();
        assert_eq!(raw.values["top"], "-3");
    }
}
