//! Option Schema Registry: the declarative description of the flags a
//! command accepts.
//!
//! A command declares its [`OptionDescriptor`]s and [`OptionSet`]s once, at
//! construction time. Declaration order is the order used for help output
//! and nothing else. The three global options (`--debug`, `--verbose`,
//! `--output`) are implicit on every schema and are listed by
//! [`global_options`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// Declared value type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    String,
    Boolean,
    Number,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionType::String => "string",
            OptionType::Boolean => "boolean",
            OptionType::Number => "number",
        };
        f.write_str(name)
    }
}

/// A single accepted flag.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    /// Long name, used as `--long` and as the key in parsed arguments.
    pub long: &'static str,
    /// Optional single-character short form, used as `-s`.
    pub short: Option<char>,
    pub kind: OptionType,
    pub required: bool,
    /// Completion hints. Not enforced during validation.
    pub autocomplete: Option<&'static [&'static str]>,
    pub help: Option<&'static str>,
}

impl OptionDescriptor {
    fn new(long: &'static str, kind: OptionType) -> Self {
        OptionDescriptor {
            long,
            short: None,
            kind,
            required: false,
            autocomplete: None,
            help: None,
        }
    }

    pub fn string(long: &'static str) -> Self {
        Self::new(long, OptionType::String)
    }

    pub fn boolean(long: &'static str) -> Self {
        Self::new(long, OptionType::Boolean)
    }

    pub fn number(long: &'static str) -> Self {
        Self::new(long, OptionType::Number)
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn autocomplete(mut self, values: &'static [&'static str]) -> Self {
        self.autocomplete = Some(values);
        self
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

/// A group of options of which exactly one must be supplied.
///
/// An optional set also accepts none of its members, but still rejects
/// more than one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    pub options: Vec<&'static str>,
    pub optional: bool,
}

impl OptionSet {
    pub fn new(options: &[&'static str]) -> Self {
        OptionSet {
            options: options.to_vec(),
            optional: false,
        }
    }

    pub fn optional(options: &[&'static str]) -> Self {
        OptionSet {
            options: options.to_vec(),
            optional: true,
        }
    }
}

/// Output format selected with `--output`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "'{s}' is not a valid value for option output. Allowed values: json, text, csv"
            )),
        }
    }
}

/// Global options recognized by every command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub debug: bool,
    pub verbose: bool,
    pub output: OutputFormat,
}

pub const DEBUG: &str = "debug";
pub const VERBOSE: &str = "verbose";
pub const OUTPUT: &str = "output";

const OUTPUT_FORMATS: &[&str] = &["json", "text", "csv"];

/// Descriptors for the options every command accepts.
pub fn global_options() -> [OptionDescriptor; 3] {
    [
        OptionDescriptor::boolean(DEBUG).help("Runs command with debug logging"),
        OptionDescriptor::boolean(VERBOSE).help("Runs command with verbose logging"),
        OptionDescriptor::string(OUTPUT)
            .short('o')
            .autocomplete(OUTPUT_FORMATS)
            .help("Output type. json, text, csv. Default json"),
    ]
}

/// The full option declaration of one command.
#[derive(Debug, Clone)]
pub struct OptionSchema {
    options: Vec<OptionDescriptor>,
    option_sets: Vec<OptionSet>,
    allows_unknown_options: bool,
    globals: Vec<OptionDescriptor>,
}

impl Default for OptionSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionSchema {
    pub fn new() -> Self {
        OptionSchema {
            options: Vec::new(),
            option_sets: Vec::new(),
            allows_unknown_options: false,
            globals: global_options().to_vec(),
        }
    }

    pub fn push_option(&mut self, option: OptionDescriptor) {
        self.options.push(option);
    }

    pub fn push_option_set(&mut self, set: OptionSet) {
        self.option_sets.push(set);
    }

    pub fn set_allows_unknown_options(&mut self, allow: bool) {
        self.allows_unknown_options = allow;
    }

    /// Command-specific descriptors, in declaration order.
    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    pub fn option_sets(&self) -> &[OptionSet] {
        &self.option_sets
    }

    pub fn allows_unknown_options(&self) -> bool {
        self.allows_unknown_options
    }

    /// Command descriptors followed by the global descriptors.
    pub fn all_options(&self) -> impl Iterator<Item = &OptionDescriptor> {
        self.options.iter().chain(self.globals.iter())
    }

    pub fn find_long(&self, long: &str) -> Option<&OptionDescriptor> {
        self.all_options().find(|o| o.long == long)
    }

    pub fn find_short(&self, short: char) -> Option<&OptionDescriptor> {
        self.all_options().find(|o| o.short == Some(short))
    }

    /// Checks the declaration invariants: unique long and short names
    /// (global options included) and option sets referencing only declared
    /// options.
    pub fn check(&self, command: &str) -> Result<(), RegistryError> {
        let mut longs = HashSet::new();
        let mut shorts = HashSet::new();
        for option in self.all_options() {
            if !longs.insert(option.long) {
                return Err(RegistryError::DuplicateOption {
                    command: command.to_string(),
                    name: option.long.to_string(),
                });
            }
            if let Some(short) = option.short {
                if !shorts.insert(short) {
                    return Err(RegistryError::DuplicateOption {
                        command: command.to_string(),
                        name: short.to_string(),
                    });
                }
            }
        }

        for set in &self.option_sets {
            if let Some(name) = set.options.iter().find(|name| !longs.contains(*name)) {
                return Err(RegistryError::UnknownSetMember {
                    command: command.to_string(),
                    name: name.to_string(),
                });
            }
        }

        Ok(())
    }
}
