//! Command registration and verb-path resolution.

use clap::Arg;
use clap::builder::PossibleValuesParser;

use crate::command::Command;
use crate::error::RegistryError;
use crate::options::{OptionDescriptor, OptionType};

#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command after checking its declaration invariants.
    pub fn register(&mut self, command: Box<dyn Command>) -> Result<(), RegistryError> {
        if self.find(command.name()).is_some() {
            return Err(RegistryError::DuplicateCommand(command.name().to_string()));
        }
        command.definition().schema().check(command.name())?;
        self.commands.push(command);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    /// Registered commands sorted by name.
    pub fn commands(&self) -> Vec<&dyn Command> {
        let mut commands: Vec<&dyn Command> = self.commands.iter().map(|c| c.as_ref()).collect();
        commands.sort_by_key(|c| c.name());
        commands
    }

    /// Splits `tokens` into the longest leading verb path naming a command
    /// and the remaining option tokens.
    pub fn resolve<'t, S: AsRef<str>>(&self, tokens: &'t [S]) -> Option<(&dyn Command, &'t [S])> {
        let path_len = tokens
            .iter()
            .map(<S as AsRef<str>>::as_ref)
            .take_while(|t| !t.starts_with('-'))
            .count();

        (1..=path_len).rev().find_map(|len| {
            let name = tokens[..len]
                .iter()
                .map(<S as AsRef<str>>::as_ref)
                .collect::<Vec<&str>>()
                .join(" ");
            self.find(&name).map(|command| (command, &tokens[len..]))
        })
    }
}

/// Help text for one command, rendered through clap's builder API.
pub fn command_help(command: &dyn Command) -> String {
    let schema = command.definition().schema();
    let mut cmd = clap::Command::new(command.name())
        .bin_name(format!("m365 {}", command.name()))
        .about(command.description())
        .disable_version_flag(true);
    for option in schema.all_options() {
        cmd = cmd.arg(help_arg(option));
    }
    if schema.allows_unknown_options() {
        cmd = cmd.after_help(
            "Additional options not listed above are passed through to the request body.",
        );
    }
    cmd.render_help().to_string()
}

fn help_arg(option: &OptionDescriptor) -> Arg {
    let mut arg = Arg::new(option.long)
        .long(option.long)
        .required(option.required);
    if let Some(short) = option.short {
        arg = arg.short(short);
    }
    if let Some(help) = option.help {
        arg = arg.help(help);
    }
    match (option.autocomplete, option.kind) {
        (Some(values), _) => arg.value_parser(PossibleValuesParser::new(values.iter().copied())),
        (None, OptionType::Boolean) => arg.value_parser(["true", "false"]),
        (None, OptionType::Number) => arg.value_name("number"),
        (None, OptionType::String) => arg.value_name(option.long),
    }
}

/// One line per command: name and description.
pub fn command_list(registry: &CommandRegistry) -> String {
    let commands = registry.commands();
    let width = commands.iter().map(|c| c.name().len()).max().unwrap_or(0);
    commands
        .iter()
        .map(|c| format!("  {:width$}  {}", c.name(), c.description()))
        .collect::<Vec<_>>()
        .join("\n")
}
