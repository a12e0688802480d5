//! Built-in commands, grouped by service area.

pub mod aad;
pub mod spo;

use crate::error::RegistryError;
use crate::registry::CommandRegistry;

/// Registry holding every built-in command.
pub fn default_registry() -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    registry.register(Box::new(aad::UserGet::new()))?;
    registry.register(Box::new(aad::UserSet::new()))?;
    registry.register(Box::new(spo::AppList::new()))?;
    Ok(registry)
}
