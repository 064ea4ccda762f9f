//! Builtin tool catalog over the studio directory.

mod args;
pub mod campaigns;
pub mod clients;
pub mod galleries;
pub mod invoices;
pub mod vouchers;

use darkroom_studio::SharedDirectory;

use crate::error::AgentResult;
use crate::tools::registry::ToolRegistry;

/// Register the full studio catalog. Fails on a name collision, so this
/// must run before any caller-supplied registrations that could shadow
/// builtin names.
pub fn register_builtin_tools(
    registry: &mut ToolRegistry,
    directory: &SharedDirectory,
) -> AgentResult<()> {
    registry.register(clients::lookup(directory.clone()))?;
    registry.register(clients::update(directory.clone()))?;
    registry.register(invoices::report(directory.clone()))?;
    registry.register(invoices::issue(directory.clone()))?;
    registry.register(vouchers::issue(directory.clone()))?;
    registry.register(vouchers::redeem(directory.clone()))?;
    registry.register(galleries::publish(directory.clone()))?;
    registry.register(campaigns::send(directory.clone()))?;
    Ok(())
}
