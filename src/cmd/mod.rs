/*!
Command layer.

Core machinery:
  registry.rs   ArgumentSpec / Command declarations (`command!`, `attach`)
  parser.rs     per-command token parser -> ParsedArguments
  dispatch.rs   CommandTable (name -> Command), Invocation, Session

Output and input helpers:
  format.rs     list / dict rendering (table or JSON)
  prompt.rs     secret prompting for password entry

Resource commands (straight-line handlers, one client call each unless
noted in the module):
  users.rs  tenants.rs  services.rs  roles.rs  ec2.rs  catalog.rs

Conventions:
  - Each resource module exposes `commands() -> ShellResult<Vec<Command>>`.
  - Handlers have the `dispatch::Handler` signature and return
    `ShellResult<()>`; client failures become `RemoteFault` via
    `RemoteContext::remote`.
*/

pub mod dispatch;
pub mod format;
pub mod parser;
pub mod prompt;
pub mod registry;

pub mod catalog;
pub mod ec2;
pub mod roles;
pub mod services;
pub mod tenants;
pub mod users;

pub use dispatch::{CommandTable, Invocation, Session};
