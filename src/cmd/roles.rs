//! `role-*` commands and user role assignment.

use crate::cmd::dispatch::Session;
use crate::cmd::parser::ParsedArguments;
use crate::cmd::registry::{ArgumentSpec, Arity, Command, command};
use crate::errors::{RemoteContext, ShellResult};

pub const LIST_FIELDS: &[&str] = &["id", "name"];

fn role_id(help: &'static str) -> ArgumentSpec {
    ArgumentSpec::positional("id", "<role_id>", help)
}

/// `<user_id> <role_id> [<tenant_id>]`, in that order.
fn assignment(cmd: Command) -> ShellResult<Command> {
    cmd.attach(ArgumentSpec::positional("user_id", "<user_id>", "ID of User"))?
        .attach(ArgumentSpec::positional("role_id", "<role_id>", "ID of Role"))?
        .attach(
            ArgumentSpec::positional("tenant_id", "<tenant_id>", "ID of Tenant (Optional)")
                .optional(),
        )
}

pub fn commands() -> ShellResult<Vec<Command>> {
    Ok(vec![
        command!(role_list, "List all available roles."),
        command!(role_get, "Display role details.").attach(role_id("ID of Role to fetch."))?,
        command!(role_create, "Create new role.").attach(
            ArgumentSpec::flag("--name", "<name>", "Name of new role.")
                .arity(Arity::One)
                .required(),
        )?,
        command!(role_delete, "Delete role.").attach(role_id("ID of Role to delete."))?,
        assignment(command!(add_user_role, "Add role to user."))?,
        assignment(command!(remove_user_role, "Remove role from user."))?,
    ])
}

fn role_list(s: &mut Session<'_>, _args: &ParsedArguments) -> ShellResult<()> {
    let roles = s.client.list_roles().remote("Unable to list roles")?;
    s.print_list(&roles, LIST_FIELDS)
}

fn role_get(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let role = s
        .client
        .get_role(args.value("id")?)
        .remote("Unable to fetch role")?;
    s.print_dict(&role)
}

fn role_create(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let role = s
        .client
        .create_role(args.value("name")?)
        .remote("Unable to create role")?;
    s.print_dict(&role)
}

fn role_delete(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    s.client
        .delete_role(args.value("id")?)
        .remote("Unable to delete role")?;
    s.message("Role has been deleted.")
}

fn add_user_role(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    s.client
        .add_user_role(
            args.value("user_id")?,
            args.value("role_id")?,
            args.str("tenant_id"),
        )
        .remote("Unable to add role to user")?;
    s.message("Role has been added to user.")
}

fn remove_user_role(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    s.client
        .remove_user_role(
            args.value("user_id")?,
            args.value("role_id")?,
            args.str("tenant_id"),
        )
        .remote("Unable to remove role from user")?;
    s.message("Role has been removed from user.")
}
