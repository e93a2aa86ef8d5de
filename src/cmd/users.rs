//! `user-*` commands.

use crate::client::{NewUser, UserUpdate};
use crate::cmd::dispatch::Session;
use crate::cmd::parser::ParsedArguments;
use crate::cmd::prompt::confirm_new_password;
use crate::cmd::registry::{ArgumentSpec, Arity, Command, command};
use crate::errors::{RemoteContext, ShellResult};

pub const LIST_FIELDS: &[&str] = &["id", "enabled", "email", "name", "tenantId"];

pub fn commands() -> ShellResult<Vec<Command>> {
    Ok(vec![
        command!(user_list, "List users, optionally limited to one tenant.").attach(
            ArgumentSpec::positional("tenant", "<tenant_id>", "ID of Tenant. (Optional)")
                .optional(),
        )?,
        command!(user_get, "Display user details.")
            .attach(ArgumentSpec::positional("id", "<user_id>", "User ID to display."))?,
        command!(user_create, "Create new user.")
            .attach(
                ArgumentSpec::flag("--name", "<name>", "Desired username. (unique)")
                    .arity(Arity::One)
                    .required(),
            )?
            .attach(ArgumentSpec::flag("--pass", "<pass>", "Desired password.").dest("passwd"))?
            .attach(ArgumentSpec::flag(
                "--email",
                "<email>",
                "Desired email address. (unique)",
            ))?
            .attach(ArgumentSpec::flag(
                "--default-tenant",
                "<default_tenant>",
                "User will join the default tenant as a Member.",
            ))?
            .attach(
                ArgumentSpec::flag(
                    "--enabled",
                    "<enabled>",
                    "Enable user immediately (Optional, default True)",
                )
                .default_value(true),
            )?,
        command!(user_update, "Update user's name, email, and enabled status.")
            .attach(ArgumentSpec::positional("id", "<user_id>", "User ID to update."))?
            .attach(ArgumentSpec::flag("--name", "<name>", "Desired user name."))?
            .attach(ArgumentSpec::flag("--email", "<email>", "Desired email address."))?
            .attach(ArgumentSpec::flag("--enabled", "<enabled>", "Desired status of user."))?,
        command!(user_password_update, "Update user password.")
            .attach(ArgumentSpec::positional("id", "<user_id>", "User ID to update."))?
            .attach(
                ArgumentSpec::positional(
                    "password",
                    "<password>",
                    "New desired password. Prompted for when omitted.",
                )
                .optional(),
            )?,
        command!(user_delete, "Delete user.")
            .attach(ArgumentSpec::positional("id", "<user_id>", "User ID to delete."))?,
    ])
}

fn user_list(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let users = s
        .client
        .list_users(args.str("tenant"))
        .remote("Unable to list users")?;
    s.print_list(&users, LIST_FIELDS)
}

fn user_get(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let id = args.value("id")?;
    let user = s.client.get_user(id).remote("Unable to fetch user")?;
    s.print_dict(&user)
}

fn user_create(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let new = NewUser {
        name: args.value("name")?.to_string(),
        password: args.str("passwd").map(str::to_string),
        email: args.str("email").map(str::to_string),
        tenant_id: args.str("default_tenant").map(str::to_string),
        enabled: args.bool("enabled").unwrap_or(true),
    };
    let user = s.client.create_user(&new).remote("Unable to create user")?;
    s.print_dict(&user)
}

fn user_update(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let id = args.value("id")?;
    let update = UserUpdate {
        name: args.non_empty("name").map(str::to_string),
        email: args.non_empty("email").map(str::to_string),
        enabled: args.bool("enabled"),
    };
    if update.is_empty() {
        return s.message("User not updated, no arguments present.");
    }
    s.client
        .update_user(id, &update)
        .remote("Unable to update user")?;
    s.message("User has been updated.")
}

fn user_password_update(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let id = args.value("id")?;
    let password = match args.str("password") {
        Some(p) => p.to_string(),
        None => confirm_new_password(s.prompt)?,
    };
    s.client
        .update_user_password(id, &password)
        .remote("Unable to update user password")?;
    s.message("User password has been updated.")
}

fn user_delete(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let id = args.value("id")?;
    s.client.delete_user(id).remote("Unable to delete user")?;
    s.message("User has been deleted.")
}
