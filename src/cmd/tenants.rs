//! `tenant-*` commands.

use crate::client::{NewTenant, TenantUpdate};
use crate::cmd::dispatch::Session;
use crate::cmd::parser::ParsedArguments;
use crate::cmd::registry::{ArgumentSpec, Arity, Command, command};
use crate::errors::{RemoteContext, ShellResult};

pub const LIST_FIELDS: &[&str] = &["id", "name", "enabled"];

fn tenant_id(help: &'static str) -> ArgumentSpec {
    ArgumentSpec::positional("id", "<tenant_id>", help)
}

pub fn commands() -> ShellResult<Vec<Command>> {
    Ok(vec![
        command!(tenant_list, "List all tenants."),
        command!(tenant_get, "Display tenant details.")
            .attach(tenant_id("Tenant ID to display."))?,
        command!(tenant_create, "Create new tenant.")
            .attach(
                ArgumentSpec::flag("--name", "<name>", "Desired name of new tenant.")
                    .arity(Arity::One)
                    .required(),
            )?
            .attach(ArgumentSpec::flag(
                "--description",
                "<description>",
                "Useful description of new tenant (optional, default is None)",
            ))?
            .attach(
                ArgumentSpec::flag(
                    "--enabled",
                    "<enabled>",
                    "Enable tenant immediately (Optional, default True)",
                )
                .default_value(true),
            )?,
        command!(tenant_update, "Update tenant name, description, enabled status.")
            .attach(tenant_id("Tenant ID to update."))?
            .attach(ArgumentSpec::flag("--name", "<name>", "Desired new name of tenant."))?
            .attach(ArgumentSpec::flag(
                "--description",
                "<description>",
                "Desired new description of tenant.",
            ))?
            .attach(ArgumentSpec::flag("--enabled", "<enabled>", "Enable or disable tenant."))?,
        command!(tenant_enable, "Enable tenant.").attach(tenant_id("Tenant ID to enable."))?,
        command!(tenant_disable, "Disable tenant.").attach(tenant_id("Tenant ID to disable."))?,
        command!(tenant_delete, "Delete tenant.").attach(tenant_id("Tenant ID to delete."))?,
    ])
}

fn tenant_list(s: &mut Session<'_>, _args: &ParsedArguments) -> ShellResult<()> {
    let tenants = s.client.list_tenants().remote("Unable to list tenants")?;
    s.print_list(&tenants, LIST_FIELDS)
}

fn tenant_get(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let tenant = s
        .client
        .get_tenant(args.value("id")?)
        .remote("Unable to fetch tenant")?;
    s.print_dict(&tenant)
}

fn tenant_create(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let new = NewTenant {
        name: args.value("name")?.to_string(),
        description: args.str("description").map(str::to_string),
        enabled: args.bool("enabled").unwrap_or(true),
    };
    let tenant = s
        .client
        .create_tenant(&new)
        .remote("Unable to create tenant")?;
    s.print_dict(&tenant)
}

fn tenant_update(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let id = args.value("id")?;
    let update = TenantUpdate {
        name: args.non_empty("name").map(str::to_string),
        description: args.non_empty("description").map(str::to_string),
        enabled: args.bool("enabled"),
    };
    if update.is_empty() {
        return s.message("Tenant not updated, no arguments present.");
    }
    s.client
        .update_tenant(id, &update)
        .remote("Unable to update tenant")?;
    s.message("Tenant has been updated.")
}

fn set_enabled(s: &mut Session<'_>, args: &ParsedArguments, enabled: bool) -> ShellResult<()> {
    let update = TenantUpdate {
        enabled: Some(enabled),
        ..Default::default()
    };
    let (verb, done) = if enabled {
        ("enable", "Tenant has been enabled.")
    } else {
        ("disable", "Tenant has been disabled.")
    };
    s.client
        .update_tenant(args.value("id")?, &update)
        .remote(format!("Unable to {verb} tenant"))?;
    s.message(done)
}

fn tenant_enable(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    set_enabled(s, args, true)
}

fn tenant_disable(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    set_enabled(s, args, false)
}

fn tenant_delete(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    s.client
        .delete_tenant(args.value("id")?)
        .remote("Unable to delete tenant")?;
    s.message("Tenant has been deleted.")
}
