//! `ec2-*-credentials` commands.

use serde_json::Value;

use crate::cmd::dispatch::Session;
use crate::cmd::parser::ParsedArguments;
use crate::cmd::registry::{ArgumentSpec, Arity, Command, command};
use crate::errors::{RemoteContext, ShellResult};

pub const LIST_FIELDS: &[&str] = &["tenant", "access", "secret"];

pub fn commands() -> ShellResult<Vec<Command>> {
    Ok(vec![
        command!(ec2_create_credentials, "Create EC2-compatible credentials for user per tenant.")
            .attach(
                ArgumentSpec::flag("--user-id", "<user_id>", "ID of User")
                    .arity(Arity::One)
                    .required(),
            )?
            .attach(
                ArgumentSpec::flag("--tenant-id", "<tenant_id>", "ID of Tenant")
                    .arity(Arity::One)
                    .required(),
            )?,
        command!(ec2_list_credentials, "List EC2-compatible credentials for a user.")
            .attach(ArgumentSpec::positional("user_id", "<user_id>", "ID of User"))?,
        command!(ec2_delete_credentials, "Delete EC2-compatible credentials.")
            .attach(ArgumentSpec::positional("user_id", "<user_id>", "ID of User"))?
            .attach(ArgumentSpec::positional("key", "<access_key>", "Access Key"))?,
    ])
}

fn ec2_create_credentials(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let creds = s
        .client
        .create_ec2_credentials(args.value("user_id")?, args.value("tenant_id")?)
        .remote("Unable to create EC2 credentials")?;
    s.print_dict(&creds)
}

/// Lists credentials with each `tenant_id` resolved to the tenant's name.
fn ec2_list_credentials(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let mut creds = s
        .client
        .list_ec2_credentials(args.value("user_id")?)
        .remote("Unable to list EC2 credentials")?;
    for cred in &mut creds {
        let Some(tenant_id) = cred.attr_str("tenant_id").map(str::to_string) else {
            continue;
        };
        let tenant = s
            .client
            .get_tenant(&tenant_id)
            .remote(format!("Unable to fetch tenant {tenant_id}"))?;
        let name = tenant.attr("name").cloned().unwrap_or(Value::Null);
        cred.set_attr("tenant", name);
    }
    s.print_list(&creds, LIST_FIELDS)
}

fn ec2_delete_credentials(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    s.client
        .delete_ec2_credentials(args.value("user_id")?, args.value("key")?)
        .remote("Unable to delete EC2 credentials")?;
    s.message("Credential has been deleted.")
}
