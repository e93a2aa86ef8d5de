//! `service-*` commands.

use crate::cmd::dispatch::Session;
use crate::cmd::parser::ParsedArguments;
use crate::cmd::registry::{ArgumentSpec, Arity, Command, command};
use crate::errors::{RemoteContext, ShellResult};

pub const LIST_FIELDS: &[&str] = &["id", "name", "type", "description"];

pub fn commands() -> ShellResult<Vec<Command>> {
    Ok(vec![
        command!(service_create, "Add service to Service Catalog.")
            .attach(
                ArgumentSpec::flag("--name", "<name>", "Name of new service (must be unique)")
                    .arity(Arity::One)
                    .required(),
            )?
            .attach(
                ArgumentSpec::flag(
                    "--type",
                    "<type>",
                    "Service type (one of: identity, compute, network, image, or object-store)",
                )
                .arity(Arity::One)
                .required(),
            )?
            .attach(ArgumentSpec::flag(
                "--description",
                "<service_description>",
                "Description of service",
            ))?,
        command!(service_list, "List all services in Service Catalog."),
        command!(service_get, "Display service from Service Catalog.").attach(
            ArgumentSpec::positional("id", "<service_id>", "ID of Service to retrieve."),
        )?,
        command!(service_delete, "Delete service from Service Catalog.").attach(
            ArgumentSpec::positional("id", "<service_id>", "ID of Service to delete."),
        )?,
    ])
}

fn service_create(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let service = s
        .client
        .create_service(
            args.value("name")?,
            args.value("type")?,
            args.str("description"),
        )
        .remote("Unable to create service")?;
    s.print_dict(&service)
}

fn service_list(s: &mut Session<'_>, _args: &ParsedArguments) -> ShellResult<()> {
    let services = s.client.list_services().remote("Unable to list services")?;
    s.print_list(&services, LIST_FIELDS)
}

fn service_get(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let service = s
        .client
        .get_service(args.value("id")?)
        .remote("Unable to fetch service")?;
    s.print_dict(&service)
}

fn service_delete(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    s.client
        .delete_service(args.value("id")?)
        .remote("Unable to delete service")?;
    s.message("Service has been deleted.")
}

#[cfg(test)]
mod tests {
    use crate::client::fake::FakeClient;
    use crate::cmd::dispatch::testing::run;
    use crate::errors::ShellError;

    #[test]
    fn create_passes_all_three_values() {
        let client = FakeClient::new();
        let (res, out) = run(
            &client,
            &["service-create", "--name", "nova", "--type", "compute", "--description", "Compute"],
        );
        res.unwrap();
        assert_eq!(
            client.calls(),
            vec![r#"create_service(nova, compute, Some("Compute"))"#]
        );
        let keys: Vec<&str> = out
            .lines()
            .skip(2)
            .filter_map(|l| l.split_whitespace().next())
            .collect();
        assert_eq!(keys, vec!["description", "id", "name", "type"]);
    }

    #[test]
    fn create_requires_type() {
        let client = FakeClient::new();
        let (res, _) = run(&client, &["service-create", "--name", "nova"]);
        let err = res.unwrap_err();
        assert!(matches!(err, ShellError::ArgumentError { .. }));
        assert!(err.to_string().contains("--type"));
    }

    #[test]
    fn list_columns() {
        let client = FakeClient::new();
        let (res, out) = run(&client, &["service-list"]);
        res.unwrap();
        let header: Vec<&str> = out.lines().next().unwrap().split_whitespace().collect();
        assert_eq!(header, vec!["id", "name", "type", "description"]);
    }

    #[test]
    fn delete_reports() {
        let client = FakeClient::new();
        let (res, out) = run(&client, &["service-delete", "s1"]);
        res.unwrap();
        assert_eq!(out.trim(), "Service has been deleted.");
    }
}
