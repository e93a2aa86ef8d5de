//! Service catalog and token commands: `catalog`, `endpoint-get`, `token-get`.

use serde_json::{Map, Value};

use crate::client::{EndpointFilter, EndpointMap, Resource};
use crate::cmd::dispatch::Session;
use crate::cmd::format;
use crate::cmd::parser::ParsedArguments;
use crate::cmd::registry::{ArgumentSpec, Arity, Command, command};
use crate::errors::{RemoteContext, ShellResult};

pub fn commands() -> ShellResult<Vec<Command>> {
    Ok(vec![
        command!(catalog, "List service catalog, possibly filtered by service.").attach(
            ArgumentSpec::flag("--service", "<service_type>", "Service type to return"),
        )?,
        command!(endpoint_get, "Find endpoint filtered by a specific attribute or service type.")
            .attach(
                ArgumentSpec::flag("--service", "<service_type>", "Service type to select")
                    .arity(Arity::One)
                    .required(),
            )?
            .attach(
                ArgumentSpec::flag("--endpoint-type", "<endpoint_type>", "Endpoint type to select")
                    .default_value("publicURL"),
            )?
            .attach(
                ArgumentSpec::flag("--attr", "<attribute>", "Attribute to match").requires("value"),
            )?
            .attach(
                ArgumentSpec::flag("--value", "<value>", "Value of attribute to match")
                    .requires("attr"),
            )?,
        command!(token_get, "Display the current user token."),
    ])
}

fn catalog(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let endpoints = s
        .client
        .endpoints(args.str("service"))
        .remote("Unable to read service catalog")?;
    let endpoints: EndpointMap = endpoints
        .into_iter()
        .filter(|(_, eps)| !eps.is_empty())
        .collect();
    if s.json {
        return s.emit(&format::render_catalog_json(&endpoints));
    }
    for (service, eps) in &endpoints {
        s.emit(&format!("Service: {service}"))?;
        for ep in eps {
            s.print_dict(ep)?;
        }
    }
    Ok(())
}

fn endpoint_get(s: &mut Session<'_>, args: &ParsedArguments) -> ShellResult<()> {
    let service = args.value("service")?;
    let endpoint_type = args.value("endpoint_type")?;
    // the parser only lets --attr and --value through as a pair
    let filter = match (args.str("attr"), args.str("value")) {
        (Some(attr), Some(value)) => Some(EndpointFilter {
            attr: attr.to_string(),
            value: value.to_string(),
        }),
        _ => None,
    };

    let url = s
        .client
        .url_for(service, endpoint_type, filter.as_ref())
        .remote("Unable to find endpoint")?;
    let mut attrs = Map::new();
    attrs.insert(format!("{service}.{endpoint_type}"), Value::String(url));
    s.print_dict(&Resource::new(attrs))
}

fn token_get(s: &mut Session<'_>, _args: &ParsedArguments) -> ShellResult<()> {
    let token = s.client.token().remote("Unable to fetch token")?;
    s.print_dict(&token)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::client::Resource;
    use crate::client::fake::FakeClient;
    use crate::cmd::CommandTable;
    use crate::cmd::dispatch::testing::{run, run_json};
    use crate::errors::ShellError;

    #[test]
    fn catalog_skips_services_without_endpoints() {
        let mut client = FakeClient::new();
        client.endpoints.insert(
            "identity".into(),
            vec![Resource::from(json!({"publicURL": "http://id", "region": "R1"}))],
        );
        client.endpoints.insert("volume".into(), vec![]);
        let (res, out) = run(&client, &["catalog"]);
        res.unwrap();
        assert!(out.contains("Service: identity"));
        assert!(!out.contains("Service: volume"));
        assert!(out.contains("http://id"));
        assert_eq!(client.calls(), vec!["endpoints(None)"]);
    }

    #[test]
    fn endpoint_get_defaults_to_public_url() {
        let client = FakeClient::new();
        let (res, out) = run(&client, &["endpoint-get", "--service", "compute"]);
        res.unwrap();
        assert_eq!(client.calls(), vec!["url_for(compute, publicURL, None)"]);
        assert!(out.contains("compute.publicURL"));
        assert!(out.contains("http://compute.example/publicURL"));
    }

    #[test]
    fn endpoint_get_with_filter() {
        let client = FakeClient::new();
        run(
            &client,
            &[
                "endpoint-get",
                "--service",
                "identity",
                "--endpoint_type",
                "adminURL",
                "--attr",
                "region",
                "--value",
                "R2",
            ],
        )
        .0
        .unwrap();
        assert_eq!(
            client.calls(),
            vec![r#"url_for(identity, adminURL, Some(("region", "R2")))"#]
        );
    }

    #[test]
    fn endpoint_get_half_filter_rejected_before_run() {
        let table = CommandTable::builtin().unwrap();
        let argv: Vec<String> = ["endpoint-get", "--service", "identity", "--attr", "region"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let err = match table.prepare(&argv) {
            Err(e) => e,
            Ok(_) => panic!("half filter should not parse"),
        };
        match &err {
            ShellError::ArgumentError { usage, .. } => {
                assert_eq!(usage, &table.resolve("endpoint-get").unwrap().usage());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.exit_code(), 2);

        let client = FakeClient::new();
        let (res, _) = run(&client, &["endpoint-get", "--service", "identity", "--value", "R1"]);
        assert!(matches!(res, Err(ShellError::ArgumentError { .. })));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn catalog_json_is_one_document_keyed_by_service() {
        let mut client = FakeClient::new();
        client.endpoints.insert(
            "identity".into(),
            vec![Resource::from(json!({"publicURL": "http://id"}))],
        );
        client.endpoints.insert(
            "compute".into(),
            vec![Resource::from(json!({"publicURL": "http://c"}))],
        );
        client.endpoints.insert("volume".into(), vec![]);
        let (res, out) = run_json(&client, &["catalog"]);
        res.unwrap();
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            doc,
            json!({
                "compute": [{"publicURL": "http://c"}],
                "identity": [{"publicURL": "http://id"}]
            })
        );
    }

    #[test]
    fn token_get_dumps_token() {
        let client = FakeClient::new();
        let (res, out) = run(&client, &["token-get"]);
        res.unwrap();
        assert!(out.contains("tok"));
        assert!(out.contains("expires"));
    }

    #[test]
    fn no_catalog_is_remote_fault() {
        let client = FakeClient::failing("no catalog");
        let (res, _) = run(&client, &["token-get"]);
        assert!(matches!(res, Err(ShellError::RemoteFault { .. })));
    }
}
