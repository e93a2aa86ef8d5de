/*!
`http.rs`

Identity v2.0 REST implementation of [`IdentityApi`].

Connection flow:
  - Password mode: `POST {auth_url}/tokens` with `passwordCredentials`
    (optionally scoped by tenant name / id). The `access` object of the
    response becomes the [`ServiceCatalog`]; the admin endpoint of the
    `identity` service (filtered by region when one is configured) becomes
    the management URL used for every resource call.
  - Token mode: a pre-issued admin token plus an explicit endpoint. No
    authentication round-trip and no service catalog.

The public API is synchronous. Internally each call is an async `reqwest`
request driven to completion on a Tokio runtime owned by the client.
*/

use reqwest::Method;
use serde_json::{Value, json};
use tracing::{debug, trace};
use url::Url;

use super::{
    ClientError, ClientResult, EndpointFilter, EndpointMap, IdentityApi, NewTenant, NewUser,
    Resource, ServiceCatalog, TenantUpdate, UserUpdate,
};

const USER_AGENT: &str = concat!("keystone-cli/", env!("CARGO_PKG_VERSION"));

/* ---- Connection Options ---- */

/// Password credentials for `POST /tokens`.
#[derive(Debug, Clone)]
pub struct PasswordAuth {
    pub username: String,
    pub password: String,
    pub tenant_name: Option<String>,
    pub tenant_id: Option<String>,
    pub auth_url: Url,
    pub region_name: Option<String>,
}

/// How the client obtains its token and management endpoint.
#[derive(Debug, Clone)]
pub enum AuthOptions {
    Password(PasswordAuth),
    Token { token: String, endpoint: Url },
}

/* ---- Client ---- */

pub struct HttpClient {
    rt: tokio::runtime::Runtime,
    http: reqwest::Client,
    token: String,
    management_url: Url,
    catalog: Option<ServiceCatalog>,
}

impl HttpClient {
    /// Build the client and, in password mode, authenticate immediately.
    pub fn connect(options: AuthOptions) -> ClientResult<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::Setup(format!("failed to create Tokio runtime: {e}")))?;
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        match options {
            AuthOptions::Token { token, endpoint } => {
                debug!(endpoint = %endpoint, "using pre-issued token");
                Ok(Self {
                    rt,
                    http,
                    token,
                    management_url: endpoint,
                    catalog: None,
                })
            }
            AuthOptions::Password(auth) => {
                let url = join(&auth.auth_url, &["tokens"])?;
                let body = auth_body(&auth);
                let response = rt
                    .block_on(send(&http, Method::POST, url, None, Some(&body)))?
                    .ok_or_else(|| ClientError::Decode("empty authentication response".into()))?;
                let catalog = ServiceCatalog::from_auth_response(&response)?;
                let token = catalog
                    .token_id()
                    .ok_or_else(|| ClientError::Decode("authentication response has no token".into()))?
                    .to_string();

                let region = auth.region_name.as_ref().map(|r| EndpointFilter {
                    attr: "region".into(),
                    value: r.clone(),
                });
                let management_url = match catalog.url_for("identity", "adminURL", region.as_ref())
                {
                    Ok(u) => Url::parse(&u)
                        .map_err(|e| ClientError::Decode(format!("invalid admin URL '{u}': {e}")))?,
                    Err(e) => {
                        // unscoped tokens come back without a catalog
                        debug!(error = %e, "no identity admin endpoint; falling back to auth URL");
                        auth.auth_url.clone()
                    }
                };
                debug!(management_url = %management_url, "authenticated");
                Ok(Self {
                    rt,
                    http,
                    token,
                    management_url,
                    catalog: Some(catalog),
                })
            }
        }
    }

    #[cfg(test)]
    pub fn management_url(&self) -> &Url {
        &self.management_url
    }

    fn call(&self, method: Method, segments: &[&str], body: Option<Value>) -> ClientResult<Option<Value>> {
        let url = join(&self.management_url, segments)?;
        self.rt
            .block_on(send(&self.http, method, url, Some(&self.token), body.as_ref()))
    }

    fn get_one(&self, segments: &[&str], key: &str) -> ClientResult<Resource> {
        single(self.call(Method::GET, segments, None)?, key)
    }

    fn get_many(&self, segments: &[&str], key: &str) -> ClientResult<Vec<Resource>> {
        many(self.call(Method::GET, segments, None)?, key)
    }

    fn catalog(&self) -> ClientResult<&ServiceCatalog> {
        self.catalog.as_ref().ok_or(ClientError::NoCatalog)
    }
}

/* ---- Request Helpers ---- */

fn join(base: &Url, segments: &[&str]) -> ClientResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::Setup(format!("'{base}' cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn auth_body(auth: &PasswordAuth) -> Value {
    let mut inner = json!({
        "passwordCredentials": {
            "username": auth.username,
            "password": auth.password,
        }
    });
    if let Some(name) = &auth.tenant_name {
        inner["tenantName"] = json!(name);
    }
    if let Some(id) = &auth.tenant_id {
        inner["tenantId"] = json!(id);
    }
    json!({ "auth": inner })
}

async fn send(
    http: &reqwest::Client,
    method: Method,
    url: Url,
    token: Option<&str>,
    body: Option<&Value>,
) -> ClientResult<Option<Value>> {
    debug!("{method} {url}");
    let mut req = http
        .request(method, url)
        .header(reqwest::header::ACCEPT, "application/json");
    if let Some(t) = token {
        req = req.header("X-Auth-Token", t);
    }
    if let Some(b) = body {
        req = req.json(b);
    }

    let resp = req.send().await?;
    let status = resp.status();
    let text = resp.text().await?;
    trace!(status = status.as_u16(), body = %text, "response");

    if !status.is_success() {
        return Err(ClientError::Http {
            status: status.as_u16(),
            message: error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
        });
    }
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ClientError::Decode(format!("invalid JSON body: {e}")))
}

/// Pull the human message out of an error body such as
/// `{"error": {"message": "...", "code": 404}}` or `{"itemNotFound": {...}}`.
fn error_message(text: &str) -> Option<String> {
    let v: Value = serde_json::from_str(text).ok()?;
    v.as_object()?
        .values()
        .find_map(|inner| inner.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
}

fn single(body: Option<Value>, key: &str) -> ClientResult<Resource> {
    body.as_ref()
        .and_then(|b| b.get(key))
        .cloned()
        .map(Resource::from)
        .ok_or_else(|| ClientError::Decode(format!("response has no '{key}'")))
}

fn many(body: Option<Value>, key: &str) -> ClientResult<Vec<Resource>> {
    let arr = body
        .as_ref()
        .and_then(|b| b.get(key))
        .and_then(|v| v.as_array())
        .ok_or_else(|| ClientError::Decode(format!("response has no '{key}' list")))?;
    Ok(arr.iter().cloned().map(Resource::from).collect())
}

/* ---- IdentityApi ---- */

impl IdentityApi for HttpClient {
    fn list_users(&self, tenant_id: Option<&str>) -> ClientResult<Vec<Resource>> {
        match tenant_id {
            Some(t) => self.get_many(&["tenants", t, "users"], "users"),
            None => self.get_many(&["users"], "users"),
        }
    }

    fn get_user(&self, user_id: &str) -> ClientResult<Resource> {
        self.get_one(&["users", user_id], "user")
    }

    fn create_user(&self, user: &NewUser) -> ClientResult<Resource> {
        let body = json!({"user": {
            "name": user.name,
            "password": user.password,
            "email": user.email,
            "tenantId": user.tenant_id,
            "enabled": user.enabled,
        }});
        single(self.call(Method::POST, &["users"], Some(body))?, "user")
    }

    fn update_user(&self, user_id: &str, update: &UserUpdate) -> ClientResult<Resource> {
        let body = json!({ "user": update });
        single(self.call(Method::PUT, &["users", user_id], Some(body))?, "user")
    }

    fn update_user_password(&self, user_id: &str, password: &str) -> ClientResult<Resource> {
        let body = json!({"user": {"id": user_id, "password": password}});
        single(
            self.call(Method::PUT, &["users", user_id, "OS-KSADM", "password"], Some(body))?,
            "user",
        )
    }

    fn delete_user(&self, user_id: &str) -> ClientResult<()> {
        self.call(Method::DELETE, &["users", user_id], None).map(|_| ())
    }

    fn list_tenants(&self) -> ClientResult<Vec<Resource>> {
        self.get_many(&["tenants"], "tenants")
    }

    fn get_tenant(&self, tenant_id: &str) -> ClientResult<Resource> {
        self.get_one(&["tenants", tenant_id], "tenant")
    }

    fn create_tenant(&self, tenant: &NewTenant) -> ClientResult<Resource> {
        let body = json!({"tenant": {
            "name": tenant.name,
            "description": tenant.description,
            "enabled": tenant.enabled,
        }});
        single(self.call(Method::POST, &["tenants"], Some(body))?, "tenant")
    }

    fn update_tenant(&self, tenant_id: &str, update: &TenantUpdate) -> ClientResult<Resource> {
        let mut inner = serde_json::to_value(update)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        inner["id"] = json!(tenant_id);
        let body = json!({ "tenant": inner });
        single(self.call(Method::POST, &["tenants", tenant_id], Some(body))?, "tenant")
    }

    fn delete_tenant(&self, tenant_id: &str) -> ClientResult<()> {
        self.call(Method::DELETE, &["tenants", tenant_id], None).map(|_| ())
    }

    fn list_services(&self) -> ClientResult<Vec<Resource>> {
        self.get_many(&["OS-KSADM", "services"], "OS-KSADM:services")
    }

    fn get_service(&self, service_id: &str) -> ClientResult<Resource> {
        self.get_one(&["OS-KSADM", "services", service_id], "OS-KSADM:service")
    }

    fn create_service(
        &self,
        name: &str,
        service_type: &str,
        description: Option<&str>,
    ) -> ClientResult<Resource> {
        let body = json!({"OS-KSADM:service": {
            "name": name,
            "type": service_type,
            "description": description,
        }});
        single(
            self.call(Method::POST, &["OS-KSADM", "services"], Some(body))?,
            "OS-KSADM:service",
        )
    }

    fn delete_service(&self, service_id: &str) -> ClientResult<()> {
        self.call(Method::DELETE, &["OS-KSADM", "services", service_id], None)
            .map(|_| ())
    }

    fn list_roles(&self) -> ClientResult<Vec<Resource>> {
        self.get_many(&["OS-KSADM", "roles"], "roles")
    }

    fn get_role(&self, role_id: &str) -> ClientResult<Resource> {
        self.get_one(&["OS-KSADM", "roles", role_id], "role")
    }

    fn create_role(&self, name: &str) -> ClientResult<Resource> {
        let body = json!({"role": {"name": name}});
        single(self.call(Method::POST, &["OS-KSADM", "roles"], Some(body))?, "role")
    }

    fn delete_role(&self, role_id: &str) -> ClientResult<()> {
        self.call(Method::DELETE, &["OS-KSADM", "roles", role_id], None)
            .map(|_| ())
    }

    fn add_user_role(
        &self,
        user_id: &str,
        role_id: &str,
        tenant_id: Option<&str>,
    ) -> ClientResult<()> {
        let path = role_path(user_id, role_id, tenant_id);
        self.call(Method::PUT, &path, None).map(|_| ())
    }

    fn remove_user_role(
        &self,
        user_id: &str,
        role_id: &str,
        tenant_id: Option<&str>,
    ) -> ClientResult<()> {
        let path = role_path(user_id, role_id, tenant_id);
        self.call(Method::DELETE, &path, None).map(|_| ())
    }

    fn create_ec2_credentials(&self, user_id: &str, tenant_id: &str) -> ClientResult<Resource> {
        let body = json!({ "tenant_id": tenant_id });
        single(
            self.call(Method::POST, &["users", user_id, "credentials", "OS-EC2"], Some(body))?,
            "credential",
        )
    }

    fn list_ec2_credentials(&self, user_id: &str) -> ClientResult<Vec<Resource>> {
        self.get_many(&["users", user_id, "credentials", "OS-EC2"], "credentials")
    }

    fn delete_ec2_credentials(&self, user_id: &str, access: &str) -> ClientResult<()> {
        self.call(
            Method::DELETE,
            &["users", user_id, "credentials", "OS-EC2", access],
            None,
        )
        .map(|_| ())
    }

    fn endpoints(&self, service_type: Option<&str>) -> ClientResult<EndpointMap> {
        Ok(self.catalog()?.get_endpoints(service_type))
    }

    fn url_for(
        &self,
        service_type: &str,
        endpoint_type: &str,
        filter: Option<&EndpointFilter>,
    ) -> ClientResult<String> {
        self.catalog()?.url_for(service_type, endpoint_type, filter)
    }

    fn token(&self) -> ClientResult<Resource> {
        self.catalog()?.get_token()
    }
}

fn role_path<'a>(user_id: &'a str, role_id: &'a str, tenant_id: Option<&'a str>) -> Vec<&'a str> {
    match tenant_id {
        Some(t) => vec!["tenants", t, "users", user_id, "roles", "OS-KSADM", role_id],
        None => vec!["users", user_id, "roles", "OS-KSADM", role_id],
    }
}

/* ---- Tests ---- */
