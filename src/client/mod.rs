//! Identity service client surface.
//!
//! `IdentityApi` is everything the shell needs from the remote side:
//! resource collections (users, tenants, services, roles, ec2 credentials)
//! plus the service catalog lookups. `HttpClient` is the Identity v2.0 REST
//! implementation; tests substitute an in-memory fake.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod catalog;
pub mod http;

#[cfg(test)]
pub mod fake;

pub use catalog::ServiceCatalog;
pub use http::HttpClient;

/* ---- Data Structures ---- */

/// One remote object exactly as the service returned it.
///
/// The shell never interprets more than a few attributes; everything else is
/// carried through untouched so key/value dumps show the full object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Map<String, Value>);

impl Resource {
    pub fn new(attrs: Map<String, Value>) -> Self {
        Resource(attrs)
    }

    /// Full attribute map.
    pub fn info(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }
}

impl From<Value> for Resource {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Resource(map),
            _ => Resource::default(),
        }
    }
}

/// Endpoints grouped by service type.
pub type EndpointMap = BTreeMap<String, Vec<Resource>>;

/// Fields that may change on a user. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.enabled.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TenantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl TenantUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.enabled.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub password: Option<String>,
    pub email: Option<String>,
    pub tenant_id: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTenant {
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
}

/// Attribute filter for endpoint lookups (`endpoint[attr] == value`).
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointFilter {
    pub attr: String,
    pub value: String,
}

/* ---- Errors ---- */

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("endpoint not found: {0}")]
    EndpointNotFound(String),

    #[error("no service catalog available (token/endpoint mode)")]
    NoCatalog,

    #[error("{0}")]
    Setup(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/* ---- Client Trait ---- */

/// Remote operations used by the shell commands.
pub trait IdentityApi {
    // users
    fn list_users(&self, tenant_id: Option<&str>) -> ClientResult<Vec<Resource>>;
    fn get_user(&self, user_id: &str) -> ClientResult<Resource>;
    fn create_user(&self, user: &NewUser) -> ClientResult<Resource>;
    fn update_user(&self, user_id: &str, update: &UserUpdate) -> ClientResult<Resource>;
    fn update_user_password(&self, user_id: &str, password: &str) -> ClientResult<Resource>;
    fn delete_user(&self, user_id: &str) -> ClientResult<()>;

    // tenants
    fn list_tenants(&self) -> ClientResult<Vec<Resource>>;
    fn get_tenant(&self, tenant_id: &str) -> ClientResult<Resource>;
    fn create_tenant(&self, tenant: &NewTenant) -> ClientResult<Resource>;
    fn update_tenant(&self, tenant_id: &str, update: &TenantUpdate) -> ClientResult<Resource>;
    fn delete_tenant(&self, tenant_id: &str) -> ClientResult<()>;

    // services
    fn list_services(&self) -> ClientResult<Vec<Resource>>;
    fn get_service(&self, service_id: &str) -> ClientResult<Resource>;
    fn create_service(
        &self,
        name: &str,
        service_type: &str,
        description: Option<&str>,
    ) -> ClientResult<Resource>;
    fn delete_service(&self, service_id: &str) -> ClientResult<()>;

    // roles
    fn list_roles(&self) -> ClientResult<Vec<Resource>>;
    fn get_role(&self, role_id: &str) -> ClientResult<Resource>;
    fn create_role(&self, name: &str) -> ClientResult<Resource>;
    fn delete_role(&self, role_id: &str) -> ClientResult<()>;
    fn add_user_role(&self, user_id: &str, role_id: &str, tenant_id: Option<&str>)
    -> ClientResult<()>;
    fn remove_user_role(
        &self,
        user_id: &str,
        role_id: &str,
        tenant_id: Option<&str>,
    ) -> ClientResult<()>;

    // ec2 credentials
    fn create_ec2_credentials(&self, user_id: &str, tenant_id: &str) -> ClientResult<Resource>;
    fn list_ec2_credentials(&self, user_id: &str) -> ClientResult<Vec<Resource>>;
    fn delete_ec2_credentials(&self, user_id: &str, access: &str) -> ClientResult<()>;

    // service catalog
    fn endpoints(&self, service_type: Option<&str>) -> ClientResult<EndpointMap>;
    fn url_for(
        &self,
        service_type: &str,
        endpoint_type: &str,
        filter: Option<&EndpointFilter>,
    ) -> ClientResult<String>;
    fn token(&self) -> ClientResult<Resource>;
}
