//! In-memory `IdentityApi` used by handler tests. Records every call.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::json;

use super::{
    ClientError, ClientResult, EndpointFilter, EndpointMap, IdentityApi, NewTenant, NewUser,
    Resource, TenantUpdate, UserUpdate,
};

#[derive(Default)]
pub struct FakeClient {
    pub calls: RefCell<Vec<String>>,
    pub users: Vec<Resource>,
    pub tenants: HashMap<String, Resource>,
    pub credentials: Vec<Resource>,
    pub endpoints: EndpointMap,
    /// When set, every call fails with HTTP 500 and this message.
    pub fail_with: Option<String>,
    pub last_new_user: RefCell<Option<NewUser>>,
    pub last_user_update: RefCell<Option<UserUpdate>>,
    pub last_tenant_update: RefCell<Option<TenantUpdate>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_users(mut self, users: Vec<serde_json::Value>) -> Self {
        self.users = users.into_iter().map(Resource::from).collect();
        self
    }

    pub fn with_tenant(mut self, tenant: serde_json::Value) -> Self {
        let r = Resource::from(tenant);
        let id = r.attr_str("id").unwrap_or_default().to_string();
        self.tenants.insert(id, r);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) -> ClientResult<()> {
        self.calls.borrow_mut().push(call.into());
        match &self.fail_with {
            Some(msg) => Err(ClientError::Http {
                status: 500,
                message: msg.clone(),
            }),
            None => Ok(()),
        }
    }

    fn echo(kind: &str, id: &str) -> Resource {
        Resource::from(json!({"id": id, "kind": kind}))
    }
}

impl IdentityApi for FakeClient {
    fn list_users(&self, tenant_id: Option<&str>) -> ClientResult<Vec<Resource>> {
        self.record(format!("list_users({tenant_id:?})"))?;
        Ok(self.users.clone())
    }

    fn get_user(&self, user_id: &str) -> ClientResult<Resource> {
        self.record(format!("get_user({user_id})"))?;
        Ok(Self::echo("user", user_id))
    }

    fn create_user(&self, user: &NewUser) -> ClientResult<Resource> {
        self.record(format!("create_user({})", user.name))?;
        *self.last_new_user.borrow_mut() = Some(user.clone());
        Ok(Resource::from(json!({
            "id": "u-new",
            "name": user.name,
            "email": user.email,
            "tenantId": user.tenant_id,
            "enabled": user.enabled,
        })))
    }

    fn update_user(&self, user_id: &str, update: &UserUpdate) -> ClientResult<Resource> {
        self.record(format!("update_user({user_id})"))?;
        *self.last_user_update.borrow_mut() = Some(update.clone());
        Ok(Self::echo("user", user_id))
    }

    fn update_user_password(&self, user_id: &str, password: &str) -> ClientResult<Resource> {
        self.record(format!("update_user_password({user_id}, {password})"))?;
        Ok(Self::echo("user", user_id))
    }

    fn delete_user(&self, user_id: &str) -> ClientResult<()> {
        self.record(format!("delete_user({user_id})"))
    }

    fn list_tenants(&self) -> ClientResult<Vec<Resource>> {
        self.record("list_tenants")?;
        Ok(self.tenants.values().cloned().collect())
    }

    fn get_tenant(&self, tenant_id: &str) -> ClientResult<Resource> {
        self.record(format!("get_tenant({tenant_id})"))?;
        self.tenants
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| ClientError::Http {
                status: 404,
                message: format!("tenant {tenant_id} not found"),
            })
    }

    fn create_tenant(&self, tenant: &NewTenant) -> ClientResult<Resource> {
        self.record(format!("create_tenant({})", tenant.name))?;
        Ok(Resource::from(json!({
            "id": "t-new",
            "name": tenant.name,
            "description": tenant.description,
            "enabled": tenant.enabled,
        })))
    }

    fn update_tenant(&self, tenant_id: &str, update: &TenantUpdate) -> ClientResult<Resource> {
        self.record(format!("update_tenant({tenant_id})"))?;
        *self.last_tenant_update.borrow_mut() = Some(update.clone());
        Ok(Self::echo("tenant", tenant_id))
    }

    fn delete_tenant(&self, tenant_id: &str) -> ClientResult<()> {
        self.record(format!("delete_tenant({tenant_id})"))
    }

    fn list_services(&self) -> ClientResult<Vec<Resource>> {
        self.record("list_services")?;
        Ok(vec![Resource::from(json!({
            "id": "s1", "name": "keystone", "type": "identity", "description": "Identity"
        }))])
    }

    fn get_service(&self, service_id: &str) -> ClientResult<Resource> {
        self.record(format!("get_service({service_id})"))?;
        Ok(Self::echo("service", service_id))
    }

    fn create_service(
        &self,
        name: &str,
        service_type: &str,
        description: Option<&str>,
    ) -> ClientResult<Resource> {
        self.record(format!("create_service({name}, {service_type}, {description:?})"))?;
        Ok(Resource::from(json!({
            "id": "s-new", "name": name, "type": service_type, "description": description
        })))
    }

    fn delete_service(&self, service_id: &str) -> ClientResult<()> {
        self.record(format!("delete_service({service_id})"))
    }

    fn list_roles(&self) -> ClientResult<Vec<Resource>> {
        self.record("list_roles")?;
        Ok(vec![Resource::from(json!({"id": "r1", "name": "admin"}))])
    }

    fn get_role(&self, role_id: &str) -> ClientResult<Resource> {
        self.record(format!("get_role({role_id})"))?;
        Ok(Self::echo("role", role_id))
    }

    fn create_role(&self, name: &str) -> ClientResult<Resource> {
        self.record(format!("create_role({name})"))?;
        Ok(Resource::from(json!({"id": "r-new", "name": name})))
    }

    fn delete_role(&self, role_id: &str) -> ClientResult<()> {
        self.record(format!("delete_role({role_id})"))
    }

    fn add_user_role(
        &self,
        user_id: &str,
        role_id: &str,
        tenant_id: Option<&str>,
    ) -> ClientResult<()> {
        self.record(format!("add_user_role({user_id}, {role_id}, {tenant_id:?})"))
    }

    fn remove_user_role(
        &self,
        user_id: &str,
        role_id: &str,
        tenant_id: Option<&str>,
    ) -> ClientResult<()> {
        self.record(format!("remove_user_role({user_id}, {role_id}, {tenant_id:?})"))
    }

    fn create_ec2_credentials(&self, user_id: &str, tenant_id: &str) -> ClientResult<Resource> {
        self.record(format!("create_ec2_credentials({user_id}, {tenant_id})"))?;
        Ok(Resource::from(json!({
            "user_id": user_id, "tenant_id": tenant_id, "access": "AK", "secret": "SK"
        })))
    }

    fn list_ec2_credentials(&self, user_id: &str) -> ClientResult<Vec<Resource>> {
        self.record(format!("list_ec2_credentials({user_id})"))?;
        Ok(self.credentials.clone())
    }

    fn delete_ec2_credentials(&self, user_id: &str, access: &str) -> ClientResult<()> {
        self.record(format!("delete_ec2_credentials({user_id}, {access})"))
    }

    fn endpoints(&self, service_type: Option<&str>) -> ClientResult<EndpointMap> {
        self.record(format!("endpoints({service_type:?})"))?;
        Ok(self
            .endpoints
            .iter()
            .filter(|(k, _)| service_type.is_none_or(|s| s == k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn url_for(
        &self,
        service_type: &str,
        endpoint_type: &str,
        filter: Option<&EndpointFilter>,
    ) -> ClientResult<String> {
        self.record(format!(
            "url_for({service_type}, {endpoint_type}, {:?})",
            filter.map(|f| (&f.attr, &f.value))
        ))?;
        Ok(format!("http://{service_type}.example/{endpoint_type}"))
    }

    fn token(&self) -> ClientResult<Resource> {
        self.record("token")?;
        Ok(Resource::from(json!({"id": "tok", "expires": "never"})))
    }
}
