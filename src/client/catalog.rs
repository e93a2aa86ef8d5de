//! Service catalog lookups over an authentication response (`access` object).
//!
//! Shape (abridged):
//! ```json
//! {
//!   "token": {"id": "...", "expires": "...", "tenant": {"id": "..."}},
//!   "user": {"id": "..."},
//!   "serviceCatalog": [
//!     {"type": "identity", "name": "keystone",
//!      "endpoints": [{"region": "RegionOne", "publicURL": "...", "adminURL": "..."}]}
//!   ]
//! }
//! ```

use serde_json::{Map, Value};

use super::{ClientError, ClientResult, EndpointFilter, EndpointMap, Resource};

#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    access: Map<String, Value>,
}

impl ServiceCatalog {
    pub fn new(access: Map<String, Value>) -> Self {
        Self { access }
    }

    /// Build from a full `POST /tokens` response body.
    pub fn from_auth_response(body: &Value) -> ClientResult<Self> {
        let access = body
            .get("access")
            .and_then(|v| v.as_object())
            .ok_or_else(|| ClientError::Decode("authentication response has no 'access'".into()))?;
        Ok(Self::new(access.clone()))
    }

    fn services(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.access
            .get("serviceCatalog")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|s| s.as_object())
    }

    fn endpoints_of(service: &Map<String, Value>) -> impl Iterator<Item = &Map<String, Value>> {
        service
            .get("endpoints")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|e| e.as_object())
    }

    /// Endpoints grouped by service type, optionally restricted to one type.
    /// Services without endpoints are kept with an empty list.
    pub fn get_endpoints(&self, service_type: Option<&str>) -> EndpointMap {
        let mut out = EndpointMap::new();
        for service in self.services() {
            let Some(kind) = service.get("type").and_then(|v| v.as_str()) else {
                continue;
            };
            if service_type.is_some_and(|wanted| wanted != kind) {
                continue;
            }
            let entry = out.entry(kind.to_string()).or_default();
            for ep in Self::endpoints_of(service) {
                entry.push(Resource::new(ep.clone()));
            }
        }
        out
    }

    /// URL of the first endpoint of `service_type` that passes `filter`.
    pub fn url_for(
        &self,
        service_type: &str,
        endpoint_type: &str,
        filter: Option<&EndpointFilter>,
    ) -> ClientResult<String> {
        for service in self.services() {
            if service.get("type").and_then(|v| v.as_str()) != Some(service_type) {
                continue;
            }
            for ep in Self::endpoints_of(service) {
                let matches = filter.is_none_or(|f| {
                    ep.get(&f.attr).and_then(|v| v.as_str()) == Some(f.value.as_str())
                });
                if !matches {
                    continue;
                }
                if let Some(url) = ep.get(endpoint_type).and_then(|v| v.as_str()) {
                    return Ok(url.to_string());
                }
            }
        }
        Err(ClientError::EndpointNotFound(match filter {
            Some(f) => format!("{service_type}.{endpoint_type} where {}={}", f.attr, f.value),
            None => format!("{service_type}.{endpoint_type}"),
        }))
    }

    /// Token summary: `id`, `expires` and, when known, `user_id`/`tenant_id`.
    pub fn get_token(&self) -> ClientResult<Resource> {
        let token = self
            .access
            .get("token")
            .and_then(|v| v.as_object())
            .ok_or_else(|| ClientError::Decode("service catalog has no token".into()))?;
        let mut out = Map::new();
        for key in ["id", "expires"] {
            out.insert(key.into(), token.get(key).cloned().unwrap_or(Value::Null));
        }
        if let Some(user_id) = self.access.get("user").and_then(|u| u.get("id")) {
            out.insert("user_id".into(), user_id.clone());
        }
        if let Some(tenant_id) = token.get("tenant").and_then(|t| t.get("id")) {
            out.insert("tenant_id".into(), tenant_id.clone());
        }
        Ok(Resource::new(out))
    }

    pub fn token_id(&self) -> Option<&str> {
        self.access
            .get("token")
            .and_then(|t| t.get("id"))
            .and_then(|v| v.as_str())
    }
}
