use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::entities::vps_server;
use crate::db::enums::Provider;
use crate::db::services::{
    PodInput, VpsChanges, VpsError, VpsFilter, parse_main_ip, parse_provider, ssh_user_or_default,
};

#[derive(Debug, Default, Deserialize)]
pub struct PodPayload {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub notes: String,
}

impl From<PodPayload> for PodInput {
    fn from(payload: PodPayload) -> Self {
        PodInput {
            name: payload.name,
            slug: payload.slug,
            provider: payload.provider,
            purpose: payload.purpose,
            notes: payload.notes,
        }
    }
}

/// Create/update body for a VPS server. Omitted fields are left unchanged on
/// update and take their defaults on create.
#[derive(Debug, Default, Deserialize)]
pub struct VpsServerPayload {
    pub code: Option<String>,
    pub slug: Option<String>,
    pub friendly_name: Option<String>,
    pub provider: Option<String>,
    pub package: Option<String>,
    pub main_ip: Option<String>,
    pub hostname: Option<String>,
    pub domain: Option<String>,
    pub webmail_url: Option<String>,
    pub panel_url: Option<String>,
    pub panel_username: Option<String>,
    pub panel_password: Option<String>,
    pub ssh_host: Option<String>,
    pub ssh_user: Option<String>,
    pub ssh_notes: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
    /// Pod slug or name. An empty string detaches the server.
    pub pod: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl VpsServerPayload {
    /// Splits the payload into the requested code and validated field changes.
    pub fn into_parts(self) -> Result<(Option<String>, VpsChanges), VpsError> {
        let changes = VpsChanges {
            slug: trimmed(self.slug),
            friendly_name: trimmed(self.friendly_name),
            provider: self.provider.as_deref().map(parse_provider).transpose()?,
            package: trimmed(self.package),
            main_ip: self.main_ip.as_deref().map(parse_main_ip).transpose()?,
            hostname: trimmed(self.hostname),
            domain: trimmed(self.domain),
            webmail_url: trimmed(self.webmail_url),
            panel_url: trimmed(self.panel_url),
            panel_username: trimmed(self.panel_username),
            panel_password: self.panel_password,
            ssh_host: trimmed(self.ssh_host),
            ssh_user: self.ssh_user.as_deref().map(ssh_user_or_default),
            ssh_notes: trimmed(self.ssh_notes),
            is_active: self.is_active,
            notes: trimmed(self.notes),
            pod: trimmed(self.pod).map(|v| if v.is_empty() { None } else { Some(v) }),
        };
        Ok((trimmed(self.code), changes))
    }
}

/// Query string accepted by the server list endpoints.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct VpsListQuery {
    pub q: Option<String>,
    pub provider: Option<String>,
    pub active: Option<String>,
    pub pod: Option<String>,
}

impl From<VpsListQuery> for VpsFilter {
    fn from(query: VpsListQuery) -> Self {
        VpsFilter {
            q: query.q,
            provider: query.provider,
            active: query.active,
            pod: query.pod,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct PodListQuery {
    pub q: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct VpsServerResponse {
    pub id: i32,
    pub code: String,
    pub slug: String,
    pub friendly_name: String,
    pub provider: Provider,
    pub package: String,
    pub main_ip: Option<String>,
    pub hostname: String,
    pub domain: String,
    pub webmail_url: String,
    pub panel_url: String,
    pub panel_username: String,
    // Panel password is only included in the detail view, not the list view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_password: Option<String>,
    pub ssh_host: String,
    pub ssh_user: String,
    pub ssh_notes: String,
    pub is_active: bool,
    pub notes: String,
    pub pod_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VpsServerResponse {
    pub fn summary(model: vps_server::Model) -> Self {
        let mut response = Self::detail(model);
        response.panel_password = None;
        response
    }

    pub fn detail(model: vps_server::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            slug: model.slug,
            friendly_name: model.friendly_name,
            provider: model.provider,
            package: model.package,
            main_ip: model.main_ip,
            hostname: model.hostname,
            domain: model.domain,
            webmail_url: model.webmail_url,
            panel_url: model.panel_url,
            panel_username: model.panel_username,
            panel_password: Some(model.panel_password),
            ssh_host: model.ssh_host,
            ssh_user: model.ssh_user,
            ssh_notes: model.ssh_notes,
            is_active: model.is_active,
            notes: model.notes,
            pod_id: model.pod_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
