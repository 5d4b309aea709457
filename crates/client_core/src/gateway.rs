use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::DoctorId,
    protocol::{Appointment, DashboardMetrics, Doctor, DoctorDraft},
};
use tracing::debug;
use url::Url;

use crate::{
    credentials::{CredentialAccessor, NoCredential},
    error::{ClinicError, ClinicResult},
};

pub const DEFAULT_BASE_URL: &str = "https://crmeyecare.onrender.com/";

const DASHBOARD_PATH: &str = "dashboard/";
const APPOINTMENTS_PATH: &str = "appointments";
const DOCTORS_PATH: &str = "doctors";

#[async_trait]
pub trait DoctorGateway: Send + Sync {
    async fn list_doctors(&self) -> ClinicResult<Vec<Doctor>>;
    async fn create_doctor(&self, draft: &DoctorDraft) -> ClinicResult<Doctor>;
    async fn update_doctor(&self, id: DoctorId, draft: &DoctorDraft) -> ClinicResult<Doctor>;
    async fn delete_doctor(&self, id: DoctorId) -> ClinicResult<()>;
}

#[async_trait]
pub trait DashboardGateway: Send + Sync {
    async fn fetch_metrics(&self) -> ClinicResult<DashboardMetrics>;
    async fn fetch_appointments(&self) -> ClinicResult<Vec<Appointment>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    base_url: Url,
}

impl GatewayConfig {
    /// Endpoint paths are joined onto `base_url`, so a missing trailing slash
    /// is added to keep any path prefix (`https://host/api`) intact.
    pub fn new(base_url: &str) -> ClinicResult<Self> {
        let trimmed = base_url.trim();
        let base_url = if trimmed.ends_with('/') {
            Url::parse(trimmed)?
        } else {
            Url::parse(&format!("{trimmed}/"))?
        };
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClinicResult<Url> {
        Ok(self.base_url.join(path)?)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
        }
    }
}

/// REST gateway for the clinic backend. One request per call: no retries and
/// no client-side timeout beyond reqwest's defaults.
pub struct HttpGateway {
    http: Client,
    config: GatewayConfig,
    credentials: Arc<dyn CredentialAccessor>,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig, credentials: Arc<dyn CredentialAccessor>) -> Self {
        Self::with_client(Client::new(), config, credentials)
    }

    pub fn anonymous(config: GatewayConfig) -> Self {
        Self::new(config, Arc::new(NoCredential))
    }

    pub fn with_client(
        http: Client,
        config: GatewayConfig,
        credentials: Arc<dyn CredentialAccessor>,
    ) -> Self {
        Self {
            http,
            config,
            credentials,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> ClinicResult<RequestBuilder> {
        let url = self.config.endpoint(path)?;
        debug!(%method, %url, "issuing clinic api request");
        let builder = self.http.request(method, url);
        // A missing token does not short-circuit; the backend decides.
        Ok(match self.credentials.get_token() {
            Some(token) => builder.bearer_auth(token),
            None => {
                debug!(path, "no credential available, sending request unauthenticated");
                builder
            }
        })
    }

    async fn execute(&self, builder: RequestBuilder) -> ClinicResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|err| ClinicError::Transport(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClinicError::Remote {
            status: status.as_u16(),
            body,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClinicResult<T> {
        let response = self.execute(builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ClinicError::Transport(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| ClinicError::Decode(err.to_string()))
    }
}

fn doctor_path(id: DoctorId) -> String {
    format!("{DOCTORS_PATH}/{}", id.0)
}

#[async_trait]
impl DoctorGateway for HttpGateway {
    async fn list_doctors(&self) -> ClinicResult<Vec<Doctor>> {
        let request = self.request(Method::GET, DOCTORS_PATH)?;
        self.fetch_json(request).await
    }

    async fn create_doctor(&self, draft: &DoctorDraft) -> ClinicResult<Doctor> {
        let request = self.request(Method::POST, DOCTORS_PATH)?.json(draft);
        self.fetch_json(request).await
    }

    async fn update_doctor(&self, id: DoctorId, draft: &DoctorDraft) -> ClinicResult<Doctor> {
        let request = self.request(Method::PUT, &doctor_path(id))?.json(draft);
        self.fetch_json(request).await
    }

    async fn delete_doctor(&self, id: DoctorId) -> ClinicResult<()> {
        let request = self.request(Method::DELETE, &doctor_path(id))?;
        self.execute(request).await?;
        Ok(())
    }
}

#[async_trait]
impl DashboardGateway for HttpGateway {
    async fn fetch_metrics(&self) -> ClinicResult<DashboardMetrics> {
        let request = self.request(Method::GET, DASHBOARD_PATH)?;
        self.fetch_json(request).await
    }

    async fn fetch_appointments(&self) -> ClinicResult<Vec<Appointment>> {
        let request = self.request(Method::GET, APPOINTMENTS_PATH)?;
        self.fetch_json(request).await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
