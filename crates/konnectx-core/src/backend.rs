// ── Backend capability ──
//
// The wizard talks to the hotspot backend through `OnboardingBackend` so
// tests can drive it with an in-memory fake. `HotspotClient` is the real
// implementation.

use async_trait::async_trait;

use konnectx_api::{ConfigureRequest, HotspotClient, TlsMode, TransportConfig};

use crate::config::{OnboardingConfig, TlsVerification};
use crate::convert;
use crate::error::CoreError;
use crate::model::{Device, NetworkConfiguration, NetworkDetails, ScanResult, Session};

/// The four backend operations onboarding depends on.
#[async_trait]
pub trait OnboardingBackend: Send + Sync {
    async fn list_devices(&self, email: &str) -> Result<Vec<Device>, CoreError>;

    async fn connect_device(&self, device_id: &str, user_id: &str)
    -> Result<Session, CoreError>;

    async fn scan_networks(
        &self,
        device_id: &str,
        session_id: &str,
    ) -> Result<ScanResult, CoreError>;

    async fn configure_network(
        &self,
        config: &NetworkConfiguration,
    ) -> Result<NetworkDetails, CoreError>;
}

#[async_trait]
impl OnboardingBackend for HotspotClient {
    async fn list_devices(&self, email: &str) -> Result<Vec<Device>, CoreError> {
        let records = self.list_available_devices(email).await?;
        Ok(records.into_iter().map(Device::from).collect())
    }

    async fn connect_device(
        &self,
        device_id: &str,
        user_id: &str,
    ) -> Result<Session, CoreError> {
        let resp = HotspotClient::connect_device(self, device_id, user_id).await?;
        Ok(Session::from(resp))
    }

    async fn scan_networks(
        &self,
        device_id: &str,
        session_id: &str,
    ) -> Result<ScanResult, CoreError> {
        let resp = HotspotClient::scan_networks(self, device_id, session_id).await?;
        Ok(ScanResult::from(resp))
    }

    async fn configure_network(
        &self,
        config: &NetworkConfiguration,
    ) -> Result<NetworkDetails, CoreError> {
        let request = ConfigureRequest::from(config);
        let record = HotspotClient::configure_network(self, &request).await?;
        Ok(convert::network_details(record, &config.ssid))
    }
}

/// Build the HTTP client described by `config`.
pub fn build_client(config: &OnboardingConfig) -> Result<HotspotClient, CoreError> {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    let transport = TransportConfig {
        tls,
        timeout: config.timeout,
        bearer_token: config.bearer_token.clone(),
    };
    Ok(HotspotClient::new(config.backend_url.clone(), &transport)?)
}
