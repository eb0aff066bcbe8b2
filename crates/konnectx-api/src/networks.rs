// Network endpoints
//
// Session-scoped Wi-Fi scan and network configuration for a connected device.

use tracing::debug;

use crate::client::HotspotClient;
use crate::error::Error;
use crate::models::{ConfigureRequest, NetworkDetailsRecord, ScanResponse};

impl HotspotClient {
    /// Scan for Wi-Fi networks visible to the device.
    ///
    /// `GET networks/scan?device_id={device_id}&session_id={session_id}`
    pub async fn scan_networks(
        &self,
        device_id: &str,
        session_id: &str,
    ) -> Result<ScanResponse, Error> {
        let mut url = self.endpoint_url("networks/scan")?;
        url.query_pairs_mut()
            .append_pair("device_id", device_id)
            .append_pair("session_id", session_id);
        debug!(device_id, "scanning networks");
        self.get(url).await
    }

    /// Join the device to a network.
    ///
    /// `POST networks/configure`
    pub async fn configure_network(
        &self,
        request: &ConfigureRequest,
    ) -> Result<NetworkDetailsRecord, Error> {
        let url = self.endpoint_url("networks/configure")?;
        debug!(
            device_id = %request.device_id,
            ssid = %request.ssid,
            connection_type = ?request.connection_type,
            "configuring network"
        );
        self.post(url, request).await
    }
}
