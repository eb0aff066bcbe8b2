// Device inventory endpoints
//
// Discovery of hotspot units available to the signed-in user, and the
// connect call that opens a backend session for one of them.

use tracing::debug;

use crate::client::HotspotClient;
use crate::error::Error;
use crate::models::{ConnectRequest, ConnectResponse, DeviceList, DeviceRecord};

impl HotspotClient {
    /// List devices the user may onboard.
    ///
    /// `GET devices/available?email={email}`
    pub async fn list_available_devices(&self, email: &str) -> Result<Vec<DeviceRecord>, Error> {
        let mut url = self.endpoint_url("devices/available")?;
        url.query_pairs_mut().append_pair("email", email);
        debug!(email, "listing available devices");
        let list: DeviceList = self.get(url).await?;
        Ok(list.devices)
    }

    /// Open a session with a device.
    ///
    /// `POST devices/connect` with `{"device_id": "...", "user_id": "..."}`
    pub async fn connect_device(
        &self,
        device_id: &str,
        user_id: &str,
    ) -> Result<ConnectResponse, Error> {
        let url = self.endpoint_url("devices/connect")?;
        debug!(device_id, "connecting device");
        self.post(url, &ConnectRequest { device_id, user_id }).await
    }
}
