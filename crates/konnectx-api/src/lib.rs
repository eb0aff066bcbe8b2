//! Async client for the KonnectX hotspot backend.
//!
//! Covers the four REST calls the onboarding flow depends on:
//!
//! - `GET devices/available` and `POST devices/connect` ([`devices`])
//! - `GET networks/scan` and `POST networks/configure` ([`networks`])
//!
//! Every response is wrapped in the `{ success, data, error }` envelope.
//! [`HotspotClient`] strips it and hands back the typed `data` payload,
//! or an [`Error`] carrying the HTTP status plus the backend's error code
//! and message. Classifying those errors is left to `konnectx-core`.

pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod networks;
pub mod transport;

pub use client::HotspotClient;
pub use error::Error;
pub use models::{
    ConfigureRequest, ConnectResponse, ConnectionType, DeviceRecord, NetworkDetailsRecord,
    NetworkRecord, ScanResponse, StaticConfigBody,
};
pub use transport::{TlsMode, TransportConfig};
