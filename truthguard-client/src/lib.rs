//! Backend-agnostic analysis clients for TruthGuard.
//!
//! This crate exposes a common [`traits::AnalysisClient`] interface with two
//! implementations: [`remote::RemoteClient`] for the HTTP analysis service and
//! [`simulated::SimulatedClient`] for local, heuristic answers. It also
//! provides [`build_client`] to pick one from a [`TruthGuardConfig`].
//!
//! # Examples
//! ```no_run
//! use truthguard_client::{build_client, AnalysisRequest};
//! use truthguard_common::Result;
//! use truthguard_config::TruthGuardConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let client = build_client(&TruthGuardConfig::default())?;
//! let raw = client.analyze(AnalysisRequest::Text("hello".into())).await?;
//! assert!(raw.as_value().is_object());
//! # Ok(())
//! # }
//! ```
pub mod remote;
pub mod simulated;
pub mod traits;

use remote::RemoteClient;
use simulated::SimulatedClient;
use std::sync::Arc;
use std::time::Duration;
use truthguard_config::{ClientMode, TruthGuardConfig};

pub use traits::{AnalysisClient, AnalysisRequest, MediaUpload};

/// Build the client selected by `config.client.mode`.
pub fn build_client(
    config: &TruthGuardConfig,
) -> truthguard_common::Result<Arc<dyn AnalysisClient + Send + Sync + 'static>> {
    let settings = &config.client;
    match settings.mode {
        ClientMode::Remote => {
            let client = RemoteClient::new(
                &settings.base_url,
                Duration::from_secs(settings.timeout_secs),
            )?;
            tracing::info!(
                event = "analysis.client.ready",
                backend = "remote",
                base_url = client.base_url(),
                timeout_secs = settings.timeout_secs
            );
            Ok(Arc::new(client))
        }
        ClientMode::Simulated => {
            let client = SimulatedClient::new(config.simulation.clone(), settings.seed)?
                .with_latency(Duration::from_millis(settings.simulated_latency_ms));
            tracing::info!(
                event = "analysis.client.ready",
                backend = "simulated",
                seeded = settings.seed.is_some(),
                latency_ms = settings.simulated_latency_ms
            );
            Ok(Arc::new(client))
        }
    }
}
