//! CometBFT RPC adapter.
//!
//! Collects node telemetry by issuing plain `GET` requests against the node's
//! HTTP RPC endpoints. Every response wraps its payload in a `result`
//! envelope; the adapter extracts the nested fields it needs and treats a
//! missing or malformed path as a parse failure.
//!
//! ## Metrics Collected
//!
//! - **Header**: block height and timestamp (`/header`)
//! - **Consensus params**: maximum block size in bytes (`/consensus_params`)
//! - **ABCI info**: application binary name and version (`/abci_info`)
//! - **Unconfirmed txs**: pending transaction count and bytes (`/unconfirmed_txs`)
//! - **Validators**: validator set size (`/validators`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use blockwatch::source::{Metric, NodeSource, RpcClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RpcClient::builder()
//!         .endpoint("https://rpc.lunaroasis.net")
//!         .build()?;
//!
//!     let header = client.fetch(Metric::Header).await?;
//!     println!("{:?}", header);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::{
    BlockHeader, FetchError, FetchErrorKind, MempoolStats, Metric, MetricValue, NodeInfo,
    NodeSource,
};

/// Default node queried when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://rpc.lunaroasis.net";

/// HTTP client for a single CometBFT RPC node.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    endpoint: String,
    description: String,
}

impl RpcClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> RpcClientBuilder {
        RpcClientBuilder::default()
    }

    /// The node URL this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get<T: DeserializeOwned>(&self, metric: Metric) -> Result<T, FetchError> {
        let url = format!("{}{}", self.endpoint, metric.path());
        debug!(%metric, %url, "fetching");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::new(metric, e.into()))?;

        if !response.status().is_success() {
            return Err(FetchError::new(
                metric,
                FetchErrorKind::Response(response.status().as_u16()),
            ));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| FetchError::new(metric, FetchErrorKind::Parse(e.to_string())))?;

        Ok(envelope.result)
    }
}

#[async_trait]
impl NodeSource for RpcClient {
    async fn fetch(&self, metric: Metric) -> Result<MetricValue, FetchError> {
        match metric {
            Metric::Header => {
                let result: HeaderResult = self.get(metric).await?;
                Ok(MetricValue::Header(BlockHeader {
                    height: result.header.height,
                    time: result.header.time,
                }))
            }
            Metric::ConsensusParams => {
                let result: ConsensusParamsResult = self.get(metric).await?;
                Ok(MetricValue::MaxBytes(result.consensus_params.block.max_bytes))
            }
            Metric::NodeInfo => {
                let result: AbciInfoResult = self.get(metric).await?;
                Ok(MetricValue::NodeInfo(NodeInfo {
                    name: result.response.data,
                    version: result.response.version,
                }))
            }
            Metric::UnconfirmedTxs => {
                let result: UnconfirmedTxsResult = self.get(metric).await?;
                Ok(MetricValue::Mempool(MempoolStats {
                    count: result.n_txs,
                    bytes: result.total_bytes,
                }))
            }
            Metric::Validators => {
                let result: ValidatorsResult = self.get(metric).await?;
                Ok(MetricValue::Validators(result.total))
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for RpcClient.
#[derive(Debug, Default)]
pub struct RpcClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl RpcClientBuilder {
    /// Set the node URL (e.g., "https://rpc.lunaroasis.net").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> reqwest::Result<RpcClient> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let client = Client::builder().timeout(timeout).build()?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(RpcClient {
            client,
            description: format!("rpc: {}", endpoint),
            endpoint,
        })
    }
}

/// The JSON-RPC envelope every endpoint answers with.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct HeaderResult {
    header: RawHeader,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    height: u64,
    time: String,
}

#[derive(Debug, Deserialize)]
struct ConsensusParamsResult {
    consensus_params: RawConsensusParams,
}

#[derive(Debug, Deserialize)]
struct RawConsensusParams {
    block: RawBlockParams,
}

#[derive(Debug, Deserialize)]
struct RawBlockParams {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    max_bytes: u64,
}

#[derive(Debug, Deserialize)]
struct AbciInfoResult {
    response: RawAbciResponse,
}

#[derive(Debug, Deserialize)]
struct RawAbciResponse {
    data: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct UnconfirmedTxsResult {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    n_txs: u64,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    total_bytes: u64,
}

#[derive(Debug, Deserialize)]
struct ValidatorsResult {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    total: u64,
}

// CometBFT encodes 64-bit integers as JSON strings; accept plain numbers too.
fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
