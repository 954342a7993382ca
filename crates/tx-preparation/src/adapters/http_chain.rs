//! HTTP Chain Client Adapter
//!
//! Implements [`ChainProvider`] and [`ActionEncoder`] against a node's
//! `/v1/chain/*` HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::rpc_types::*;
use crate::config::PreparationConfig;
use crate::domain::{BlockInfo, ChainInfo, ContractName, ProviderError};
use crate::ports::{ActionEncoder, ChainProvider, EncodeRequest};

/// Error code the node reports for a block it does not have.
pub const UNKNOWN_BLOCK_CODE: i64 = 3_100_002;

/// Node client over HTTP.
#[derive(Clone, Debug)]
pub struct HttpChainClient {
    client: Client,
    base_url: String,
}

impl HttpChainClient {
    /// Client for the node at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client for the configured endpoint and timeout.
    pub fn from_config(config: &PreparationConfig) -> Result<Self, ProviderError> {
        Self::new(
            config.rpc_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Node endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<P: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &P,
    ) -> Result<R, ProviderError> {
        let url = format!("{}/v1/chain/{}", self.base_url, endpoint);
        debug!("[txp] POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body: RpcErrorResponse = serde_json::from_str(&text).unwrap_or_default();
            let message = if body.describe().is_empty() {
                text
            } else {
                body.describe()
            };
            let code = match body.effective_code() {
                0 => i64::from(status.as_u16()),
                code => code,
            };
            return Err(ProviderError::Rpc { code, message });
        }

        response.json().await.map_err(|e| ProviderError::Rpc {
            code: i64::from(status.as_u16()),
            message: format!("malformed {} response: {}", endpoint, e),
        })
    }
}

#[async_trait]
impl ChainProvider for HttpChainClient {
    async fn get_info(&self) -> Result<ChainInfo, ProviderError> {
        let info: GetInfoResponse = self.call("get_info", &serde_json::json!({})).await?;
        Ok(ChainInfo {
            chain_id: info.chain_id,
            head_block_num: info.head_block_num,
        })
    }

    async fn get_block(&self, block_num: u64) -> Result<BlockInfo, ProviderError> {
        let request = GetBlockRequest {
            block_num_or_id: block_num,
        };
        let block: GetBlockResponse = match self.call("get_block", &request).await {
            Err(ProviderError::Rpc {
                code: UNKNOWN_BLOCK_CODE,
                ..
            }) => return Err(ProviderError::NotFound(format!("block {}", block_num))),
            other => other?,
        };

        Ok(BlockInfo {
            block_num: block.block_num,
            ref_block_prefix: block.ref_block_prefix,
        })
    }

    async fn get_raw_abi(&self, account: &ContractName) -> Result<Vec<u8>, ProviderError> {
        let request = GetAbiRequest {
            account_name: account.to_string(),
        };
        let response: GetAbiResponse = self.call("get_abi", &request).await?;

        if response.account_name != account.as_str() {
            return Err(ProviderError::PartialMiss(vec![account.clone()]));
        }
        let abi = response
            .abi
            .ok_or_else(|| ProviderError::NotFound(format!("abi for {}", account)))?;
        serde_json::to_vec(&abi).map_err(|e| ProviderError::Rpc {
            code: 0,
            message: format!("abi for {} is not serializable: {}", account, e),
        })
    }
}

#[async_trait]
impl ActionEncoder for HttpChainClient {
    async fn encode_action(&self, request: EncodeRequest<'_>) -> Result<Vec<u8>, ProviderError> {
        let body = AbiJsonToBinRequest {
            code: request.account.to_string(),
            action: request.intent.to_string(),
            args: request.parameters.clone(),
        };
        let response: AbiJsonToBinResponse = match self.call("abi_json_to_bin", &body).await {
            Err(ProviderError::Rpc { message, .. }) => {
                return Err(ProviderError::Encode(message))
            }
            other => other?,
        };

        hex::decode(&response.binargs)
            .map_err(|e| ProviderError::Encode(format!("binargs is not hex: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one request with `status` and `body`, returning the request text.
    async fn serve_once(
        status: &'static str,
        body: String,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (url, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn client(url: &str) -> HttpChainClient {
        HttpChainClient::new(url, Duration::from_secs(5)).unwrap()
    }

    fn name(s: &str) -> ContractName {
        ContractName::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_get_info() {
        let (url, server) = serve_once(
            "200 OK",
            json!({"chain_id": "abc", "head_block_num": 100, "head_block_id": "00"}).to_string(),
        )
        .await;

        let info = client(&url).get_info().await.unwrap();
        assert_eq!(info.chain_id, "abc");
        assert_eq!(info.head_block_num, 100);
        assert!(server.await.unwrap().starts_with("POST /v1/chain/get_info"));
    }

    #[tokio::test]
    async fn test_get_block_sends_number() {
        let (url, server) = serve_once(
            "200 OK",
            json!({"block_num": 97, "ref_block_prefix": 555}).to_string(),
        )
        .await;

        let block = client(&url).get_block(97).await.unwrap();
        assert_eq!(block.ref_block_prefix, 555);
        assert!(server.await.unwrap().contains(r#""block_num_or_id":97"#));
    }

    #[tokio::test]
    async fn test_unknown_block_is_not_found() {
        let (url, _server) = serve_once(
            "500 Internal Server Error",
            json!({"code": 500, "message": "Internal Service Error",
                   "error": {"code": UNKNOWN_BLOCK_CODE, "name": "unknown_block_exception",
                             "what": "Unknown block", "details": []}})
            .to_string(),
        )
        .await;

        let err = client(&url).get_block(9).await.unwrap_err();
        assert_eq!(err, ProviderError::NotFound("block 9".to_string()));
    }

    #[tokio::test]
    async fn test_rpc_error_body() {
        let (url, _server) = serve_once(
            "400 Bad Request",
            json!({"code": 400, "message": "Bad Request"}).to_string(),
        )
        .await;

        let err = client(&url).get_info().await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::Rpc {
                code: 400,
                message: "Bad Request".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_get_abi_returns_document() {
        let abi = json!({"version": "eosio::abi/1.1", "actions": []});
        let (url, _server) = serve_once(
            "200 OK",
            json!({"account_name": "eosio.token", "abi": abi}).to_string(),
        )
        .await;

        let raw = client(&url).get_raw_abi(&name("eosio.token")).await.unwrap();
        let back: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(back, abi);
    }

    #[tokio::test]
    async fn test_get_abi_without_contract() {
        let (url, _server) =
            serve_once("200 OK", json!({"account_name": "alice"}).to_string()).await;

        let err = client(&url).get_raw_abi(&name("alice")).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = client(&url).get_info().await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        assert_eq!(client("http://node:8888/").base_url(), "http://node:8888");
    }
}
