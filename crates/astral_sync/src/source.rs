//! # Delta Sources
//!
//! The network side of sync. [`DeltaSource`] is what [`crate::StateSync`]
//! talks to; [`JsonDeltaSource`] implements it over any byte-level
//! [`Transport`] using the server's JSON endpoints:
//!
//! | call | request | response |
//! |---|---|---|
//! | fetch deltas | `GET /sectors/{id}/deltas?since={v}` | [`DeltaResponse`] |
//! | bulk fetch | `POST /sectors/deltas/bulk` with [`BulkDeltaQuery`] | [`BulkDeltaResponse`] |
//! | version | `GET /sectors/{id}/version` | [`SectorVersionInfo`] |

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::delta::{
    BulkDeltaQuery, BulkDeltaRequest, BulkDeltaResponse, DeltaResponse, SectorVersionInfo,
};
use crate::error::{SyncError, SyncResult};

/// Server-side authority for sector deltas.
pub trait DeltaSource: Send + Sync + 'static {
    /// Deltas for one sector newer than `since_version`.
    fn fetch_deltas(
        &self,
        sector_id: &str,
        since_version: u64,
    ) -> impl Future<Output = SyncResult<DeltaResponse>> + Send;

    /// Deltas for many sectors in one round trip.
    fn fetch_bulk_deltas(
        &self,
        requests: &[BulkDeltaRequest],
    ) -> impl Future<Output = SyncResult<BulkDeltaResponse>> + Send;

    /// Server version summary for one sector.
    fn sector_version(
        &self,
        sector_id: &str,
    ) -> impl Future<Output = SyncResult<SectorVersionInfo>> + Send;
}

/// Byte-level request/response channel to the server.
///
/// Framing, authentication and retries belong to the implementation.
pub trait Transport: Send + Sync + 'static {
    /// Issues a GET and returns the response body.
    fn get(&self, path: &str) -> impl Future<Output = SyncResult<Vec<u8>>> + Send;

    /// Issues a POST with a JSON body and returns the response body.
    fn post(&self, path: &str, body: Vec<u8>) -> impl Future<Output = SyncResult<Vec<u8>>> + Send;
}

/// [`DeltaSource`] speaking JSON over a [`Transport`].
#[derive(Clone, Debug, Default)]
pub struct JsonDeltaSource<T> {
    transport: T,
}

impl<T: Transport> JsonDeltaSource<T> {
    /// Wraps a transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The wrapped transport.
    #[inline]
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

fn decode<R: DeserializeOwned>(body: &[u8]) -> SyncResult<R> {
    serde_json::from_slice(body).map_err(|e| SyncError::Parse(e.to_string()))
}

impl<T: Transport> DeltaSource for JsonDeltaSource<T> {
    async fn fetch_deltas(&self, sector_id: &str, since_version: u64) -> SyncResult<DeltaResponse> {
        let path = format!("/sectors/{sector_id}/deltas?since={since_version}");
        let body = self.transport.get(&path).await?;
        decode(&body)
    }

    async fn fetch_bulk_deltas(
        &self,
        requests: &[BulkDeltaRequest],
    ) -> SyncResult<BulkDeltaResponse> {
        let query = BulkDeltaQuery {
            requests: requests.to_vec(),
        };
        let payload = serde_json::to_vec(&query).map_err(|e| SyncError::Parse(e.to_string()))?;
        let body = self.transport.post("/sectors/deltas/bulk", payload).await?;
        decode(&body)
    }

    async fn sector_version(&self, sector_id: &str) -> SyncResult<SectorVersionInfo> {
        let path = format!("/sectors/{sector_id}/version");
        let body = self.transport.get(&path).await?;
        decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct CannedTransport {
        responses: HashMap<String, Vec<u8>>,
        posted: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl CannedTransport {
        fn respond(mut self, path: &str, body: &str) -> Self {
            self.responses.insert(path.to_owned(), body.as_bytes().to_vec());
            self
        }

        fn lookup(&self, path: &str) -> SyncResult<Vec<u8>> {
            self.responses
                .get(path)
                .cloned()
                .ok_or_else(|| SyncError::Network(format!("404 {path}")))
        }
    }

    impl Transport for CannedTransport {
        async fn get(&self, path: &str) -> SyncResult<Vec<u8>> {
            self.lookup(path)
        }

        async fn post(&self, path: &str, body: Vec<u8>) -> SyncResult<Vec<u8>> {
            self.posted.lock().push((path.to_owned(), body));
            self.lookup(path)
        }
    }

    #[tokio::test]
    async fn test_fetch_deltas_decodes() {
        let source = JsonDeltaSource::new(CannedTransport::default().respond(
            "/sectors/sector_1_0_0/deltas?since=2",
            r#"{"currentVersion":3,"deltas":[{"id":"d3","sectorId":"sector_1_0_0",
                "deltaType":"npc_spawned","changes":{},"appliedAt":0,"version":3}]}"#,
        ));
        let response = source.fetch_deltas("sector_1_0_0", 2).await.unwrap();
        assert_eq!(response.current_version, 3);
        assert_eq!(response.deltas.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let source = JsonDeltaSource::new(
            CannedTransport::default().respond("/sectors/s/version", "{\"currentVersion\":"),
        );
        assert!(matches!(source.sector_version("s").await, Err(SyncError::Parse(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let source = JsonDeltaSource::new(CannedTransport::default());
        assert!(matches!(
            source.fetch_deltas("s", 0).await,
            Err(SyncError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_bulk_posts_query() {
        let source = JsonDeltaSource::new(
            CannedTransport::default().respond("/sectors/deltas/bulk", r#"{"results":[]}"#),
        );
        let requests = [BulkDeltaRequest {
            sector_id: "s".to_owned(),
            since_version: 1,
        }];
        let response = source.fetch_bulk_deltas(&requests).await.unwrap();
        assert!(response.results.is_empty());

        let posted = source.transport().posted.lock();
        assert_eq!(posted[0].0, "/sectors/deltas/bulk");
        assert_eq!(
            posted[0].1,
            br#"{"requests":[{"sectorId":"s","sinceVersion":1}]}"#.to_vec()
        );
    }
}
