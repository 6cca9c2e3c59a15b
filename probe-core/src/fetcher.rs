use std::fmt::Debug;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::QueryError;
use crate::model::{QueryKey, RawReadings};

pub mod http;

/// One network round trip for a query key.
///
/// Implementations honor the cancellation token cooperatively and report
/// `QueryError::Cancelled` when superseded. Cancellation is best-effort
/// resource cleanup only: the coordinator's generation check discards a
/// stale result even if the transport never actually stopped.
#[async_trait]
pub trait ReadingsFetcher: Send + Sync + Debug {
    async fn fetch(
        &self,
        key: &QueryKey,
        cancel: CancellationToken,
    ) -> Result<RawReadings, QueryError>;
}
