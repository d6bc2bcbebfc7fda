// Transaction endpoints

use serde_json::Value;
use tracing::debug;

use super::paths;
use crate::error::Error;
use crate::models::{Page, Transaction};
use crate::session::SessionClient;

impl SessionClient {
    /// Fetch transactions whose date falls in `[date_from_ms, date_to_ms]`.
    ///
    /// Bounds are epoch milliseconds, inclusive.
    ///
    /// `GET rest/client/transaction/getTransactionsPaginated?dateFrom=..&dateTo=..`
    pub async fn get_transactions(
        &self,
        date_from_ms: i64,
        date_to_ms: i64,
    ) -> Result<Page<Transaction>, Error> {
        debug!(date_from_ms, date_to_ms, "fetching transactions");
        self.get_json(
            paths::TRANSACTIONS,
            &[
                ("dateFrom", date_from_ms.to_string()),
                ("dateTo", date_to_ms.to_string()),
            ],
        )
        .await
    }

    /// Fetch the detail document for one transaction.
    ///
    /// The portal returns an invoice-shaped document whose layout varies by
    /// product, so it is returned loosely typed.
    ///
    /// `GET rest/client/transaction/getTransactionDetails?series={series}`
    pub async fn get_transaction_detail(&self, series: &str) -> Result<Value, Error> {
        debug!(series, "fetching transaction detail");
        self.get_json(paths::TRANSACTION_DETAILS, &[("series", series.to_owned())])
            .await
    }
}
