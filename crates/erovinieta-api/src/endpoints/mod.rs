// Portal REST endpoints
//
// Each submodule adds inherent methods to `SessionClient`, one per remote
// capability. They build the URL and hand off to `SessionClient::request`;
// failures propagate unchanged.

mod account;
mod detections;
mod transactions;
mod vehicles;

use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;
use crate::session::SessionClient;

/// Page size used by the portal's own web client.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Relative endpoint paths under the portal base URL.
pub mod paths {
    pub const USER_DATA: &str = "rest/client/getUserData";
    pub const VEHICLES_PAGINATED: &str = "rest/client/vehicle/getVehiclesPaginated";
    pub const COUNTRIES: &str = "rest/anonymousUser/getCountries";
    pub const TRANSACTIONS: &str = "rest/client/transaction/getTransactionsPaginated";
    pub const TRANSACTION_DETAILS: &str = "rest/client/transaction/getTransactionDetails";
    pub const DETECTIONS: &str = "rest/client/detection/getDetectionsForVehicle";
}

impl SessionClient {
    /// Build an endpoint URL with query parameters and the cache-busting
    /// `timestamp` parameter appended last.
    pub(crate) fn query_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, Error> {
        let mut url = self.endpoint(path)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair(
                "timestamp",
                &chrono::Utc::now().timestamp_millis().to_string(),
            );
        }
        Ok(url)
    }

    /// `GET` a JSON document with re-authentication enabled.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.query_url(path, params)?;
        self.request(Method::GET, url, None, None, true).await
    }
}
