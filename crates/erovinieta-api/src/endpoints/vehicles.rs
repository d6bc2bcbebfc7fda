// Vehicle listing endpoint

use tracing::debug;

use super::paths;
use crate::error::Error;
use crate::models::{Page, VehicleRow};
use crate::session::SessionClient;

impl SessionClient {
    /// Fetch one page of the account's vehicles, with vignette and balance data.
    ///
    /// `GET rest/client/vehicle/getVehiclesPaginated?limit={limit}&page={page}`
    pub async fn get_paginated_vehicles(
        &self,
        limit: u32,
        page: u32,
    ) -> Result<Page<VehicleRow>, Error> {
        debug!(limit, page, "fetching vehicles");
        self.get_json(
            paths::VEHICLES_PAGINATED,
            &[("limit", limit.to_string()), ("page", page.to_string())],
        )
        .await
    }
}
