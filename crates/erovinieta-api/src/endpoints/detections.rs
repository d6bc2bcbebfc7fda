// Bridge-crossing detection endpoint

use reqwest::Method;
use tracing::debug;

use super::paths;
use crate::error::Error;
use crate::models::{DetectionList, DetectionQuery};
use crate::session::SessionClient;

impl SessionClient {
    /// Fetch the bridge-crossing detections recorded for one vehicle.
    ///
    /// The vehicle is identified by the full (VIN, plate, certificate series)
    /// triple; the portal repeats it inside `vehicleFleetEntity`.
    ///
    /// `POST rest/client/detection/getDetectionsForVehicle`
    pub async fn get_bridge_crossings(
        &self,
        query: &DetectionQuery<'_>,
    ) -> Result<DetectionList, Error> {
        debug!(
            plate = query.plate_no,
            period = query.period,
            "fetching bridge crossings"
        );
        let url = self.endpoint(paths::DETECTIONS)?;
        let body = serde_json::to_value(query).map_err(|e| Error::ApiRequest {
            status: None,
            body: format!("failed to encode detection query: {e}"),
        })?;
        self.request(Method::POST, url, Some(&body), None, true).await
    }
}
