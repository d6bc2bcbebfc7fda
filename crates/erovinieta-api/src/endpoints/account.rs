// Account and reference-data endpoints

use tracing::debug;

use super::paths;
use crate::error::Error;
use crate::models::{Country, UserData};
use crate::session::SessionClient;

impl SessionClient {
    /// Fetch the profile of the logged-in account.
    ///
    /// `GET rest/client/getUserData`
    pub async fn get_user_data(&self) -> Result<UserData, Error> {
        debug!("fetching user data");
        self.get_json(paths::USER_DATA, &[]).await
    }

    /// Fetch the country reference list (used to resolve vehicle country ids).
    ///
    /// `GET rest/anonymousUser/getCountries`
    pub async fn get_countries(&self) -> Result<Vec<Country>, Error> {
        debug!("fetching countries");
        self.get_json(paths::COUNTRIES, &[]).await
    }
}
