use chrono::NaiveDate;
use reqwest::Method;
use crate::client::credentials::UserCredential;
use crate::client::error::{ClientError, Result};
use crate::client::executor::{ApiClient, ApiRequest};
use crate::models::models::LikesPerDay;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rows must be strictly ascending by day, which also rules out duplicates.
fn check_ordering(rows: &[LikesPerDay]) -> Result<()> {
    match rows.windows(2).find(|pair| pair[0].date >= pair[1].date) {
        Some(pair) => Err(ClientError::Decode(format!(
            "analytics rows out of order: {} then {}",
            pair[0].date, pair[1].date
        ))),
        None => Ok(()),
    }
}

impl ApiClient {
    /// Likes per calendar day within the given bounds, ascending by day.
    /// At least one bound is required.
    pub async fn likes_analytics(
        &self,
        credential: &mut UserCredential,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<LikesPerDay>> {
        if date_from.is_none() && date_to.is_none() {
            return Err(ClientError::Parameter(
                "at least one of date_from and date_to is required".to_string(),
            ));
        }

        let mut request = ApiRequest::new(self.url(&self.config().api.analytics_path));
        if let Some(from) = date_from {
            request = request.query("date_from", from.format(DATE_FORMAT).to_string());
        }
        if let Some(to) = date_to {
            request = request.query("date_to", to.format(DATE_FORMAT).to_string());
        }

        let body = match self.execute(Method::GET, credential, &request).await {
            Ok(body) => body,
            Err(ClientError::Rejected { status: 400, body }) => {
                return Err(ClientError::Parameter(body.to_string()))
            }
            Err(e) => return Err(e),
        };

        let rows: Vec<LikesPerDay> = serde_json::from_value(body)
            .map_err(|e| ClientError::Decode(format!("analytics: {}", e)))?;
        check_ordering(&rows)?;
        Ok(rows)
    }
}
