//! NBP (Narodowy Bank Polski) exchange rate provider, table A mid rates.

use super::{ExchangeRate, RateProvider, RateProviderError};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct NbpRateProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NbpResponse {
    rates: Vec<NbpRate>,
}

#[derive(Debug, Deserialize)]
struct NbpRate {
    no: String,
    #[serde(rename = "effectiveDate")]
    effective_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    mid: Decimal,
}

impl NbpRateProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn default_url() -> Self {
        Self::new("https://api.nbp.pl".to_string())
    }
}

#[async_trait]
impl RateProvider for NbpRateProvider {
    async fn fetch_rate(
        &self,
        currency: &str,
        date: NaiveDate,
    ) -> Result<ExchangeRate, RateProviderError> {
        let url = format!(
            "{}/api/exchangerates/rates/A/{}/{}/?format=json",
            self.base_url, currency, date
        );
        debug!("Fetching exchange rate: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RateProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateProviderError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .json::<NbpResponse>()
            .await
            .map_err(|e| RateProviderError::Parse(e.to_string()))?;

        let rate = body
            .rates
            .into_iter()
            .next()
            .ok_or_else(|| RateProviderError::Parse("Empty rates array".to_string()))?;

        Ok(ExchangeRate {
            currency: currency.to_string(),
            reference_number: rate.no,
            date: rate.effective_date,
            rate: rate.mid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nbp_response_shape_parses() {
        let body: NbpResponse = serde_json::from_str(
            r#"{
                "table": "A",
                "currency": "euro",
                "code": "EUR",
                "rates": [
                    {"no": "053/A/NBP/2024", "effectiveDate": "2024-03-15", "mid": 4.3069}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(body.rates.len(), 1);
        assert_eq!(body.rates[0].no, "053/A/NBP/2024");
        assert_eq!(
            body.rates[0].effective_date,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }
}
