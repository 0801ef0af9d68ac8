//! Mock rate provider for testing without network calls.

use super::{ExchangeRate, RateProvider, RateProviderError};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MockRateProvider {
    rates: HashMap<(String, NaiveDate), Decimal>,
    fail_always: bool,
    requests: Mutex<Vec<NaiveDate>>,
}

impl MockRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a rate for the given currency and date.
    pub fn with_rate(mut self, currency: &str, date: NaiveDate, rate: Decimal) -> Self {
        self.rates.insert((currency.to_string(), date), rate);
        self
    }

    /// Fail every lookup regardless of published rates.
    pub fn failing(mut self) -> Self {
        self.fail_always = true;
        self
    }

    /// Dates requested so far, in call order.
    pub fn requested_dates(&self) -> Vec<NaiveDate> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl RateProvider for MockRateProvider {
    async fn fetch_rate(
        &self,
        currency: &str,
        date: NaiveDate,
    ) -> Result<ExchangeRate, RateProviderError> {
        self.requests.lock().expect("lock poisoned").push(date);

        if self.fail_always {
            return Err(RateProviderError::Http { status: 404 });
        }

        match self.rates.get(&(currency.to_string(), date)) {
            Some(rate) => Ok(ExchangeRate {
                currency: currency.to_string(),
                reference_number: format!("{}/A/NBP/{}", date.format("%j"), date.format("%Y")),
                date,
                rate: *rate,
            }),
            None => Err(RateProviderError::Http { status: 404 }),
        }
    }
}
