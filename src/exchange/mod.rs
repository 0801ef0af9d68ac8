//! Exchange rate resolution with date-stepping retry and TTL caching.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

pub mod mock;
pub mod nbp;

pub use mock::MockRateProvider;
pub use nbp::NbpRateProvider;

/// A resolved conversion rate. `rate == 1` with an empty reference number
/// means no conversion applies: either the base currency or the fallback
/// after exhausted retries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRate {
    pub currency: String,
    pub reference_number: String,
    pub date: NaiveDate,
    pub rate: Decimal,
}

impl ExchangeRate {
    pub fn identity(currency: &str, date: NaiveDate) -> Self {
        ExchangeRate {
            currency: currency.to_string(),
            reference_number: String::new(),
            date,
            rate: Decimal::ONE,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.rate == Decimal::ONE
    }
}

#[derive(Debug, Clone, Error)]
pub enum RateProviderError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {status}")]
    Http { status: u16 },
    #[error("Parse error: {0}")]
    Parse(String),
}

/// External rate provider for a single (currency, date) lookup. No
/// retries at this layer; the service owns the date-stepping policy.
#[async_trait]
pub trait RateProvider: Send + Sync + fmt::Debug {
    async fn fetch_rate(
        &self,
        currency: &str,
        date: NaiveDate,
    ) -> Result<ExchangeRate, RateProviderError>;
}

/// Resolves `(currency, date)` to an exchange rate.
///
/// Base-currency lookups short-circuit to the identity rate with no
/// provider call. Provider failures step the date back one calendar day,
/// up to `retries` extra attempts; when exhausted the identity rate is
/// returned instead of an error, so callers always get a usable rate.
/// Successful lookups are cached in-process with a TTL.
#[derive(Debug)]
pub struct ExchangeService {
    provider: Arc<dyn RateProvider>,
    base_currency: String,
    retries: u32,
    cache_ttl: Duration,
    cache: Mutex<HashMap<(String, NaiveDate), (ExchangeRate, Instant)>>,
}

impl ExchangeService {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        base_currency: String,
        retries: u32,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            base_currency,
            retries,
            cache_ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_rate(&self, currency: &str, date: NaiveDate) -> ExchangeRate {
        if currency == self.base_currency {
            return ExchangeRate::identity(currency, date);
        }

        let key = (currency.to_string(), date);
        if let Some(cached) = self.cache_get(&key) {
            return cached;
        }

        let mut attempt_date = date;
        let mut attempts = 0;
        loop {
            match self.provider.fetch_rate(currency, attempt_date).await {
                Ok(rate) => {
                    info!(
                        "Exchange rate for {} on {} fetched successfully",
                        rate.currency, rate.date
                    );
                    self.cache_put(key, rate.clone());
                    return rate;
                }
                Err(error) => {
                    warn!(
                        "Error fetching exchange rate for {} on {}: {}",
                        currency, attempt_date, error
                    );
                    attempts += 1;
                    if attempts > self.retries {
                        warn!(
                            "Exchange rate lookup exhausted after {} attempts, \
                             falling back to identity rate for {}",
                            attempts, currency
                        );
                        return ExchangeRate::identity(currency, attempt_date);
                    }
                    attempt_date = attempt_date.pred_opt().unwrap_or(attempt_date);
                }
            }
        }
    }

    fn cache_get(&self, key: &(String, NaiveDate)) -> Option<ExchangeRate> {
        let cache = self.cache.lock().expect("lock poisoned");
        cache.get(key).and_then(|(rate, stored_at)| {
            (stored_at.elapsed() < self.cache_ttl).then(|| rate.clone())
        })
    }

    fn cache_put(&self, key: (String, NaiveDate), rate: ExchangeRate) {
        self.cache
            .lock()
            .expect("lock poisoned")
            .insert(key, (rate, Instant::now()));
    }
}
