pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod notion;
pub mod processor;
pub mod render;
pub mod storage;

pub use config::Config;
pub use domain::{InvoiceData, InvoiceStatus, PageNode, PropertyValue, RawPage, ResolvedProperty};
pub use error::AppError;
pub use exchange::{ExchangeRate, ExchangeService, RateProvider};
pub use notion::{NotionApi, NotionClient, NotionError, PageResolver};
pub use processor::{InvoiceProcessor, ProcessError, ProcessOutcome};
pub use storage::{BlobStorage, StorageError};
