//! Domain types for the invoice pipeline.
//!
//! This module provides:
//! - Raw Notion page model with a tagged property-value union
//! - Resolved page tree produced by relation resolution
//! - Typed invoice view over the normalized record
//! - Processing status enum persisted on the remote page

pub mod invoice;
pub mod page;

pub use invoice::{InvoiceData, InvoiceDataError, InvoiceStatus};
pub use page::{
    DateRange, FileRef, PageNode, PropertyValue, RawPage, ResolvedProperty, RollupValue,
    SelectOption,
};
