//! Domain logic for freight quoting lives here.

pub mod entities;
pub mod pricing;
pub mod quote;

pub use entities::{
    is_minimum_package, quantity_range, Coordinates, LocalityEntry, PricingParameters,
    QuantityRange, QuoteDraft, TariffEntry, Warehouse, MINIMUM_PACKAGE_CLASS,
};
pub use pricing::{
    compute_final_cost, validate_quantity, PriceBreakdown, QuantityError, INSURANCE_RATE,
    VAT_FACTOR,
};
pub use quote::{AssembleError, Quote, QuoteRecord};
