//! # Fairval Core
//!
//! Domain types and data provider contracts for the fairval discounted cash
//! flow calculator.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo Finance, in-memory fixtures) |
//! | [`data_source`] | [`FinancialDataProvider`] trait and [`SourceError`] |
//! | [`domain`] | Symbols, period labels, time series, statements |
//! | [`error`] | [`ValidationError`] |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`source`] | Provider identifiers |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  Valuation pipeline │
//! └──────────┬──────────┘
//!            │ FinancialDataProvider
//!            ▼
//! ┌─────────────────────┐     ┌──────────────────┐
//! │ YahooAdapter /      │────▶│ HttpClient       │
//! │ FixtureProvider     │     │ (reqwest/noop)   │
//! └──────────┬──────────┘     └──────────────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CompanyFinancials   │
//! └─────────────────────┘
//! ```

pub mod adapters;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod source;

pub use adapters::{FixtureProvider, YahooAdapter, YahooAuthManager};

pub use data_source::{FinancialDataProvider, ProviderFuture, SourceError, SourceErrorKind};

pub use domain::{
    CashFlowHistory, CompanyFinancials, CompanyProfile, EstimateHorizon, HorizonEstimate,
    IncomeHistory, PeriodEnd, ProjectionPeriod, RevenueEstimates, SeriesPoint, Symbol, TimeSeries,
};

pub use error::ValidationError;

pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
    DEFAULT_TIMEOUT_MS,
};

pub use source::ProviderId;
