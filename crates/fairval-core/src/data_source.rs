//! Financial data provider contract.
//!
//! A valuation run needs four things for one ticker: the cash-flow statement,
//! the income statement, analyst revenue estimates and a few scalar company
//! facts. [`FinancialDataProvider`] exposes each of them so the valuation
//! engine can be fed by a live adapter or by fixed fixtures.
//!
//! | Method | Response |
//! |--------|----------|
//! | [`cash_flow`](FinancialDataProvider::cash_flow) | [`CashFlowHistory`] |
//! | [`income_statement`](FinancialDataProvider::income_statement) | [`IncomeHistory`] |
//! | [`revenue_estimates`](FinancialDataProvider::revenue_estimates) | [`RevenueEstimates`] |
//! | [`profile`](FinancialDataProvider::profile) | [`CompanyProfile`] |
//! | [`financials`](FinancialDataProvider::financials) | [`CompanyFinancials`] |
//!
//! # Example
//!
//! ```rust,ignore
//! use fairval_core::{FinancialDataProvider, SourceError, Symbol, YahooAdapter};
//!
//! async fn shares(adapter: &YahooAdapter) -> Result<f64, SourceError> {
//!     let symbol = Symbol::parse("MRNA")?;
//!     Ok(adapter.profile(&symbol).await?.shares_outstanding)
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{
    CashFlowHistory, CompanyFinancials, CompanyProfile, IncomeHistory, ProviderId,
    RevenueEstimates, Symbol, ValidationError,
};

/// Boxed future returned by provider methods.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    NotFound,
    Unavailable,
    RateLimited,
    InvalidRequest,
    MissingField,
    Internal,
}

/// Structured error raised while fetching company data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn not_found(symbol: &Symbol) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: format!("no financial data available for '{symbol}'"),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    /// A field the valuation depends on is absent from the upstream payload.
    pub fn missing_field(field: &str) -> Self {
        Self {
            kind: SourceErrorKind::MissingField,
            message: format!("upstream payload is missing '{field}'"),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::MissingField => "source.missing_field",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(value: ValidationError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

/// Source of historical statements, analyst estimates and company facts.
///
/// Implementations must be `Send + Sync`; the CLI holds them behind a
/// trait object.
pub trait FinancialDataProvider: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches operating cash flow and capital expenditures, newest first.
    fn cash_flow<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, CashFlowHistory>;

    /// Fetches total revenue and net income, newest first.
    fn income_statement<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, IncomeHistory>;

    /// Fetches analyst revenue estimates for the current and next year.
    ///
    /// Missing coverage is not an error: it is reported as an analyst count
    /// of zero.
    fn revenue_estimates<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> ProviderFuture<'a, RevenueEstimates>;

    /// Fetches shares outstanding, current price and PEG ratio.
    fn profile<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, CompanyProfile>;

    /// Fetches everything a valuation run needs.
    ///
    /// The default implementation calls the four methods above in turn;
    /// adapters that can serve all of them from one upstream request should
    /// override it.
    fn financials<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, CompanyFinancials> {
        Box::pin(async move {
            let cash_flow = self.cash_flow(symbol).await?;
            let income = self.income_statement(symbol).await?;
            let estimates = self.revenue_estimates(symbol).await?;
            let profile = self.profile(symbol).await?;

            Ok(CompanyFinancials {
                symbol: symbol.clone(),
                cash_flow,
                income,
                estimates,
                profile,
            })
        })
    }
}
