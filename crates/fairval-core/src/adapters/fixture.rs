use std::path::Path;

use crate::data_source::{FinancialDataProvider, ProviderFuture, SourceError};
use crate::{
    CashFlowHistory, CompanyFinancials, CompanyProfile, IncomeHistory, ProviderId,
    RevenueEstimates, Symbol,
};

/// Provider serving one company's financials from memory.
///
/// Used for offline runs (`--fixture`) and for tests that must not touch the
/// network. Requests for any other symbol fail with `NotFound`.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    financials: CompanyFinancials,
}

impl FixtureProvider {
    pub fn new(financials: CompanyFinancials) -> Self {
        Self { financials }
    }

    /// Parse a JSON document shaped like [`CompanyFinancials`].
    pub fn from_json(document: &str) -> Result<Self, SourceError> {
        serde_json::from_str(document)
            .map(Self::new)
            .map_err(|e| SourceError::invalid_request(format!("invalid fixture document: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            SourceError::unavailable(format!("failed to read fixture {}: {e}", path.display()))
        })?;
        Self::from_json(&document)
    }

    pub fn symbol(&self) -> &Symbol {
        &self.financials.symbol
    }

    fn lookup(&self, symbol: &Symbol) -> Result<&CompanyFinancials, SourceError> {
        if &self.financials.symbol == symbol {
            Ok(&self.financials)
        } else {
            Err(SourceError::not_found(symbol))
        }
    }
}

impl FinancialDataProvider for FixtureProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Fixture
    }

    fn cash_flow<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, CashFlowHistory> {
        Box::pin(async move { Ok(self.lookup(symbol)?.cash_flow.clone()) })
    }

    fn income_statement<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, IncomeHistory> {
        Box::pin(async move { Ok(self.lookup(symbol)?.income.clone()) })
    }

    fn revenue_estimates<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> ProviderFuture<'a, RevenueEstimates> {
        Box::pin(async move { Ok(self.lookup(symbol)?.estimates.clone()) })
    }

    fn profile<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, CompanyProfile> {
        Box::pin(async move { Ok(self.lookup(symbol)?.profile) })
    }
}
