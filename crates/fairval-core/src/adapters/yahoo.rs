use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::data_source::{FinancialDataProvider, ProviderFuture, SourceError};
use crate::http_client::{
    HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};
use crate::{
    CashFlowHistory, CompanyFinancials, CompanyProfile, EstimateHorizon, IncomeHistory, PeriodEnd,
    ProviderId, RevenueEstimates, SeriesPoint, Symbol, TimeSeries, ValidationError,
};

const SUMMARY_MODULES: &str = "cashflowStatementHistory,incomeStatementHistory,earningsTrend,defaultKeyStatistics,financialData";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const REFERER: &str = "https://finance.yahoo.com/";

// ============================================================================
// Yahoo Auth Manager - cookie/crumb handshake
// ============================================================================

#[derive(Debug, Clone)]
struct CachedCrumb {
    value: String,
    fetched_at: Instant,
}

/// Manages Yahoo Finance cookie/crumb authentication.
///
/// Yahoo's unofficial API requires:
/// 1. Session cookie from fc.yahoo.com (kept by the transport's cookie store)
/// 2. Crumb token from `/v1/test/getcrumb`, passed as a query parameter
#[derive(Debug)]
pub struct YahooAuthManager {
    crumb: Mutex<Option<CachedCrumb>>,
    ttl: Duration,
    cookie_override: Option<String>,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self {
            crumb: Mutex::new(None),
            ttl: Duration::from_secs(3600),
            cookie_override: std::env::var("YAHOO_COOKIE").ok(),
        }
    }
}

impl YahooAuthManager {
    pub fn with_cookie(cookie: impl Into<String>) -> Self {
        Self {
            cookie_override: Some(cookie.into()),
            ..Self::default()
        }
    }

    fn cached(&self) -> Option<String> {
        let guard = self.crumb.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.value.clone())
    }

    /// Invalidate the cached crumb; the next call repeats the handshake.
    pub fn invalidate(&self) {
        *self.crumb.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        let request = request.with_header("referer", REFERER);
        match &self.cookie_override {
            Some(cookie) => request.with_header("cookie", cookie.clone()),
            None => request,
        }
    }

    /// Current crumb, running the handshake when nothing valid is cached.
    pub async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        timeout_ms: u64,
    ) -> Result<String, SourceError> {
        if let Some(crumb) = self.cached() {
            return Ok(crumb);
        }

        debug!("refreshing yahoo cookie and crumb");
        if self.cookie_override.is_none() {
            // fc.yahoo.com answers 404 but still sets the session cookie.
            let cookie_request =
                self.authorize(HttpRequest::get(COOKIE_URL).with_timeout_ms(timeout_ms));
            http_client.execute(cookie_request).await.map_err(|e| {
                SourceError::unavailable(format!("failed to fetch yahoo cookie: {}", e.message()))
            })?;
        }

        for endpoint in CRUMB_URLS {
            let request = self.authorize(HttpRequest::get(endpoint).with_timeout_ms(timeout_ms));
            let response = match http_client.execute(request).await {
                Ok(response) if response.is_success() => response,
                Ok(response) if response.status == 429 => {
                    return Err(SourceError::rate_limited(
                        "yahoo rate limited the crumb request",
                    ));
                }
                _ => continue,
            };

            let body = response.body.trim();
            if body.contains("<html") || body.contains("<!DOCTYPE") {
                continue;
            }
            if body.to_ascii_lowercase().contains("too many requests") {
                return Err(SourceError::rate_limited(
                    "yahoo rate limited the crumb request",
                ));
            }
            if !body.is_empty() && body.len() < 100 && !body.contains(char::is_whitespace) {
                *self.crumb.lock().unwrap_or_else(PoisonError::into_inner) = Some(CachedCrumb {
                    value: body.to_owned(),
                    fetched_at: Instant::now(),
                });
                return Ok(body.to_owned());
            }
        }

        Err(SourceError::unavailable(
            "failed to fetch yahoo crumb from all endpoints",
        ))
    }
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance adapter backed by the `quoteSummary` endpoint.
///
/// One request carries every module the valuation needs, so
/// [`financials`](FinancialDataProvider::financials) issues a single call.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: Arc<YahooAuthManager>,
    timeout_ms: u64,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth: Arc::new(YahooAuthManager::default()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_auth(mut self, auth: YahooAuthManager) -> Self {
        self.auth = Arc::new(auth);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn summary_request(&self, symbol: &Symbol, crumb: &str) -> HttpRequest {
        let endpoint = format!(
            "https://query2.finance.yahoo.com/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            urlencoding::encode(symbol.as_str()),
            SUMMARY_MODULES,
            urlencoding::encode(crumb)
        );
        self.auth
            .authorize(HttpRequest::get(endpoint).with_timeout_ms(self.timeout_ms))
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, SourceError> {
        self.http_client
            .execute(request)
            .await
            .map_err(|e| {
                SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
            })
    }

    /// Fetch and decode the quote summary, refreshing auth once on 401/429.
    async fn fetch_summary(&self, symbol: &Symbol) -> Result<YahooSummaryResult, SourceError> {
        debug!(symbol = %symbol, "requesting yahoo quote summary");
        let crumb = self.auth.crumb(self.http_client.as_ref(), self.timeout_ms).await?;
        let mut response = self.execute(self.summary_request(symbol, &crumb)).await?;

        if response.status == 401 || response.status == 429 {
            warn!(
                symbol = %symbol,
                status = response.status,
                "yahoo rejected crumb; refreshing auth"
            );
            self.auth.invalidate();
            let crumb = self.auth.crumb(self.http_client.as_ref(), self.timeout_ms).await?;
            response = self.execute(self.summary_request(symbol, &crumb)).await?;
        }

        match response.status {
            404 => Err(SourceError::not_found(symbol)),
            429 => Err(SourceError::rate_limited(
                "yahoo returned status 429 after auth refresh",
            )),
            _ if !response.is_success() => Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            ))),
            _ => parse_summary(symbol, &response.body),
        }
    }
}

impl FinancialDataProvider for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn cash_flow<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, CashFlowHistory> {
        Box::pin(async move { self.fetch_summary(symbol).await?.cash_flow() })
    }

    fn income_statement<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, IncomeHistory> {
        Box::pin(async move { self.fetch_summary(symbol).await?.income() })
    }

    fn revenue_estimates<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> ProviderFuture<'a, RevenueEstimates> {
        Box::pin(async move { Ok(self.fetch_summary(symbol).await?.revenue_estimates()) })
    }

    fn profile<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, CompanyProfile> {
        Box::pin(async move { self.fetch_summary(symbol).await?.profile() })
    }

    fn financials<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, CompanyFinancials> {
        Box::pin(async move {
            let summary = self.fetch_summary(symbol).await?;
            Ok(CompanyFinancials {
                symbol: symbol.clone(),
                cash_flow: summary.cash_flow()?,
                income: summary.income()?,
                estimates: summary.revenue_estimates(),
                profile: summary.profile()?,
            })
        })
    }
}

/// Decode a `quoteSummary` response body.
fn parse_summary(symbol: &Symbol, body: &str) -> Result<YahooSummaryResult, SourceError> {
    let envelope: YahooSummaryEnvelope = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo quote summary: {e}")))?;

    if let Some(error) = envelope.quote_summary.error {
        if error.code.as_deref() == Some("Not Found") {
            return Err(SourceError::not_found(symbol));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo quote summary error: {}",
            error.description.unwrap_or_else(|| String::from("unknown error"))
        )));
    }

    envelope
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found(symbol))
}

// ============================================================================
// Yahoo payloads
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooSummaryEnvelope {
    quote_summary: YahooSummaryBody,
}

#[derive(Debug, Deserialize)]
struct YahooSummaryBody {
    #[serde(default)]
    result: Option<Vec<YahooSummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooSummaryResult {
    #[serde(default)]
    cashflow_statement_history: Option<YahooCashflowHistory>,
    #[serde(default)]
    income_statement_history: Option<YahooIncomeHistory>,
    #[serde(default)]
    earnings_trend: Option<YahooEarningsTrend>,
    #[serde(default)]
    default_key_statistics: Option<YahooKeyStatistics>,
    #[serde(default)]
    financial_data: Option<YahooFinancialData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooCashflowHistory {
    #[serde(default)]
    cashflow_statements: Vec<YahooCashflowStatement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooCashflowStatement {
    #[serde(default)]
    end_date: Option<YahooRawValue>,
    #[serde(default)]
    total_cash_from_operating_activities: Option<YahooRawValue>,
    #[serde(default)]
    capital_expenditures: Option<YahooRawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooIncomeHistory {
    #[serde(default)]
    income_statement_history: Vec<YahooIncomeStatement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooIncomeStatement {
    #[serde(default)]
    end_date: Option<YahooRawValue>,
    #[serde(default)]
    total_revenue: Option<YahooRawValue>,
    #[serde(default)]
    net_income: Option<YahooRawValue>,
}

#[derive(Debug, Deserialize)]
struct YahooEarningsTrend {
    #[serde(default)]
    trend: Vec<YahooTrendRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooTrendRow {
    period: String,
    #[serde(default)]
    revenue_estimate: Option<YahooRevenueEstimate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooRevenueEstimate {
    #[serde(default)]
    avg: Option<YahooRawValue>,
    #[serde(default)]
    growth: Option<YahooRawValue>,
    #[serde(default)]
    number_of_analysts: Option<YahooRawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooKeyStatistics {
    #[serde(default)]
    shares_outstanding: Option<YahooRawValue>,
    #[serde(default)]
    peg_ratio: Option<YahooRawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooFinancialData {
    #[serde(default)]
    current_price: Option<YahooRawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}` and missing numbers
/// as `{}`.
#[derive(Debug, Clone, Deserialize)]
struct YahooRawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(value: &Option<YahooRawValue>) -> Option<f64> {
    value
        .as_ref()
        .and_then(|value| value.raw)
        .filter(|value| value.is_finite())
}

impl YahooSummaryResult {
    fn cash_flow(&self) -> Result<CashFlowHistory, SourceError> {
        let statements = self
            .cashflow_statement_history
            .as_ref()
            .map(|history| history.cashflow_statements.as_slice())
            .unwrap_or_default();

        let operating = statement_line(
            statements,
            "totalCashFromOperatingActivities",
            |row| raw(&row.end_date),
            |row| raw(&row.total_cash_from_operating_activities),
        )?;
        let capex = statement_line(
            statements,
            "capitalExpenditures",
            |row| raw(&row.end_date),
            |row| raw(&row.capital_expenditures),
        )?;
        Ok(CashFlowHistory::new(operating, capex))
    }

    fn income(&self) -> Result<IncomeHistory, SourceError> {
        let statements = self
            .income_statement_history
            .as_ref()
            .map(|history| history.income_statement_history.as_slice())
            .unwrap_or_default();

        let revenue = statement_line(
            statements,
            "totalRevenue",
            |row| raw(&row.end_date),
            |row| raw(&row.total_revenue),
        )?;
        let net_income = statement_line(
            statements,
            "netIncome",
            |row| raw(&row.end_date),
            |row| raw(&row.net_income),
        )?;
        Ok(IncomeHistory::new(revenue, net_income))
    }

    /// Coverage is the analyst count behind the current-year estimate.
    fn revenue_estimates(&self) -> RevenueEstimates {
        let rows = self
            .earnings_trend
            .as_ref()
            .map(|trend| trend.trend.as_slice())
            .unwrap_or_default();
        let estimate = |label: &str| {
            rows.iter()
                .find(|row| row.period.eq_ignore_ascii_case(label))
                .and_then(|row| row.revenue_estimate.as_ref())
        };

        let current = estimate("0y");
        let next = estimate("+1y");
        let analyst_count = current
            .and_then(|estimate| raw(&estimate.number_of_analysts))
            .map(|count| count.max(0.0) as u32)
            .unwrap_or(0);

        let mut estimates = RevenueEstimates::new(analyst_count);
        for (horizon, row) in [
            (EstimateHorizon::CurrentYear, current),
            (EstimateHorizon::NextYear, next),
        ] {
            if let Some(row) = row {
                estimates = estimates.with_horizon(horizon, raw(&row.avg), raw(&row.growth));
            }
        }
        estimates
    }

    fn profile(&self) -> Result<CompanyProfile, SourceError> {
        let statistics = self.default_key_statistics.as_ref();
        let shares = statistics
            .and_then(|stats| raw(&stats.shares_outstanding))
            .ok_or_else(|| SourceError::missing_field("sharesOutstanding"))?;
        let price = self
            .financial_data
            .as_ref()
            .and_then(|data| raw(&data.current_price))
            .ok_or_else(|| SourceError::missing_field("currentPrice"))?;
        let peg = statistics.and_then(|stats| raw(&stats.peg_ratio));

        CompanyProfile::new(shares, price, peg).map_err(validation_to_error)
    }
}

fn statement_line<T>(
    rows: &[T],
    name: &'static str,
    end_date: impl Fn(&T) -> Option<f64>,
    value: impl Fn(&T) -> Option<f64>,
) -> Result<TimeSeries, SourceError> {
    if rows.is_empty() {
        return Err(SourceError::missing_field(name));
    }

    let points = rows
        .iter()
        .map(|row| {
            let seconds = end_date(row).ok_or_else(|| SourceError::missing_field("endDate"))?;
            let period =
                PeriodEnd::from_unix_timestamp(seconds as i64).map_err(validation_to_error)?;
            let value = value(row).ok_or_else(|| SourceError::missing_field(name))?;
            Ok(SeriesPoint::new(period, value))
        })
        .collect::<Result<Vec<_>, SourceError>>()?;

    TimeSeries::new(name, points).map_err(validation_to_error)
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::internal(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, NoopHttpClient};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;

    const SUMMARY: &str = include_str!("../../../../tests/fixtures/yahoo_quote_summary.json");

    /// Answers crumb requests with a fixed token and quote summary requests
    /// from a queue, recording every request.
    #[derive(Debug)]
    struct ScriptedHttpClient {
        summaries: Mutex<VecDeque<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(summaries: Vec<HttpResponse>) -> Self {
            Self {
                summaries: Mutex::new(summaries.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = if request.url.contains("getcrumb") {
                Ok(HttpResponse::ok("crumb-token"))
            } else if request.url.contains("quoteSummary") {
                self.summaries
                    .lock()
                    .expect("queue should not be poisoned")
                    .pop_front()
                    .ok_or_else(|| HttpError::new("no scripted response left"))
            } else {
                Ok(HttpResponse::with_status(404, ""))
            };
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            Box::pin(async move { response })
        }
    }

    fn symbol() -> Symbol {
        Symbol::parse("ACME").expect("valid symbol")
    }

    fn adapter(client: Arc<ScriptedHttpClient>) -> YahooAdapter {
        YahooAdapter::with_http_client(client).with_auth(YahooAuthManager {
            cookie_override: None,
            ..YahooAuthManager::default()
        })
    }

    #[tokio::test]
    async fn financials_are_served_from_one_summary_request() {
        let client = Arc::new(ScriptedHttpClient::new(vec![HttpResponse::ok(SUMMARY)]));
        let financials = adapter(client.clone())
            .financials(&symbol())
            .await
            .expect("summary should parse");

        assert_eq!(
            financials.income.total_revenue().values(),
            vec![10e9, 9e9, 8e9, 7e9]
        );
        assert_eq!(
            financials.cash_flow.capital_expenditures().values(),
            vec![-300e6, -270e6, -240e6, -210e6]
        );
        assert_eq!(
            financials.income.net_income().latest().period.to_string(),
            "2023-12-31"
        );
        assert_eq!(financials.estimates.analyst_count, 20);
        assert_eq!(
            financials
                .estimates
                .horizon(EstimateHorizon::NextYear)
                .and_then(|estimate| estimate.avg),
            Some(12.1e9)
        );
        assert_eq!(financials.profile.shares_outstanding, 1e9);
        assert_eq!(financials.profile.peg_ratio, Some(1.8));

        let summary_calls = client
            .recorded_urls()
            .into_iter()
            .filter(|url| url.contains("quoteSummary"))
            .count();
        assert_eq!(summary_calls, 1);
    }

    #[tokio::test]
    async fn summary_request_carries_crumb_and_modules() {
        let client = Arc::new(ScriptedHttpClient::new(vec![HttpResponse::ok(SUMMARY)]));
        adapter(client.clone())
            .profile(&symbol())
            .await
            .expect("summary should parse");

        let url = client
            .recorded_urls()
            .into_iter()
            .find(|url| url.contains("quoteSummary"))
            .expect("summary request recorded");
        assert!(url.contains("/quoteSummary/ACME?"));
        assert!(url.contains("earningsTrend"));
        assert!(url.ends_with("crumb=crumb-token"));
    }

    #[tokio::test]
    async fn unauthorized_summary_refreshes_crumb_once() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            HttpResponse::with_status(401, "Unauthorized"),
            HttpResponse::ok(SUMMARY),
        ]));
        let profile = adapter(client.clone())
            .profile(&symbol())
            .await
            .expect("retry should succeed");

        assert_eq!(profile.current_price, 50.0);
        let crumb_calls = client
            .recorded_urls()
            .into_iter()
            .filter(|url| url.contains("getcrumb"))
            .count();
        assert_eq!(crumb_calls, 2);
    }

    #[tokio::test]
    async fn unknown_ticker_maps_to_not_found() {
        let body = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for ticker symbol: ACME"}}}"#;
        let client = Arc::new(ScriptedHttpClient::new(vec![HttpResponse::with_status(
            404, body,
        )]));
        let error = adapter(client)
            .financials(&symbol())
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn missing_share_count_is_reported_by_name() {
        let body = r#"{"quoteSummary":{"result":[{"financialData":{"currentPrice":{"raw":10.0}}}],"error":null}}"#;
        let client = Arc::new(ScriptedHttpClient::new(vec![HttpResponse::ok(body)]));
        let error = adapter(client)
            .profile(&symbol())
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::MissingField);
        assert!(error.message().contains("sharesOutstanding"));
    }

    #[test]
    fn estimates_without_trend_module_have_no_coverage() {
        let summary = YahooSummaryResult::default();
        assert!(!summary.revenue_estimates().has_coverage());
    }

    #[tokio::test]
    async fn empty_summary_body_is_an_internal_error() {
        let adapter = YahooAdapter::with_http_client(Arc::new(NoopHttpClient));
        let error = adapter
            .financials(&symbol())
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::Internal);
    }
}
