use crate::{
    metadata::RequestMetadata,
    models::{DailySales, FinancialSummary, LowStockProduct, RestockRecommendation, TopProduct},
    Client, Result,
};
use http::Method;
use serde::de::DeserializeOwned;

/// An inclusive date range, as `YYYY-MM-DD` strings.
///
/// The server validates the dates; a malformed one comes back as a
/// validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    /// First day, `YYYY-MM-DD`.
    pub start: String,
    /// Last day, `YYYY-MM-DD`.
    pub end: String,
}

impl DateRange {
    /// Creates a range from two `YYYY-MM-DD` dates.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    fn to_query(&self) -> Vec<(String, String)> {
        vec![
            ("start_date".to_string(), self.start.clone()),
            ("end_date".to_string(), self.end.clone()),
        ]
    }
}

/// Read-only analytics computed by the server.
///
/// ```no_run
/// use puxbay::{Client, DateRange};
///
/// # async fn example(client: Client) -> Result<(), puxbay::Error> {
/// let january = DateRange::new("2024-01-01", "2024-01-31");
/// let summary = client.reports().financial_summary(&january).await?;
/// println!("{} orders, {:.2} revenue", summary.total_orders, summary.total_revenue);
///
/// for row in client.reports().top_products(5).await? {
///     println!("{:?}: {} sold", row.name, row.quantity_sold);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reports<'a> {
    client: &'a Client,
}

impl<'a> Reports<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Revenue, order count and average order value over the range.
    pub async fn financial_summary(&self, range: &DateRange) -> Result<FinancialSummary> {
        self.get("reports/financial-summary/", range.to_query()).await
    }

    /// One row per day in the range.
    pub async fn daily_sales(&self, range: &DateRange) -> Result<Vec<DailySales>> {
        self.get("reports/daily-sales/", range.to_query()).await
    }

    /// Best sellers by quantity over completed orders.
    pub async fn top_products(&self, limit: u32) -> Result<Vec<TopProduct>> {
        self.get("reports/top-products/", vec![("limit".to_string(), limit.to_string())])
            .await
    }

    /// Active products at or below their low-stock threshold.
    pub async fn low_stock(&self) -> Result<Vec<LowStockProduct>> {
        self.get("reports/low-stock/", Vec::new()).await
    }

    /// Products likely to sell out within a week at the last 30 days' pace.
    pub async fn restock_recommendations(&self) -> Result<Vec<RestockRecommendation>> {
        self.get("reports/restock-recommendations/", Vec::new()).await
    }

    async fn get<T>(&self, path: &str, query: Vec<(String, String)>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::GET, path).with_query_params(query);
        Ok(self.client.call::<(), _>(metadata, None).await?.data)
    }
}
