//! Report payloads. These are computed server-side and never sent back.

use super::decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    #[serde(default, deserialize_with = "decimal::number")]
    pub total_revenue: f64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default, deserialize_with = "decimal::number")]
    pub avg_order_value: f64,
    #[serde(default)]
    pub period: Option<ReportPeriod>,
}

/// The date range a report covers, echoed back by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPeriod {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// Revenue and order count for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: String,
    #[serde(default, deserialize_with = "decimal::number")]
    pub revenue: f64,
    #[serde(default)]
    pub orders: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    #[serde(rename = "product__id")]
    pub product_id: String,
    #[serde(rename = "product__name", default)]
    pub name: Option<String>,
    #[serde(rename = "product__sku", default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity_sold: i64,
    #[serde(default, deserialize_with = "decimal::number")]
    pub revenue: f64,
}

/// A product at or below its low-stock threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LowStockProduct {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub low_stock_threshold: i64,
}

/// A product whose stock covers less than a week of recent sales.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestockRecommendation {
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub current_stock: i64,
    /// Average units sold per day over the last 30 days.
    #[serde(default, deserialize_with = "decimal::number")]
    pub avg_daily_sales: f64,
    /// Units needed to cover two weeks of sales.
    #[serde(default)]
    pub recommended_restock: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_products_use_server_column_names() {
        let rows: Vec<TopProduct> = serde_json::from_value(json!([
            {
                "product__id": "p1",
                "product__name": "Widget",
                "product__sku": "W-1",
                "quantity_sold": 120,
                "revenue": 1198.8
            }
        ]))
        .unwrap();

        assert_eq!(rows[0].product_id, "p1");
        assert_eq!(rows[0].name.as_deref(), Some("Widget"));
        assert_eq!(rows[0].quantity_sold, 120);
    }

    #[test]
    fn test_financial_summary() {
        let summary: FinancialSummary = serde_json::from_value(json!({
            "total_revenue": 5400.5,
            "total_orders": 120,
            "avg_order_value": 45.0,
            "period": {"start": "2024-01-01", "end": "2024-01-31"}
        }))
        .unwrap();

        assert_eq!(summary.total_orders, 120);
        assert_eq!(
            summary.period.and_then(|p| p.end).as_deref(),
            Some("2024-01-31")
        );
    }
}
