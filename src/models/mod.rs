//! Data transfer objects mirroring the Puxbay JSON schema.
//!
//! The structs are passive: they carry no validation and ignore unknown
//! fields. Anything the server may omit is an `Option`, and `None` fields,
//! empty names and empty lists are left out when serializing, so a partially
//! filled struct doubles as a PATCH body. Timestamps and dates stay as the
//! server's ISO-8601 strings.
//!
//! ```
//! use puxbay::models::Product;
//!
//! let patch = Product {
//!     price: Some(12.5),
//!     ..Default::default()
//! };
//! assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"price":12.5}"#);
//! ```

mod catalog;
mod decimal;
mod operations;
mod reports;
mod sales;
mod supply;

pub use catalog::{
    Category, Product, ProductComponent, ProductHistory, ProductVariant, StockAdjustment,
};
pub use operations::{
    Branch, CashDrawerSession, Expense, ExpenseCategory, Notification, OpenCashDrawer, Staff,
    StockLevel, Stocktake, StocktakeEntry, Webhook, WebhookEvent,
};
pub use reports::{
    DailySales, FinancialSummary, LowStockProduct, ReportPeriod, RestockRecommendation,
    TopProduct,
};
pub use sales::{
    BalanceAdjustment, Customer, GiftCard, GiftCardBalance, Order, OrderItem, ReturnItem,
    ReturnRequest,
};
pub use supply::{
    PurchaseOrder, PurchaseOrderItem, ReceivedItem, StockTransfer, StockTransferItem, Supplier,
};

use serde::{Deserialize, Serialize};

/// One page of a list endpoint.
///
/// `next` and `previous` are the server's absolute page URLs; the client does
/// not follow them. Ask for the next page with
/// [`ListParams::page`](crate::ListParams::page) instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of matching items across all pages.
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Returns `true` when the server reports a following page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

impl<T> IntoIterator for Paginated<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
