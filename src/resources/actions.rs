//! Entity-specific actions on top of the generic [`Resource`] operations.

use super::{action_path, Resource};
use crate::{
    metadata::RequestMetadata,
    models::{
        BalanceAdjustment, CashDrawerSession, Customer, Expense, ExpenseCategory, GiftCard,
        GiftCardBalance, Notification, OpenCashDrawer, Order, Paginated, Product, ProductHistory,
        PurchaseOrder, ReceivedItem, ReturnRequest, StockAdjustment, StockTransfer, Stocktake,
        Webhook, WebhookEvent,
    },
    Result,
};
use http::Method;
use serde::Serialize;

#[derive(Serialize)]
struct StockAdjustmentRequest<'a> {
    adjustment: i64,
    reason: &'a str,
}

#[derive(Serialize)]
struct LoyaltyPointsRequest<'a> {
    points: i64,
    description: &'a str,
}

#[derive(Serialize)]
struct StoreCreditRequest<'a> {
    amount: f64,
    reference: &'a str,
}

#[derive(Serialize)]
struct AmountRequest {
    amount: f64,
}

#[derive(Serialize)]
struct ReceiveRequest<'a> {
    items: &'a [ReceivedItem],
}

#[derive(Serialize)]
struct CloseDrawerRequest {
    actual_cash: f64,
}

impl Resource<'_, Product> {
    /// Adds `quantity` units to stock (negative to remove), recording `reason`
    /// in the product history.
    pub async fn adjust_stock(
        &self,
        id: &str,
        quantity: i64,
        reason: &str,
    ) -> Result<StockAdjustment> {
        let body = StockAdjustmentRequest {
            adjustment: quantity,
            reason,
        };
        self.action_with(id, "stock-adjustment", &body).await
    }

    /// The product's audit trail, newest first.
    pub async fn history(&self, id: &str) -> Result<Vec<ProductHistory>> {
        self.client
            .request::<(), _>(Method::GET, action_path::<Product>(id, "history"), None)
            .await
    }
}

impl Resource<'_, Order> {
    /// Cancels an order and returns its new state.
    pub async fn cancel(&self, id: &str) -> Result<Order> {
        self.action(id, "cancel").await
    }
}

impl Resource<'_, Customer> {
    /// Adds (or with a negative value, removes) loyalty points.
    pub async fn adjust_loyalty_points(
        &self,
        id: &str,
        points: i64,
        description: &str,
    ) -> Result<BalanceAdjustment> {
        let body = LoyaltyPointsRequest {
            points,
            description,
        };
        self.action_with(id, "adjust-loyalty-points", &body).await
    }

    /// Credits (or with a negative amount, debits) the customer's store credit.
    pub async fn adjust_store_credit(
        &self,
        id: &str,
        amount: f64,
        reference: &str,
    ) -> Result<BalanceAdjustment> {
        let body = StoreCreditRequest { amount, reference };
        self.action_with(id, "adjust-store-credit", &body).await
    }
}

impl Resource<'_, GiftCard> {
    /// Deducts `amount` from the card's balance.
    pub async fn redeem(&self, id: &str, amount: f64) -> Result<GiftCard> {
        self.action_with(id, "redeem", &AmountRequest { amount })
            .await
    }

    /// Looks a card up by its printed code rather than its id.
    pub async fn check_balance(&self, code: &str) -> Result<GiftCardBalance> {
        let metadata = RequestMetadata::new(Method::GET, "gift-cards/check-balance/")
            .with_query_param("code", code);
        Ok(self.client.call::<(), _>(metadata, None).await?.data)
    }
}

impl Resource<'_, PurchaseOrder> {
    /// Records received quantities against the order's items.
    pub async fn receive(&self, id: &str, items: &[ReceivedItem]) -> Result<PurchaseOrder> {
        self.action_with(id, "receive", &ReceiveRequest { items })
            .await
    }
}

impl Resource<'_, StockTransfer> {
    /// Marks the transfer as arrived and moves the stock.
    pub async fn complete(&self, id: &str) -> Result<StockTransfer> {
        self.action(id, "complete").await
    }
}

impl Resource<'_, Stocktake> {
    /// Closes the count and applies the differences to stock.
    pub async fn complete(&self, id: &str) -> Result<Stocktake> {
        self.action(id, "complete").await
    }
}

impl Resource<'_, CashDrawerSession> {
    /// Opens a new till session.
    pub async fn open(&self, drawer: &OpenCashDrawer) -> Result<CashDrawerSession> {
        self.client
            .request(Method::POST, "cash-drawers/", Some(drawer))
            .await
    }

    /// Cashes up the session with the counted cash.
    pub async fn close(&self, id: &str, actual_cash: f64) -> Result<CashDrawerSession> {
        self.action_with(id, "close", &CloseDrawerRequest { actual_cash })
            .await
    }
}

impl Resource<'_, Expense> {
    /// The expense categories, one page.
    pub async fn list_categories(&self) -> Result<Paginated<ExpenseCategory>> {
        self.client
            .request::<(), _>(Method::GET, "expense-categories/", None)
            .await
    }
}

impl Resource<'_, Notification> {
    /// Marks one notification as read.
    pub async fn mark_as_read(&self, id: &str) -> Result<Notification> {
        self.action(id, "mark-read").await
    }

    /// Marks every notification of the current user as read.
    pub async fn mark_all_read(&self) -> Result<()> {
        let metadata = RequestMetadata::new(Method::POST, "notifications/mark-all-read/");
        self.client.call_no_content::<()>(metadata, None).await?;
        Ok(())
    }
}

impl Resource<'_, ReturnRequest> {
    /// Approves a return request.
    pub async fn approve(&self, id: &str) -> Result<ReturnRequest> {
        self.action(id, "approve").await
    }
}

impl Resource<'_, Webhook> {
    /// Delivery log of one webhook, a page at a time.
    pub async fn list_events(&self, id: &str, page: u32) -> Result<Paginated<WebhookEvent>> {
        let metadata = RequestMetadata::new(Method::GET, "webhook-logs/")
            .with_query_param("webhook", id)
            .with_query_param("page", page);
        Ok(self.client.call::<(), _>(metadata, None).await?.data)
    }
}
