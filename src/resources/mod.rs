//! Typed accessors for the REST resources.
//!
//! Every entity endpoint shares one shape: `GET {path}/` lists a page,
//! `GET {path}/{id}/` fetches one item, and depending on the entity `POST`,
//! `PATCH` and `DELETE` create, update and remove items. [`Resource`] provides
//! that shape once, generic over the entity type; the marker traits
//! [`Create`], [`Update`] and [`Delete`] switch the write operations on per
//! entity. Entity-specific actions (cancelling an order, redeeming a gift
//! card, ...) are inherent methods on the concrete `Resource<'_, T>`.
//!
//! Inventory queries and reports are not entities and have their own
//! accessors, [`Inventory`] and [`Reports`].

mod actions;
mod inventory;
mod reports;

pub use inventory::Inventory;
pub use reports::{DateRange, Reports};

use crate::{
    metadata::RequestMetadata,
    models::{
        Branch, CashDrawerSession, Category, Customer, Expense, GiftCard, Notification, Order,
        Paginated, Product, PurchaseOrder, ReturnRequest, Staff, StockTransfer, Stocktake,
        Supplier, Webhook,
    },
    Client, Result,
};
use http::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// A remote entity type with its own collection endpoint.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Collection path relative to the base URL, without slashes.
    const PATH: &'static str;
}

/// Entities that can be created with `POST {path}/`.
pub trait Create: Entity {}

/// Entities that can be partially updated with `PATCH {path}/{id}/`.
pub trait Update: Entity {}

/// Entities that can be removed with `DELETE {path}/{id}/`.
pub trait Delete: Entity {}

macro_rules! entity {
    ($ty:ty, $path:literal $(, $cap:ident)*) => {
        impl Entity for $ty {
            const PATH: &'static str = $path;
        }
        $(impl $cap for $ty {})*
    };
}

entity!(Product, "products", Create, Update, Delete);
entity!(Customer, "customers", Create, Update, Delete);
entity!(Category, "categories", Create, Update, Delete);
entity!(Supplier, "suppliers", Create, Update, Delete);
entity!(Branch, "branches", Create, Update, Delete);
entity!(Staff, "staff", Create, Update, Delete);
entity!(Webhook, "webhooks", Create, Update, Delete);
entity!(Expense, "expenses", Create, Update, Delete);
entity!(Order, "orders", Create);
entity!(ReturnRequest, "returns", Create);
entity!(Stocktake, "stocktakes", Create);
entity!(StockTransfer, "stock-transfers", Create);
entity!(GiftCard, "gift-cards", Create);
entity!(PurchaseOrder, "purchase-orders", Create, Update);
entity!(CashDrawerSession, "cash-drawers");
entity!(Notification, "notifications");

/// Page selection and filters for list calls.
///
/// With no page set the server returns its first page at its default size.
///
/// ```
/// use puxbay::ListParams;
///
/// let params = ListParams::page(2).page_size(50).status("pending");
/// assert_eq!(
///     params.to_query(),
///     [
///         ("page".to_string(), "2".to_string()),
///         ("page_size".to_string(), "50".to_string()),
///         ("status".to_string(), "pending".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    page: Option<u32>,
    page_size: Option<u32>,
    filters: Vec<(String, String)>,
}

impl ListParams {
    /// No page, no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the given 1-based page.
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    /// Sets how many items a page holds.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Adds an arbitrary query filter. Later filters with the same key are sent too.
    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((key.into(), value.to_string()));
        self
    }

    /// Filters by status (orders, purchase orders, transfers, gift cards).
    pub fn status(self, status: impl ToString) -> Self {
        self.filter("status", status)
    }

    /// Filters staff by role.
    pub fn role(self, role: impl ToString) -> Self {
        self.filter("role", role)
    }

    /// Filters expenses by category id.
    pub fn category(self, category: impl ToString) -> Self {
        self.filter("category", category)
    }

    /// Full-text search on the fields the server indexes.
    pub fn search(self, term: impl ToString) -> Self {
        self.filter("search", term)
    }

    /// The query pairs in send order: page, page size, then filters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(self.filters.len() + 2);
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            query.push(("page_size".to_string(), page_size.to_string()));
        }
        query.extend(self.filters.iter().cloned());
        query
    }
}

/// Accessor for one entity collection, borrowed from a [`Client`].
///
/// ```no_run
/// use puxbay::{models::Customer, Client, ListParams};
///
/// # async fn example(client: Client) -> Result<(), puxbay::Error> {
/// let customers = client.customers();
///
/// let created = customers
///     .create(&Customer {
///         name: "Ada Lovelace".into(),
///         email: Some("ada@example.com".into()),
///         ..Default::default()
///     })
///     .await?;
///
/// let id = created.id.unwrap_or_default();
/// customers.adjust_loyalty_points(&id, 50, "Welcome bonus").await?;
///
/// let page = customers.list(&ListParams::page(1).search("ada")).await?;
/// println!("{} matching customers", page.count);
/// # Ok(())
/// # }
/// ```
pub struct Resource<'a, T> {
    client: &'a Client,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> Resource<'a, T> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    /// Fetches one page of the collection.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<T>> {
        let metadata = RequestMetadata::new(Method::GET, collection_path::<T>())
            .with_query_params(params.to_query());
        Ok(self.client.call::<(), _>(metadata, None).await?.data)
    }

    /// Fetches one item by id.
    pub async fn get(&self, id: &str) -> Result<T> {
        self.client
            .request::<(), _>(Method::GET, item_path::<T>(id), None)
            .await
    }

    /// POSTs to an item action such as `orders/{id}/cancel/` with an empty body.
    async fn action<Res>(&self, id: &str, action: &str) -> Result<Res>
    where
        Res: DeserializeOwned,
    {
        self.client
            .request::<(), _>(Method::POST, action_path::<T>(id, action), None)
            .await
    }

    /// POSTs a JSON body to an item action.
    async fn action_with<Req, Res>(&self, id: &str, action: &str, body: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.client
            .request(Method::POST, action_path::<T>(id, action), Some(body))
            .await
    }
}

impl<T: Create> Resource<'_, T> {
    /// Creates an item and returns it as stored by the server.
    pub async fn create(&self, item: &T) -> Result<T> {
        self.client
            .request(Method::POST, collection_path::<T>(), Some(item))
            .await
    }
}

impl<T: Update> Resource<'_, T> {
    /// Applies a partial update. Fields left as `None` are not sent.
    pub async fn update(&self, id: &str, changes: &T) -> Result<T> {
        self.client
            .request(Method::PATCH, item_path::<T>(id), Some(changes))
            .await
    }
}

impl<T: Delete> Resource<'_, T> {
    /// Deletes an item. The server answers 204 with no body.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let metadata = RequestMetadata::new(Method::DELETE, item_path::<T>(id));
        self.client.call_no_content::<()>(metadata, None).await?;
        Ok(())
    }
}

impl<T> Clone for Resource<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Resource<'_, T> {}

impl<T: Entity> fmt::Debug for Resource<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource").field("path", &T::PATH).finish()
    }
}

fn collection_path<T: Entity>() -> String {
    format!("{}/", T::PATH)
}

/// Ids are percent-encoded so a `/`, `?` or `#` stays inside its segment.
fn item_path<T: Entity>(id: &str) -> String {
    format!("{}/{}/", T::PATH, urlencoding::encode(id))
}

fn action_path<T: Entity>(id: &str, action: &str) -> String {
    format!("{}/{}/{}/", T::PATH, urlencoding::encode(id), action)
}

impl Client {
    /// Catalogue products, with stock adjustment and history.
    pub fn products(&self) -> Resource<'_, Product> {
        Resource::new(self)
    }

    /// Sales orders.
    pub fn orders(&self) -> Resource<'_, Order> {
        Resource::new(self)
    }

    /// Customers, with loyalty points and store credit.
    pub fn customers(&self) -> Resource<'_, Customer> {
        Resource::new(self)
    }

    /// Product categories.
    pub fn categories(&self) -> Resource<'_, Category> {
        Resource::new(self)
    }

    /// Suppliers.
    pub fn suppliers(&self) -> Resource<'_, Supplier> {
        Resource::new(self)
    }

    /// Purchase orders and goods receipt.
    pub fn purchase_orders(&self) -> Resource<'_, PurchaseOrder> {
        Resource::new(self)
    }

    /// Stock moves between branches.
    pub fn stock_transfers(&self) -> Resource<'_, StockTransfer> {
        Resource::new(self)
    }

    /// Stock counts.
    pub fn stocktakes(&self) -> Resource<'_, Stocktake> {
        Resource::new(self)
    }

    /// Till sessions. Use [`Resource::open`] and [`Resource::close`] rather
    /// than create and update.
    pub fn cash_drawers(&self) -> Resource<'_, CashDrawerSession> {
        Resource::new(self)
    }

    /// Gift cards, redemption and balance lookup.
    pub fn gift_cards(&self) -> Resource<'_, GiftCard> {
        Resource::new(self)
    }

    /// Expenses and their categories.
    pub fn expenses(&self) -> Resource<'_, Expense> {
        Resource::new(self)
    }

    /// Store branches.
    pub fn branches(&self) -> Resource<'_, Branch> {
        Resource::new(self)
    }

    /// Staff accounts.
    pub fn staff(&self) -> Resource<'_, Staff> {
        Resource::new(self)
    }

    /// Webhook subscriptions and their delivery log.
    pub fn webhooks(&self) -> Resource<'_, Webhook> {
        Resource::new(self)
    }

    /// Notifications for the user that owns the API key.
    pub fn notifications(&self) -> Resource<'_, Notification> {
        Resource::new(self)
    }

    /// Return requests.
    pub fn returns(&self) -> Resource<'_, ReturnRequest> {
        Resource::new(self)
    }

    /// Stock-on-hand queries.
    pub fn inventory(&self) -> Inventory<'_> {
        Inventory::new(self)
    }

    /// Server-computed reports.
    pub fn reports(&self) -> Reports<'_> {
        Reports::new(self)
    }
}
