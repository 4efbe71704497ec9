use crate::{
    metadata::RequestMetadata,
    models::{Paginated, StockLevel},
    Client, Result,
};
use http::Method;

/// Stock-on-hand queries across branches.
#[derive(Debug, Clone, Copy)]
pub struct Inventory<'a> {
    client: &'a Client,
}

impl<'a> Inventory<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Stock levels of every product at one branch.
    ///
    /// The endpoint answers with a page; only its `results` are returned.
    pub async fn stock_levels(&self, branch: &str) -> Result<Vec<StockLevel>> {
        let metadata = RequestMetadata::new(Method::GET, "inventory/stock-levels/")
            .with_query_param("branch", branch);
        let page: Paginated<StockLevel> = self.client.call::<(), _>(metadata, None).await?.data;
        Ok(page.results)
    }

    /// Stock of one product at one branch.
    pub async fn product_stock(&self, product: &str, branch: &str) -> Result<StockLevel> {
        let metadata = RequestMetadata::new(Method::GET, "inventory/product-stock/")
            .with_query_param("product", product)
            .with_query_param("branch", branch);
        Ok(self.client.call::<(), _>(metadata, None).await?.data)
    }
}
