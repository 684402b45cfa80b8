//! Product grid screen.
//!
//! The grid is read as four parallel collections (titles, prices, images,
//! buttons). Position `n` of the grid is index `n - 1` of each.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{open, BasePage};
use crate::browser::Page;
use crate::expect::expect;
use crate::fixtures::Route;
use crate::locator::{Locator, Role};
use crate::result::{E2eError, E2eResult};

/// One grid entry as read off the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridItem {
    pub title: String,
    pub price: String,
    pub has_image: bool,
    pub has_button: bool,
}

impl GridItem {
    fn missing_parts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.price.trim().is_empty() {
            missing.push("price");
        }
        if !self.has_image {
            missing.push("image");
        }
        if !self.has_button {
            missing.push("button");
        }
        missing
    }
}

/// Product grid
#[derive(Debug, Clone)]
pub struct GridPage {
    page: Page,
    item_titles: Locator,
    item_prices: Locator,
    item_images: Locator,
    item_buttons: Locator,
}

impl GridPage {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page,
            item_titles: Locator::role(Role::Heading)
                .with_level(4)
                .describe("Product titles"),
            item_prices: Locator::css("#item-price").describe("Product prices"),
            item_images: Locator::role(Role::Img).describe("Product images"),
            item_buttons: Locator::role(Role::Button)
                .with_name("Add to Order")
                .describe("Add to order buttons"),
        }
    }

    /// Title locator of the item at a 1-based position
    #[must_use]
    pub fn product_title(&self, position: usize) -> Locator {
        at(&self.item_titles, position).describe(format!("Product title at position {position}"))
    }

    /// Price locator of the item at a 1-based position
    #[must_use]
    pub fn product_price(&self, position: usize) -> Locator {
        at(&self.item_prices, position).describe(format!("Product price at position {position}"))
    }

    /// Button locator of the item at a 1-based position
    #[must_use]
    pub fn product_button(&self, position: usize) -> Locator {
        at(&self.item_buttons, position)
            .describe(format!("Product button at position {position}"))
    }

    /// Number of products, counted by title
    pub async fn items_count(&self) -> E2eResult<usize> {
        self.page.count(&self.item_titles).await
    }

    /// Read the item at a 1-based position.
    ///
    /// Positions outside the grid (including 0) read as an empty item
    /// rather than failing.
    pub async fn item_at_position(&self, position: usize) -> E2eResult<GridItem> {
        let Some(index) = position.checked_sub(1) else {
            return Ok(GridItem::default());
        };
        self.item_at_index(index).await
    }

    async fn item_at_index(&self, index: usize) -> E2eResult<GridItem> {
        let page = &self.page;
        Ok(GridItem {
            title: page
                .text_content(&self.item_titles.nth(index))
                .await?
                .unwrap_or_default(),
            price: page
                .text_content(&self.item_prices.nth(index))
                .await?
                .unwrap_or_default(),
            has_image: page.is_visible(&self.item_images.nth(index)).await?,
            has_button: page.is_visible(&self.item_buttons.nth(index)).await?,
        })
    }

    /// Every item, one per title
    pub async fn all_items(&self) -> E2eResult<Vec<GridItem>> {
        let count = self.items_count().await?;
        let mut items = Vec::with_capacity(count);
        for index in 0..count {
            items.push(self.item_at_index(index).await?);
        }
        Ok(items)
    }

    /// Exact title and price (after trimming), image and button present
    pub async fn expect_product_at_position(
        &self,
        position: usize,
        title: &str,
        price: &str,
    ) -> E2eResult<()> {
        let item = self.item_at_position(position).await?;
        ensure(
            item.title.trim() == title,
            || format!("item {position} title: expected {title:?}, got {:?}", item.title.trim()),
        )?;
        ensure(
            item.price.trim() == price,
            || format!("item {position} price: expected {price:?}, got {:?}", item.price.trim()),
        )?;
        ensure(item.has_image, || format!("item {position} has no visible image"))?;
        ensure(item.has_button, || format!("item {position} has no visible button"))
    }

    /// Title contains `title` (ignoring case) and price contains `price`
    pub async fn assert_item_at_position(
        &self,
        position: usize,
        title: &str,
        price: &str,
    ) -> E2eResult<()> {
        let item = self.item_at_position(position).await?;
        ensure(
            item.title.to_lowercase().contains(&title.to_lowercase()),
            || format!("item {position} title {:?} does not contain {title:?}", item.title),
        )?;
        ensure(item.price.contains(price), || {
            format!("item {position} price {:?} does not contain {price:?}", item.price)
        })
    }

    /// The grid is not empty and every item is complete
    pub async fn expect_all_items_have_required_elements(&self) -> E2eResult<()> {
        let items = self.all_items().await?;
        ensure(!items.is_empty(), || "product grid is empty".to_string())?;
        check_items(&items)
    }

    /// Every item is complete; an empty grid passes
    pub async fn assert_all_items_have_required_elements(&self) -> E2eResult<()> {
        check_items(&self.all_items().await?)
    }

    /// Click "Add to Order" on the item at a 1-based position
    pub async fn add_product_to_order(&self, position: usize) -> E2eResult<()> {
        let button = self.product_button(position);
        expect(&self.page, &button).to_be_visible().await?;
        self.page.click(&button).await
    }
}

/// `base.nth(position - 1)`; position 0 maps past any real index
fn at(base: &Locator, position: usize) -> Locator {
    base.nth(position.checked_sub(1).unwrap_or(usize::MAX))
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::assertion(message()))
    }
}

fn check_items(items: &[GridItem]) -> E2eResult<()> {
    for (index, item) in items.iter().enumerate() {
        let missing = item.missing_parts();
        ensure(missing.is_empty(), || {
            format!("item {} is missing: {}", index + 1, missing.join(", "))
        })?;
    }
    Ok(())
}

#[async_trait]
impl BasePage for GridPage {
    fn page(&self) -> &Page {
        &self.page
    }

    async fn navigate(&self) -> E2eResult<()> {
        open(self, Route::Grid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::mock::{DemoStorefront, MockDriver, Product};

    async fn grid_page(storefront: DemoStorefront) -> GridPage {
        let grid = GridPage::new(Page::new(MockDriver::new(storefront), SuiteConfig::default()));
        grid.navigate().await.unwrap();
        grid
    }

    #[test]
    fn test_missing_parts() {
        let item = GridItem {
            title: "  ".to_string(),
            price: "$1".to_string(),
            has_image: false,
            has_button: true,
        };
        assert_eq!(item.missing_parts(), vec!["title", "image"]);
    }

    #[test]
    fn test_position_locators_are_described() {
        let grid = GridPage::new(Page::new(MockDriver::default(), SuiteConfig::default()));
        assert_eq!(grid.product_title(7).to_string(), "Product title at position 7");
        assert!(grid
            .product_price(7)
            .selector_chain()
            .ends_with("nth(6)"));
    }

    #[tokio::test]
    async fn test_item_at_position_is_one_based() {
        let grid = grid_page(DemoStorefront::default()).await;
        let item = grid.item_at_position(7).await.unwrap();
        assert_eq!(item.title, "Super Pepperoni");
        assert_eq!(item.price, "$10");
        assert!(item.has_image && item.has_button);
    }

    #[tokio::test]
    async fn test_out_of_range_positions_read_empty() {
        let grid = grid_page(DemoStorefront::default()).await;
        assert_eq!(grid.item_at_position(0).await.unwrap(), GridItem::default());
        assert_eq!(grid.item_at_position(99).await.unwrap(), GridItem::default());
    }

    #[tokio::test]
    async fn test_exact_and_loose_product_checks() {
        let grid = grid_page(DemoStorefront::default()).await;
        grid.expect_product_at_position(7, "Super Pepperoni", "$10")
            .await
            .unwrap();
        grid.assert_item_at_position(7, "super pepperoni", "10")
            .await
            .unwrap();
        let err = grid
            .expect_product_at_position(7, "super pepperoni", "$10")
            .await
            .unwrap_err();
        assert!(err.is_assertion());
    }

    #[tokio::test]
    async fn test_empty_grid_fails_only_the_strict_check() {
        let grid = grid_page(DemoStorefront::default().with_products(Vec::new())).await;
        assert!(grid.all_items().await.unwrap().is_empty());
        grid.assert_all_items_have_required_elements().await.unwrap();
        let err = grid
            .expect_all_items_have_required_elements()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_blank_price_is_reported() {
        let storefront = DemoStorefront::default().with_products(vec![
            Product::new("Margherita", "$8"),
            Product::new("Mystery", " "),
        ]);
        let grid = grid_page(storefront).await;
        let err = grid
            .expect_all_items_have_required_elements()
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: item 2 is missing: price");
    }

    #[tokio::test]
    async fn test_add_product_to_order_clicks_one_button() {
        let grid = grid_page(DemoStorefront::default()).await;
        grid.add_product_to_order(3).await.unwrap();
    }
}
