//! Product grid scenarios

#[macro_use]
mod common;

use demoshop_e2e::prelude::*;

async fn product_at_position_seven(page: Page) -> E2eResult<()> {
    let grid = GridPage::new(page);
    step("Navigate to grid page", grid.navigate()).await?;
    step("Assert item at position 7", async {
        grid.expect_product_at_position(7, "Super Pepperoni", "$10")
            .await?;
        let item = grid.item_at_position(7).await?;
        if !item.title.contains("Super Pepperoni") || !item.price.contains("$10") {
            return Err(E2eError::assertion(format!("unexpected item 7: {item:?}")));
        }
        Ok(())
    })
    .await
}

async fn all_items_have_required_elements(page: Page) -> E2eResult<()> {
    let grid = GridPage::new(page);
    step("Navigate to grid page", grid.navigate()).await?;
    step(
        "Assert all items have required elements",
        grid.expect_all_items_have_required_elements(),
    )
    .await
}

scenarios!(product_at_position_seven, all_items_have_required_elements);

#[tokio::test]
async fn test_all_items_in_display_order() {
    let grid = GridPage::new(common::mock_page());
    grid.navigate().await.unwrap();
    let items = grid.all_items().await.unwrap();
    assert_eq!(items.len(), 9);
    assert_eq!(grid.items_count().await.unwrap(), 9);
    assert_eq!(items[0].title, "Margherita");
    assert_eq!(items[6].title, "Super Pepperoni");
    assert!(items.iter().all(|i| i.has_image && i.has_button));
}

#[tokio::test]
async fn test_reordered_grid_is_detected() {
    let storefront = DemoStorefront::default().with_products(vec![
        Product::new("Super Pepperoni", "$10"),
        Product::new("Margherita", "$8"),
    ]);
    let grid = GridPage::new(common::mock_page_with(storefront));
    grid.navigate().await.unwrap();
    let err = grid
        .expect_product_at_position(7, "Super Pepperoni", "$10")
        .await
        .unwrap_err();
    assert!(err.is_assertion());
    grid.assert_item_at_position(1, "pepperoni", "$10")
        .await
        .unwrap();
}
