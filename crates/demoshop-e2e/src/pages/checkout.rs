//! Checkout screen: billing form, payment form and cart summary.

use async_trait::async_trait;

use super::{open, BasePage};
use crate::browser::Page;
use crate::cart::{format_total, sum_prices};
use crate::expect::expect;
use crate::fixtures::{PaymentInfo, PersonalInfo, Route};
use crate::locator::{Locator, Role};
use crate::result::{E2eError, E2eResult};
use crate::wait::LoadState;

/// Checkout form and cart
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    page: Page,
    full_name_input: Locator,
    email_input: Locator,
    address_input: Locator,
    city_input: Locator,
    state_input: Locator,
    zip_input: Locator,
    name_on_card_input: Locator,
    credit_card_input: Locator,
    exp_month_select: Locator,
    exp_year_input: Locator,
    cvv_input: Locator,
    same_address_checkbox: Locator,
    submit_button: Locator,
    cart_total: Locator,
    order_confirmation_heading: Locator,
    order_confirmation_number: Locator,
    item_prices: Locator,
}

fn textbox(name: &str, description: &str) -> Locator {
    Locator::role(Role::Textbox)
        .with_name(name)
        .describe(description)
}

impl CheckoutPage {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page,
            full_name_input: textbox("Full Name", "Full name input field"),
            email_input: textbox("Email", "Email input field"),
            address_input: textbox("Address", "Address input field"),
            city_input: textbox("City", "City input field"),
            state_input: textbox("State", "State input field"),
            zip_input: textbox("Zip", "Zip code input field"),
            name_on_card_input: textbox("Name on Card", "Name on card input field"),
            credit_card_input: textbox("Credit card number", "Credit card number input field"),
            exp_month_select: Locator::role(Role::Combobox)
                .with_name("Exp Month")
                .describe("Expiration month select"),
            exp_year_input: textbox("Exp Year", "Expiration year input field"),
            cvv_input: textbox("CVV", "CVV input field"),
            same_address_checkbox: Locator::role(Role::Checkbox)
                .with_name("Shipping address same as billing")
                .describe("Same address checkbox"),
            submit_button: Locator::role(Role::Button)
                .with_name("Continue to checkout")
                .describe("Continue to checkout button"),
            cart_total: Locator::text_pattern("^Total")
                .locator(".price")
                .describe("Cart total display"),
            order_confirmation_heading: Locator::role(Role::Heading)
                .with_name("Order Confirmed!")
                .describe("Order confirmation heading"),
            order_confirmation_number: Locator::text_pattern(r"Order Number: \d+")
                .describe("Order confirmation number"),
            item_prices: Locator::css("p")
                .filter_has(Locator::role(Role::Link))
                .locator(".price")
                .describe("Individual item prices"),
        }
    }

    pub async fn fill_personal_information(&self, info: &PersonalInfo) -> E2eResult<()> {
        let page = &self.page;
        page.fill(&self.full_name_input, &info.full_name).await?;
        page.fill(&self.email_input, &info.email).await?;
        page.fill(&self.address_input, &info.address).await?;
        page.fill(&self.city_input, &info.city).await?;
        page.fill(&self.state_input, &info.state).await?;
        page.fill(&self.zip_input, &info.zip).await
    }

    /// The expiry month is chosen by option label
    pub async fn fill_payment_information(&self, info: &PaymentInfo) -> E2eResult<()> {
        let page = &self.page;
        page.fill(&self.name_on_card_input, &info.name_on_card).await?;
        page.fill(&self.credit_card_input, &info.credit_card).await?;
        page.select_option(&self.exp_month_select, &info.exp_month)
            .await?;
        page.fill(&self.exp_year_input, &info.exp_year).await?;
        page.fill(&self.cvv_input, &info.cvv).await
    }

    /// Tick "same address"; no-op when already ticked
    pub async fn check_same_address_option(&self) -> E2eResult<()> {
        self.set_same_address(true).await
    }

    /// Untick "same address"; no-op when already unticked
    pub async fn uncheck_same_address_option(&self) -> E2eResult<()> {
        self.set_same_address(false).await
    }

    async fn set_same_address(&self, wanted: bool) -> E2eResult<()> {
        let checkbox = expect(&self.page, &self.same_address_checkbox);
        checkbox.to_be_visible().await?;
        if self.page.is_checked(&self.same_address_checkbox).await? != wanted {
            if wanted {
                self.page.check(&self.same_address_checkbox).await?;
            } else {
                self.page.uncheck(&self.same_address_checkbox).await?;
            }
        }
        if wanted {
            checkbox.to_be_checked().await
        } else {
            checkbox.not_to_be_checked().await
        }
    }

    /// Click "Continue to checkout" and wait for the network to settle
    pub async fn submit_order(&self) -> E2eResult<()> {
        expect(&self.page, &self.submit_button)
            .to_be_visible()
            .await?;
        self.page.click(&self.submit_button).await?;
        self.page.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Submit and capture the alert it raises.
    ///
    /// The dialog subscription is armed before the click and accepts the
    /// dialog. Returns its message, or an empty string when no dialog
    /// arrives within the short timeout.
    pub async fn submit_order_and_expect_alert(&self) -> E2eResult<String> {
        let watch = self.page.once_dialog();
        self.page.click(&self.submit_button).await?;
        let message = watch
            .arrival(self.page.config().timeouts.short)
            .await
            .map(|dialog| dialog.message().to_string())
            .unwrap_or_default();
        if message.is_empty() {
            tracing::debug!("no dialog after submit");
        } else {
            tracing::debug!(text = %message, "dialog after submit");
        }
        Ok(message)
    }

    pub async fn expect_cart_total(&self, expected: &str) -> E2eResult<()> {
        let total = expect(&self.page, &self.cart_total);
        total.to_be_visible().await?;
        total.to_contain_text(expected).await
    }

    /// Total as shown on the page, `"$0"` when there is none
    pub async fn displayed_cart_total(&self) -> E2eResult<String> {
        Ok(self
            .page
            .text_content(&self.cart_total)
            .await?
            .unwrap_or_else(|| "$0".to_string()))
    }

    /// Sum of the cart line prices, formatted like the displayed total
    pub async fn calculated_item_total(&self) -> E2eResult<String> {
        let prices = self.page.all_text_contents(&self.item_prices).await?;
        Ok(format_total(sum_prices(&prices)))
    }

    /// The displayed total equals the sum of the line prices
    pub async fn expect_cart_total_is_correct(&self) -> E2eResult<()> {
        let displayed = self.displayed_cart_total().await?;
        let calculated = self.calculated_item_total().await?;
        if displayed == calculated {
            Ok(())
        } else {
            Err(E2eError::assertion(format!(
                "cart total: displayed {displayed:?}, sum of items {calculated:?}"
            )))
        }
    }

    pub async fn expect_order_confirmation(&self) -> E2eResult<()> {
        expect(&self.page, &self.order_confirmation_heading)
            .to_be_visible()
            .await?;
        expect(&self.page, &self.order_confirmation_number)
            .to_be_visible()
            .await?;
        let number = self
            .page
            .text_content(&self.order_confirmation_number)
            .await?
            .unwrap_or_default();
        if number.trim().is_empty() {
            return Err(E2eError::assertion("order number is empty"));
        }
        Ok(())
    }

    /// The page settled and no dialog is left waiting for an answer
    pub async fn expect_no_dialogs_pending(&self) -> E2eResult<()> {
        self.page
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await?;
        if self.page.dialogs().has_pending() {
            return Err(E2eError::assertion("a dialog is still pending"));
        }
        Ok(())
    }
}

#[async_trait]
impl BasePage for CheckoutPage {
    fn page(&self) -> &Page {
        &self.page
    }

    async fn navigate(&self) -> E2eResult<()> {
        open(self, Route::Checkout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SuiteConfig, Timeouts};
    use crate::dialog::AutoDialogBehavior;
    use crate::mock::{DemoStorefront, MockDriver, Product};
    use std::time::Duration;

    fn quick_config() -> SuiteConfig {
        SuiteConfig::default().with_timeouts(Timeouts {
            default: Duration::from_millis(50),
            long: Duration::from_millis(50),
            short: Duration::from_millis(50),
        })
    }

    async fn checkout_page(storefront: DemoStorefront) -> CheckoutPage {
        let checkout = CheckoutPage::new(Page::new(MockDriver::new(storefront), quick_config()));
        checkout.navigate().await.unwrap();
        checkout
    }

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_both_sections() {
            let checkout = checkout_page(DemoStorefront::default()).await;
            checkout
                .fill_personal_information(&PersonalInfo::fixture())
                .await
                .unwrap();
            checkout
                .fill_payment_information(&PaymentInfo::fixture())
                .await
                .unwrap();
            let page = checkout.page();
            let zip = page.query(&checkout.zip_input).await.unwrap();
            assert_eq!(zip[0].value.as_deref(), Some("10001"));
            let month = page.query(&checkout.exp_month_select).await.unwrap();
            assert_eq!(month[0].value.as_deref(), Some("January"));
        }

        #[tokio::test]
        async fn test_unknown_month_is_action_error() {
            let checkout = checkout_page(DemoStorefront::default()).await;
            let mut payment = PaymentInfo::fixture();
            payment.exp_month = "Smarch".to_string();
            let err = checkout
                .fill_payment_information(&payment)
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::ActionError { .. }));
        }

        #[tokio::test]
        async fn test_same_address_toggles_are_idempotent() {
            let checkout = checkout_page(DemoStorefront::default()).await;
            checkout.check_same_address_option().await.unwrap();
            checkout.check_same_address_option().await.unwrap();
            assert!(checkout
                .page()
                .is_checked(&checkout.same_address_checkbox)
                .await
                .unwrap());
            checkout.uncheck_same_address_option().await.unwrap();
            checkout.uncheck_same_address_option().await.unwrap();
            assert!(!checkout
                .page()
                .is_checked(&checkout.same_address_checkbox)
                .await
                .unwrap());
        }
    }

    mod submit_tests {
        use super::*;

        #[tokio::test]
        async fn test_alert_message_is_returned_and_accepted() {
            let checkout = checkout_page(DemoStorefront::default()).await;
            checkout.uncheck_same_address_option().await.unwrap();
            let message = checkout.submit_order_and_expect_alert().await.unwrap();
            assert_eq!(
                message,
                "Shipping address same as billing checkbox must be selected."
            );
            checkout.expect_no_dialogs_pending().await.unwrap();
        }

        #[tokio::test]
        async fn test_no_alert_yields_empty_message() {
            let checkout = checkout_page(DemoStorefront::default().without_shipping_alert()).await;
            checkout.uncheck_same_address_option().await.unwrap();
            let message = checkout.submit_order_and_expect_alert().await.unwrap();
            assert_eq!(message, "");
            checkout.expect_order_confirmation().await.unwrap();
        }

        #[tokio::test]
        async fn test_pending_dialog_is_reported() {
            let checkout = checkout_page(DemoStorefront::default()).await;
            checkout
                .page()
                .dialogs()
                .set_auto_behavior(AutoDialogBehavior::Manual);
            checkout.uncheck_same_address_option().await.unwrap();
            checkout.submit_order().await.unwrap();
            let err = checkout.expect_no_dialogs_pending().await.unwrap_err();
            assert!(err.is_assertion());
        }

        #[tokio::test]
        async fn test_confirmation_missing_before_submit() {
            let checkout = checkout_page(DemoStorefront::default()).await;
            assert!(checkout.expect_order_confirmation().await.is_err());
            checkout.submit_order().await.unwrap();
            checkout.expect_order_confirmation().await.unwrap();
        }
    }

    mod total_tests {
        use super::*;

        #[tokio::test]
        async fn test_seeded_totals_agree() {
            let checkout = checkout_page(DemoStorefront::default()).await;
            assert_eq!(checkout.displayed_cart_total().await.unwrap(), "$30");
            assert_eq!(checkout.calculated_item_total().await.unwrap(), "$30");
            checkout.expect_cart_total("$30").await.unwrap();
            checkout.expect_cart_total_is_correct().await.unwrap();
        }

        #[tokio::test]
        async fn test_wrong_displayed_total_is_caught() {
            let checkout =
                checkout_page(DemoStorefront::default().with_displayed_total("$31")).await;
            let err = checkout.expect_cart_total_is_correct().await.unwrap_err();
            assert_eq!(
                err.to_string(),
                r#"Assertion failed: cart total: displayed "$31", sum of items "$30""#
            );
        }

        #[tokio::test]
        async fn test_fractional_and_unparsable_prices() {
            let storefront = DemoStorefront::default().with_cart(vec![
                Product::new("Product 1", "$10.25"),
                Product::new("Product 2", "free"),
                Product::new("Product 3", "$2.25"),
            ]);
            let checkout = checkout_page(storefront).await;
            assert_eq!(checkout.calculated_item_total().await.unwrap(), "$12.5");
            checkout.expect_cart_total_is_correct().await.unwrap();
        }

        #[tokio::test]
        async fn test_total_outside_checkout_defaults_to_zero() {
            let checkout = checkout_page(DemoStorefront::default()).await;
            checkout.page().goto(Route::Grid).await.unwrap();
            assert_eq!(checkout.displayed_cart_total().await.unwrap(), "$0");
            assert_eq!(checkout.calculated_item_total().await.unwrap(), "$0");
        }
    }
}
