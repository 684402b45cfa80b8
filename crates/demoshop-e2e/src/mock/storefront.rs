//! The demo shop's screens, rendered as [`Dom`] trees.
//!
//! [`DemoStorefront`] holds the seed data (products, cart, account) and
//! knows how each screen reacts to its buttons. The seeded defaults match
//! the live application the scenarios were written against; builder
//! methods perturb them so tests can prove the page objects notice.

use super::dom::{Dom, Node};
use crate::cart::{format_total, sum_prices};
use crate::dialog::Dialog;
use crate::fixtures::{Route, VALID_CREDENTIALS};

/// Alert raised when submitting checkout with "same address" unchecked
pub const SHIPPING_ALERT: &str = "Shipping address same as billing checkbox must be selected.";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Storefront behavior bound to a clickable element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    SignIn,
    Search,
    SubmitOrder,
    AddToOrder(usize),
}

/// A product as listed in the grid or the cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub title: String,
    pub price: String,
}

impl Product {
    #[must_use]
    pub fn new(title: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
        }
    }
}

/// Login failure shown under the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    WrongCredentials,
    EmptyFields,
}

/// What is on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Login { error: Option<LoginError> },
    Home { username: String },
    Grid,
    Search { term: String, submitted: bool },
    Checkout,
    OrderConfirmed,
    NotFound { path: String },
}

impl Screen {
    /// Path shown in the address bar
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login { .. } => Route::Login.path().to_string(),
            Self::Home { .. } => Route::Home.path().to_string(),
            Self::Grid => Route::Grid.path().to_string(),
            Self::Search { .. } => Route::Search.path().to_string(),
            Self::Checkout | Self::OrderConfirmed => Route::Checkout.path().to_string(),
            Self::NotFound { path } => path.clone(),
        }
    }

    /// Document title
    #[must_use]
    pub fn title(&self) -> String {
        format!("Demo Shop | {}", self.name())
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "Login",
            Self::Home { .. } => "Home",
            Self::Grid => "Products",
            Self::Search { .. } => "Search",
            Self::Checkout => "Checkout",
            Self::OrderConfirmed => "Order Confirmed",
            Self::NotFound { .. } => "Not Found",
        }
    }
}

/// How the storefront answers a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Nothing visible changes
    Nothing,
    /// Render another screen
    Show(Screen),
    /// Open a browser dialog
    Dialog(Dialog),
}

/// Seed data and behavior of the demo shop
#[derive(Debug, Clone)]
pub struct DemoStorefront {
    products: Vec<Product>,
    cart: Vec<Product>,
    displayed_total: Option<String>,
    shipping_alert: bool,
    username: String,
    password: String,
    order_number: u32,
}

impl Default for DemoStorefront {
    fn default() -> Self {
        Self {
            products: vec![
                Product::new("Margherita", "$8"),
                Product::new("Quattro Formaggi", "$12"),
                Product::new("Hawaiian", "$9"),
                Product::new("Veggie Supreme", "$11"),
                Product::new("BBQ Chicken", "$13"),
                Product::new("Diavola", "$10"),
                Product::new("Super Pepperoni", "$10"),
                Product::new("Capricciosa", "$12"),
                Product::new("Marinara", "$7"),
            ],
            cart: vec![
                Product::new("Product 1", "$15"),
                Product::new("Product 2", "$5"),
                Product::new("Product 3", "$8"),
                Product::new("Product 4", "$2"),
            ],
            displayed_total: None,
            shipping_alert: true,
            username: VALID_CREDENTIALS.username.to_string(),
            password: VALID_CREDENTIALS.password.to_string(),
            order_number: 123_456,
        }
    }
}

impl DemoStorefront {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the product grid
    #[must_use]
    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    /// Replace the cart lines
    #[must_use]
    pub fn with_cart(mut self, cart: Vec<Product>) -> Self {
        self.cart = cart;
        self
    }

    /// Show this total instead of the computed one
    #[must_use]
    pub fn with_displayed_total(mut self, total: impl Into<String>) -> Self {
        self.displayed_total = Some(total.into());
        self
    }

    /// Accept checkout without the "same address" alert
    #[must_use]
    pub const fn without_shipping_alert(mut self) -> Self {
        self.shipping_alert = false;
        self
    }

    /// Replace the seeded account
    #[must_use]
    pub fn with_account(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Order number shown after checkout
    #[must_use]
    pub const fn with_order_number(mut self, number: u32) -> Self {
        self.order_number = number;
        self
    }

    /// Screen shown when navigating to `path`
    #[must_use]
    pub fn screen_for(&self, path: &str) -> Screen {
        match Route::from_path(path) {
            Some(Route::Login) => Screen::Login { error: None },
            // the home page is only reachable by signing in
            Some(Route::Home) => Screen::Login { error: None },
            Some(Route::Grid) => Screen::Grid,
            Some(Route::Search) => Screen::Search {
                term: String::new(),
                submitted: false,
            },
            Some(Route::Checkout) => Screen::Checkout,
            None => Screen::NotFound {
                path: path.to_string(),
            },
        }
    }

    /// Render a screen
    #[must_use]
    pub fn render(&self, screen: &Screen) -> Dom {
        let main = match screen {
            Screen::Login { error } => Self::login(*error),
            Screen::Home { username } => Self::home(username),
            Screen::Grid => self.grid(),
            Screen::Search { term, submitted } => Self::search(term, *submitted),
            Screen::Checkout => self.checkout(),
            Screen::OrderConfirmed => self.confirmation(),
            Screen::NotFound { path } => Node::new("main")
                .child(Node::new("h1").text("404 Not Found"))
                .child(Node::new("p").text(format!("No page at {path}"))),
        };
        Dom::new(Node::new("body").child(Self::nav()).child(main))
    }

    /// React to a click on an element carrying `trigger`
    #[must_use]
    pub fn react(&self, trigger: Trigger, dom: &Dom) -> Reaction {
        match trigger {
            Trigger::SignIn => {
                let username = dom.value_of("username").unwrap_or_default();
                let password = dom.value_of("password").unwrap_or_default();
                if username.is_empty() || password.is_empty() {
                    Reaction::Show(Screen::Login {
                        error: Some(LoginError::EmptyFields),
                    })
                } else if username == self.username && password == self.password {
                    Reaction::Show(Screen::Home {
                        username: username.to_string(),
                    })
                } else {
                    Reaction::Show(Screen::Login {
                        error: Some(LoginError::WrongCredentials),
                    })
                }
            }
            Trigger::Search => Reaction::Show(Screen::Search {
                term: dom.value_of("search-input").unwrap_or_default().to_string(),
                submitted: true,
            }),
            Trigger::SubmitOrder => {
                let same_address = dom.checked_of("sameadr").unwrap_or(false);
                if self.shipping_alert && !same_address {
                    Reaction::Dialog(Dialog::alert(SHIPPING_ALERT))
                } else {
                    Reaction::Show(Screen::OrderConfirmed)
                }
            }
            Trigger::AddToOrder(_) => Reaction::Nothing,
        }
    }

    fn nav() -> Node {
        Node::new("nav").child(
            Node::new("ul").children(
                [Route::Login, Route::Grid, Route::Search, Route::Checkout].map(|route| {
                    let label = match route {
                        Route::Login => "Login",
                        Route::Grid => "Products",
                        Route::Search => "Search",
                        _ => "Checkout",
                    };
                    Node::new("li").child(Node::new("a").attr("href", route.path()).text(label))
                }),
            ),
        )
    }

    fn login(error: Option<LoginError>) -> Node {
        let form = Node::new("form")
            .id("login-form")
            .child(Node::new("label").attr("for", "username").text("USERNAME"))
            .child(
                Node::new("input")
                    .id("username")
                    .attr("type", "text")
                    .attr("name", "username"),
            )
            .child(Node::new("label").attr("for", "password").text("PASSWORD"))
            .child(
                Node::new("input")
                    .id("password")
                    .attr("type", "password")
                    .attr("name", "password"),
            )
            .child(
                Node::new("button")
                    .attr("type", "submit")
                    .text("Sign In")
                    .on_click(Trigger::SignIn),
            );
        let mut main = Node::new("main")
            .child(Node::new("h1").text("Login - Shop"))
            .child(form);
        if let Some(error) = error {
            let message = match error {
                LoginError::WrongCredentials => "Wrong credentials",
                LoginError::EmptyFields => "Fields can not be empty",
            };
            main = main.child(Node::new("div").id("message").child(Node::new("h3").text(message)));
        }
        main
    }

    fn home(username: &str) -> Node {
        Node::new("main")
            .child(Node::new("h2").text("Welcome!"))
            .child(
                Node::new("p")
                    .text("You are signed in as ")
                    .child(Node::new("b").id("user").text(username)),
            )
    }

    fn grid(&self) -> Node {
        let items = self.products.iter().enumerate().map(|(i, product)| {
            Node::new("div")
                .class("item")
                .child(Node::new("h4").attr("data-testid", "item-name").text(&product.title))
                .child(
                    Node::new("img")
                        .attr("src", format!("/images/item-{}.png", i + 1))
                        .attr("alt", &product.title),
                )
                .child(Node::new("p").id("item-price").text(&product.price))
                .child(
                    Node::new("button")
                        .text("Add to Order")
                        .on_click(Trigger::AddToOrder(i)),
                )
        });
        Node::new("main")
            .child(Node::new("h2").text("Products"))
            .child(Node::new("div").class("grid").children(items))
    }

    fn search(term: &str, submitted: bool) -> Node {
        let form = Node::new("form")
            .class("search")
            .child(
                Node::new("input")
                    .id("search-input")
                    .attr("type", "text")
                    .attr("placeholder", "Search..")
                    .attr("name", "search")
                    .attr("value", term),
            )
            .child(
                Node::new("button")
                    .attr("type", "submit")
                    .attr("aria-label", "Search")
                    .child(Node::new("i").class("fa fa-search"))
                    .on_click(Trigger::Search),
            );
        let mut main = Node::new("main").child(Node::new("h2").text("Search")).child(form);
        if submitted {
            main = main.child(if term.trim().is_empty() {
                Node::new("div")
                    .id("result")
                    .child(Node::new("p").text("Please provide a search word."))
            } else {
                Node::new("div")
                    .id("result")
                    .attr("data-testid", "search-results")
                    .child(Node::new("p").text(format!("Found one result for {term}")))
            });
        }
        main
    }

    fn field(id: &str, label: &str, placeholder: &str) -> [Node; 2] {
        [
            Node::new("label").attr("for", id).text(label),
            Node::new("input")
                .id(id)
                .attr("type", "text")
                .attr("name", id)
                .attr("placeholder", placeholder),
        ]
    }

    fn checkout(&self) -> Node {
        let billing = Node::new("div")
            .class("col-50")
            .child(Node::new("h3").text("Billing Address"))
            .children(Self::field("fname", "Full Name", "John M. Doe"))
            .children(Self::field("email", "Email", "john@example.com"))
            .children(Self::field("adr", "Address", "542 W. 15th Street"))
            .children(Self::field("city", "City", "New York"))
            .child(
                Node::new("div")
                    .class("row")
                    .child(Node::new("div").class("col-50").children(Self::field("state", "State", "NY")))
                    .child(Node::new("div").class("col-50").children(Self::field("zip", "Zip", "10001"))),
            );

        let months = MONTHS.map(|m| Node::new("option").attr("value", m).text(m));
        let payment = Node::new("div")
            .class("col-50")
            .child(Node::new("h3").text("Payment"))
            .child(Node::new("label").text("Accepted Cards"))
            .children(Self::field("cname", "Name on Card", "John More Doe"))
            .children(Self::field("ccnum", "Credit card number", "1111-2222-3333-4444"))
            .child(Node::new("label").attr("for", "expmonth").text("Exp Month"))
            .child(Node::new("select").id("expmonth").attr("name", "expmonth").children(months))
            .child(
                Node::new("div")
                    .class("row")
                    .child(Node::new("div").class("col-50").children(Self::field("expyear", "Exp Year", "2018")))
                    .child(Node::new("div").class("col-50").children(Self::field("cvv", "CVV", "352"))),
            );

        let form = Node::new("form")
            .child(Node::new("div").class("row").child(billing).child(payment))
            .child(
                Node::new("label")
                    .child(
                        Node::new("input")
                            .id("sameadr")
                            .attr("type", "checkbox")
                            .attr("name", "sameadr")
                            .attr("checked", "checked"),
                    )
                    .text(" Shipping address same as billing"),
            )
            .child(
                Node::new("button")
                    .attr("type", "submit")
                    .class("btn")
                    .text("Continue to checkout")
                    .on_click(Trigger::SubmitOrder),
            );

        let total = self
            .displayed_total
            .clone()
            .unwrap_or_else(|| format_total(sum_prices(self.cart.iter().map(|p| p.price.as_str()))));
        let lines = self.cart.iter().map(|item| {
            Node::new("p")
                .child(Node::new("a").attr("href", "#").text(&item.title))
                .text(" ")
                .child(Node::new("span").class("price").text(&item.price))
        });
        let cart = Node::new("div")
            .class("container")
            .child(
                Node::new("h4")
                    .text("Cart ")
                    .child(
                        Node::new("span")
                            .class("price")
                            .child(Node::new("i").class("fa fa-shopping-cart"))
                            .text(" ")
                            .child(Node::new("b").text(self.cart.len().to_string())),
                    ),
            )
            .children(lines)
            .child(Node::new("hr"))
            .child(
                Node::new("p")
                    .text("Total ")
                    .child(Node::new("span").class("price").child(Node::new("b").text(total))),
            );

        Node::new("main")
            .child(Node::new("h2").text("Responsive Checkout Form"))
            .child(
                Node::new("div")
                    .class("row")
                    .child(Node::new("div").class("col-75").child(Node::new("div").class("container").child(form)))
                    .child(Node::new("div").class("col-25").child(cart)),
            )
    }

    fn confirmation(&self) -> Node {
        Node::new("main")
            .child(Node::new("h2").text("Order Confirmed!"))
            .child(Node::new("p").id("order-number").text(format!("Order Number: {}", self.order_number)))
            .child(Node::new("p").text("Thank you for shopping with us."))
    }
}
