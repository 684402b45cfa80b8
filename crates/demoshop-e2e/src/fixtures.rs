//! Static test data shared by the scenarios: routes, credentials, form
//! values, search terms and timeouts.

use serde::{Deserialize, Serialize};

/// Base URL used when `BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "http://localhost:3100";

/// Screens of the demo shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Sign-in form
    Login,
    /// Landing page after a successful sign-in
    Home,
    /// Checkout form and cart summary
    Checkout,
    /// Product grid
    Grid,
    /// Search form
    Search,
}

impl Route {
    /// Path of this screen relative to the base URL
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/home",
            Self::Checkout => "/checkout",
            Self::Grid => "/grid",
            Self::Search => "/search",
        }
    }

    /// Resolve a path (with or without host) back to a route
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        [
            Self::Login,
            Self::Home,
            Self::Checkout,
            Self::Grid,
            Self::Search,
        ]
        .into_iter()
        .find(|route| path.ends_with(route.path()))
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// A username/password pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    /// Username typed into the USERNAME field
    pub username: &'static str,
    /// Password typed into the PASSWORD field
    pub password: &'static str,
}

/// Account seeded in the demo shop
pub const VALID_CREDENTIALS: Credentials = Credentials {
    username: "johndoe19",
    password: "supersecret",
};

/// Account that does not exist
pub const INVALID_CREDENTIALS: Credentials = Credentials {
    username: "wronguser",
    password: "wrongpass",
};

/// Timeouts in milliseconds
pub mod timeouts {
    /// Assertion and action auto-wait
    pub const DEFAULT_MS: u64 = 5_000;
    /// Load-state barriers
    pub const LONG_MS: u64 = 10_000;
    /// Dialog arrival after submit
    pub const SHORT_MS: u64 = 1_000;
}

/// Search terms
pub mod search_terms {
    /// Term with exactly one hit
    pub const VALID: &str = "automation";
    /// Blank submission
    pub const EMPTY: &str = "";
}

/// Billing details typed into the checkout form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Card details typed into the checkout form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub name_on_card: String,
    pub credit_card: String,
    /// Label of the option in the "Exp Month" select
    pub exp_month: String,
    pub exp_year: String,
    pub cvv: String,
}

impl PersonalInfo {
    /// The checkout fixture used across scenarios
    #[must_use]
    pub fn fixture() -> Self {
        Self {
            full_name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            address: "123 Main St".to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            zip: "10001".to_string(),
        }
    }
}

impl PaymentInfo {
    /// The checkout fixture used across scenarios
    #[must_use]
    pub fn fixture() -> Self {
        Self {
            name_on_card: "John Doe".to_string(),
            credit_card: "4111111111111111".to_string(),
            exp_month: "January".to_string(),
            exp_year: "2025".to_string(),
            cvv: "123".to_string(),
        }
    }
}
