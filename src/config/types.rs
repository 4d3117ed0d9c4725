use serde::Deserialize;

/// Main configuration structure for Rental-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub marketplace: MarketplaceConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    pub output: OutputConfig,
}

/// Marketplace API access configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    /// Base URL of the marketplace (e.g. "https://www.airbnb.com")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// API key sent with every API request, if the marketplace wants one
    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Number of listings requested per search page
    #[serde(rename = "items-per-grid", default = "default_items_per_grid")]
    pub items_per_grid: u32,

    /// Number of reviews requested per reviews page
    #[serde(rename = "reviews-page-size", default = "default_reviews_page_size")]
    pub reviews_page_size: u32,

    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Calendar refresh configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Booked runs longer than this many nights are treated as fabricated
    #[serde(rename = "fabricated-booking-nights", default = "default_fabricated_nights")]
    pub fabricated_booking_nights: u32,

    /// Booked runs longer than this many nights are reported as suspicious
    #[serde(rename = "suspicious-booking-nights", default = "default_suspicious_nights")]
    pub suspicious_booking_nights: u32,

    /// Number of calendar months fetched per listing
    #[serde(default = "default_months")]
    pub months: u32,

    /// Upper bound on booking quotes requested per listing
    #[serde(rename = "max-rate-quotes", default = "default_max_rate_quotes")]
    pub max_rate_quotes: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            fabricated_booking_nights: default_fabricated_nights(),
            suspicious_booking_nights: default_suspicious_nights(),
            months: default_months(),
            max_rate_quotes: default_max_rate_quotes(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_items_per_grid() -> u32 {
    50
}

fn default_reviews_page_size() -> u32 {
    50
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_fabricated_nights() -> u32 {
    62
}

fn default_suspicious_nights() -> u32 {
    50
}

fn default_months() -> u32 {
    12
}

fn default_max_rate_quotes() -> u32 {
    12
}
