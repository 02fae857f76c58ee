//! Wire models for the Sale Tracker backend, camelCase on the wire.
//! Dates travel as ISO 8601 strings; the backend owns their semantics.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Platform a sale occurred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// eBay.
    Ebay,
    /// GOAT.
    Goat,
    /// StockX.
    Stockx,
    /// Recorded by hand.
    Manual,
}

impl Platform {
    fn as_str(self) -> &'static str {
        match self {
            Self::Ebay => "ebay",
            Self::Goat => "goat",
            Self::Stockx => "stockx",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ebay" => Ok(Self::Ebay),
            "goat" => Ok(Self::Goat),
            "stockx" => Ok(Self::Stockx),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown platform '{other}', expected ebay, goat, stockx or manual")),
        }
    }
}

/// A complete sale record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    /// Unique identifier of the sale.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Name of the product sold.
    pub product_name: String,
    /// Sale amount in USD.
    pub amount: f64,
    /// Date of the sale.
    pub sale_date: String,
    /// Customer name, when known.
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Platform the sale occurred on.
    pub platform: Platform,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Payload for creating a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreate {
    /// Name of the product sold.
    pub product_name: String,
    /// Sale amount in USD.
    pub amount: f64,
    /// Date of the sale.
    pub sale_date: String,
    /// Customer name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// Platform the sale occurred on.
    pub platform: Platform,
}

/// Payload for updating a sale. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleUpdate {
    /// New product name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// New amount in USD.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// New sale date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_date: Option<String>,
    /// New customer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// New platform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

impl SaleUpdate {
    /// Whether the update changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none()
            && self.amount.is_none()
            && self.sale_date.is_none()
            && self.customer_name.is_none()
            && self.platform.is_none()
    }
}

/// Aggregate statistics for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Total sales amount.
    pub total_sales: f64,
    /// Total number of items sold.
    pub total_items: u64,
    /// Sales amount for the current month.
    pub this_month: f64,
    /// Average price per item.
    pub avg_price: f64,
}

/// A sale in the recent-sales list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSale {
    /// Unique identifier of the sale.
    pub id: String,
    /// Name of the product sold.
    pub product_name: String,
    /// Sale amount in USD.
    pub amount: f64,
    /// Date of the sale.
    pub sale_date: String,
    /// Platform the sale occurred on.
    pub platform: Platform,
    /// Customer name, when known.
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// Combined dashboard payload: statistics plus the recent sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    /// Aggregate statistics.
    pub stats: DashboardStats,
    /// Most recent sales.
    pub recent_sales: Vec<RecentSale>,
}

/// Current-user information as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Stable identifier of the user.
    pub user_id: String,
    /// Human-readable name.
    pub user_details: String,
    /// Name of the OAuth provider.
    pub provider: String,
}

/// Backend liveness report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Health status, `healthy` when the service is up.
    pub status: String,
    /// Name of the responding service.
    pub service: String,
}
