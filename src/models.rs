use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-size stock resolved once when a product enters the client.
///
/// The wire sometimes carries a `stockBySize` map and sometimes only a flat
/// `stock` count; everything downstream asks this type instead of sniffing
/// the raw shape again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockLevels {
    PerSize(HashMap<String, u32>),
    Flat(u32),
}

impl StockLevels {
    /// Stock ceiling for a size. A per-size map without the requested size
    /// means that size cannot be bought.
    pub fn for_size(&self, size: &str) -> u32 {
        match self {
            StockLevels::PerSize(map) => map.get(size).copied().unwrap_or(0),
            StockLevels::Flat(stock) => *stock,
        }
    }

    pub fn total(&self) -> u32 {
        match self {
            StockLevels::PerSize(map) => map.values().sum(),
            StockLevels::Flat(stock) => *stock,
        }
    }
}

impl Default for StockLevels {
    fn default() -> Self {
        StockLevels::Flat(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
    pub hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ProductWire", into = "ProductWire")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in minor currency units, tax inclusive.
    pub price: i64,
    pub original_price: Option<i64>,
    pub images: Vec<String>,
    pub category: String,
    pub sizes: Vec<String>,
    pub colors: Vec<Color>,
    pub stock: StockLevels,
    pub featured: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Raw wire shape of a product. `stock_by_size` wins over the flat `stock`
/// field when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductWire {
    id: Uuid,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_price: Option<i64>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    sizes: Vec<String>,
    #[serde(default)]
    colors: Vec<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stock_by_size: Option<HashMap<String, u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stock: Option<u32>,
    #[serde(default)]
    featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl From<ProductWire> for Product {
    fn from(wire: ProductWire) -> Self {
        let stock = match wire.stock_by_size {
            Some(map) => StockLevels::PerSize(map),
            None => StockLevels::Flat(wire.stock.unwrap_or(0)),
        };
        Product {
            id: wire.id,
            name: wire.name,
            description: wire.description,
            price: wire.price,
            original_price: wire.original_price,
            images: wire.images,
            category: wire.category,
            sizes: wire.sizes,
            colors: wire.colors,
            stock,
            featured: wire.featured,
            created_at: wire.created_at,
        }
    }
}

impl From<Product> for ProductWire {
    fn from(product: Product) -> Self {
        let (stock_by_size, stock) = match product.stock {
            StockLevels::PerSize(map) => (Some(map), None),
            StockLevels::Flat(count) => (None, Some(count)),
        };
        ProductWire {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            original_price: product.original_price,
            images: product.images,
            category: product.category,
            sizes: product.sizes,
            colors: product.colors,
            stock_by_size,
            stock,
            featured: product.featured,
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub product: Product,
    pub quantity: u32,
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Unit price captured at the time the line was added.
    pub price: i64,
}

impl CartItem {
    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }

    /// Lines merge on (product, size, color name).
    pub fn matches(&self, product_id: Uuid, size: &str, color_name: Option<&str>) -> bool {
        self.product.id == product_id
            && self.size == size
            && self.color.as_ref().map(|c| c.name.as_str()) == color_name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_amount: i64,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Re-derives `total_amount` from the lines. Called after every mutation;
    /// the total is never adjusted independently of its inputs.
    pub fn recompute_total(&mut self) {
        self.total_amount = self.items.iter().map(CartItem::line_total).sum();
    }

    pub fn quantity_for(&self, product_id: Uuid, size: &str, color_name: Option<&str>) -> u32 {
        self.items
            .iter()
            .filter(|item| item.matches(product_id, size, color_name))
            .map(|item| item.quantity)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// The authenticated session as persisted to local storage: profile plus the
/// bearer token the API client attaches to every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    /// Absent on profile responses; the session store keeps the token it
    /// already holds in that case.
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<ShippingAddress>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    pub total_amount: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
