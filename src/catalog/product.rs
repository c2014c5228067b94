//! Product records

use crate::core::validation::{self, FieldRules};
use crate::impl_record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in-stock",
            StockStatus::LowStock => "low-stock",
            StockStatus::OutOfStock => "out-of-stock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub image: String,
    pub name: String,
    pub category: String,
    /// Display label, e.g. "Low Stock"
    #[serde(default)]
    pub stock: String,
    pub stock_count: u32,
    pub stock_status: StockStatus,
    /// Display form of `raw_sales`, e.g. "1.43k"
    #[serde(default)]
    pub total_sales: String,
    #[serde(default)]
    pub raw_sales: u32,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

// "sales" and "stock" are query aliases for the numeric counts; patches
// still write `rawSales` and `stockCount`, and the serialized `stock` key
// stays the display label
impl_record!(Product, "products",
    search: ["name", "category", "tags"],
    required: ["name", "category", "price"],
    fields: {
        "id" => |p| p.id.as_str(),
        "name" => |p| p.name.as_str(),
        "category" => |p| p.category.as_str(),
        "tags" => |p| p.tags.clone(),
        "sales" => |p| p.raw_sales,
        "stock" => |p| p.stock_count,
        "stockStatus" => |p| p.stock_status.as_str(),
        "price" => |p| p.price,
        "rating" => |p| p.rating,
    },
    rules: FieldRules::new()
        .rule("name", validation::not_blank())
        .rule("price", validation::non_negative())
        .rule("stockCount", validation::non_negative())
        .rule("rating", validation::non_negative())
        .rule("rating", validation::max_value(5.0))
        .rule(
            "stockStatus",
            validation::in_list(&["in-stock", "low-stock", "out-of-stock"]),
        )
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldValue;
    use crate::core::record::Record;
    use serde_json::json;

    #[test]
    fn test_sort_keys_are_numeric() {
        let product: Product = serde_json::from_value(json!({
            "id": "2",
            "name": "Nike Air Max 97",
            "category": "Men's Shoes",
            "stock": "Low Stock",
            "stockCount": 3,
            "stockStatus": "low-stock",
            "rawSales": 2680,
            "price": 159.99
        }))
        .unwrap();

        assert_eq!(product.field_value("stock"), Some(FieldValue::Integer(3)));
        assert_eq!(product.field_value("sales"), Some(FieldValue::Integer(2680)));
        assert_eq!(product.field_value("tags"), Some(FieldValue::List(vec![])));
    }

    #[test]
    fn test_stock_alias_reads_count_not_label() {
        let product = crate::catalog::seed::products().remove(1);
        assert_eq!(product.stock, "Low Stock");
        assert_eq!(product.field_value("stock"), Some(FieldValue::Integer(3)));
        assert!(!Product::has_field("stockCount"));

        // Patches address the serialized key
        let rules = Product::field_rules();
        let object = json!({"name": "x", "stockCount": -1});
        assert!(rules.check(object.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_rating_bounds() {
        let rules = Product::field_rules();
        let object = json!({"name": "x", "rating": 5.5});
        assert!(rules.check(object.as_object().unwrap()).is_err());

        let object = json!({"name": "x", "rating": 4.5, "price": 10});
        assert!(rules.check(object.as_object().unwrap()).is_ok());
    }
}
