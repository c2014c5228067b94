//! Order records

use crate::core::validation::{self, FieldRules};
use crate::impl_record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
    Pending,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Completed => "completed",
            OrderStatus::Pending => "pending",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub value: String,
    pub raw_value: f64,
    pub customer: String,
    pub date: NaiveDate,
    pub status: OrderStatus,
}

impl_record!(Order, "orders",
    search: ["productName", "customer"],
    required: ["productName", "customer", "rawValue", "date", "status"],
    fields: {
        "id" => |o| o.id.as_str(),
        "productName" => |o| o.product_name.as_str(),
        "category" => |o| o.category.as_str(),
        "rawValue" => |o| o.raw_value,
        "customer" => |o| o.customer.as_str(),
        "date" => |o| o.date,
        "status" => |o| o.status.as_str(),
    },
    rules: FieldRules::new()
        .rule("rawValue", validation::non_negative())
        .rule("status", validation::in_list(&["completed", "pending", "cancelled"]))
);
