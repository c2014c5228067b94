//! Customer records

use crate::core::field::FieldFormat;
use crate::core::validation::{self, FieldRules};
use crate::impl_record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "active",
            CustomerStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub orders: u32,
    /// Display form of `raw_value`, e.g. "$4.19K"
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub raw_value: f64,
    pub email: String,
    pub join_date: NaiveDate,
    pub status: CustomerStatus,
}

impl_record!(Customer, "customers",
    search: ["name", "email"],
    required: ["name", "email", "joinDate", "status"],
    fields: {
        "id" => |c| c.id.as_str(),
        "name" => |c| c.name.as_str(),
        "email" => |c| c.email.as_str(),
        "orders" => |c| c.orders,
        "rawValue" => |c| c.raw_value,
        "joinDate" => |c| c.join_date,
        "status" => |c| c.status.as_str(),
    },
    rules: FieldRules::new()
        .rule("name", validation::not_blank())
        .rule("email", validation::format(FieldFormat::Email))
        .rule("orders", validation::non_negative())
        .rule("rawValue", validation::non_negative())
        .rule("status", validation::in_list(&["active", "inactive"]))
);
