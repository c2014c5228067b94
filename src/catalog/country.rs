//! Sales-by-country records

use crate::impl_record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub value: String,
    pub raw_value: f64,
    pub trend: Trend,
    pub change_percent: f64,
}

impl_record!(Country, "countries",
    search: ["name"],
    required: ["name"],
    fields: {
        "id" => |c| c.id.as_str(),
        "name" => |c| c.name.as_str(),
        "rawValue" => |c| c.raw_value,
        "trend" => |c| c.trend.as_str(),
        "changePercent" => |c| c.change_percent,
    }
);
