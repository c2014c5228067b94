//! Team member records for the user management view

use crate::core::export::ExportColumn;
use crate::core::field::FieldFormat;
use crate::core::validation::{self, FieldRules};
use crate::impl_record;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
    Pending,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
    /// Role display name, e.g. "Sales Rep"
    pub role: String,
    #[serde(default)]
    pub department: String,
    pub status: MemberStatus,
    pub join_date: NaiveDate,
    pub last_login: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_orders: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<f64>,
}

impl TeamMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Columns of the user management CSV export
    pub fn export_columns() -> Vec<ExportColumn> {
        vec![
            ExportColumn::new("name", "Name"),
            ExportColumn::new("email", "Email"),
            ExportColumn::new("role", "Role"),
            ExportColumn::new("department", "Department"),
            ExportColumn::new("status", "Status"),
            ExportColumn::new("joinDate", "Join Date"),
        ]
    }
}

impl_record!(TeamMember, "team_members",
    search: ["firstName", "lastName", "email"],
    required: ["firstName", "lastName", "email", "role", "status"],
    fields: {
        "id" => |m| m.id.as_str(),
        "name" => |m| m.full_name(),
        "firstName" => |m| m.first_name.as_str(),
        "lastName" => |m| m.last_name.as_str(),
        "email" => |m| m.email.as_str(),
        "role" => |m| m.role.as_str(),
        "department" => |m| m.department.as_str(),
        "status" => |m| m.status.as_str(),
        "joinDate" => |m| m.join_date,
        "lastLogin" => |m| m.last_login,
        "isOnline" => |m| m.is_online,
        "totalOrders" => |m| m.total_orders,
        "totalRevenue" => |m| m.total_revenue,
    },
    rules: FieldRules::new()
        .rule("email", validation::format(FieldFormat::Email))
        .rule("phone", validation::format(FieldFormat::Phone))
        .rule("status", validation::in_list(&["active", "inactive", "pending"]))
);
