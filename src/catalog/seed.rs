//! Demo data the dashboard starts with

use crate::catalog::country::{Country, Trend};
use crate::catalog::customer::{Customer, CustomerStatus};
use crate::catalog::order::{Order, OrderStatus};
use crate::catalog::product::{Product, StockStatus};
use crate::catalog::team::{MemberStatus, TeamMember};
use crate::core::notification::{Notification, NotificationKind};
use chrono::{NaiveDate, TimeDelta, Utc};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

pub fn countries() -> Vec<Country> {
    let country = |id: &str, name: &str, flag: &str, value: &str, raw: f64, trend, change| Country {
        id: id.to_string(),
        name: name.to_string(),
        flag: format!("assets/images/flags/{}.svg", flag),
        value: value.to_string(),
        raw_value: raw,
        trend,
        change_percent: change,
    };

    vec![
        country("1", "Australia", "australia", "7.12K", 7120.0, Trend::Up, 12.5),
        country("2", "Belgium", "belgium", "4.18K", 4180.0, Trend::Up, 8.3),
        country("3", "Canada", "canada", "6.45K", 6450.0, Trend::Up, 15.2),
        country("4", "Costa Rica", "costa-rica", "3.88K", 3880.0, Trend::Down, -5.7),
        country("5", "Austria", "austria", "6.98K", 6980.0, Trend::Up, 9.8),
    ]
}

pub fn customers() -> Vec<Customer> {
    let customer = |id: &str, name: &str, slug: &str, orders, value: &str, raw: f64, joined, status| {
        Customer {
            id: id.to_string(),
            name: name.to_string(),
            avatar: format!("assets/images/avatars/{}.svg", slug),
            orders,
            value: value.to_string(),
            raw_value: raw,
            email: format!("{}@email.com", name.to_lowercase().replace(' ', ".")),
            join_date: joined,
            status,
        }
    };

    vec![
        customer("1", "Robert Lewis", "robert", 40, "$4.19K", 4190.0, date(2023, 1, 15), CustomerStatus::Active),
        customer("2", "Tom Barnett", "tom", 31, "$3.56K", 3560.0, date(2023, 2, 20), CustomerStatus::Active),
        customer("3", "Jenson Doyle", "jenson", 17, "$3.12K", 3120.0, date(2023, 3, 10), CustomerStatus::Active),
        customer("4", "Donald Cortez", "donald", 7, "$2.14K", 2140.0, date(2023, 4, 5), CustomerStatus::Inactive),
    ]
}

pub fn products() -> Vec<Product> {
    let product = |id: &str,
                   slug: &str,
                   name: &str,
                   category: &str,
                   count: u32,
                   status: StockStatus,
                   sales: u32,
                   price: f64,
                   rating: f64| {
        let stock = match status {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        };
        Product {
            id: id.to_string(),
            image: format!("assets/images/products/{}.webp", slug),
            name: name.to_string(),
            category: category.to_string(),
            stock: stock.to_string(),
            stock_count: count,
            stock_status: status,
            total_sales: format!("{:.2}k", f64::from(sales) / 1000.0),
            raw_sales: sales,
            price,
            rating,
            tags: Vec::new(),
        }
    };

    vec![
        product("1", "denim-jacket", "Denim Jacket", "Men's Tops", 45, StockStatus::InStock, 1430, 89.99, 4.5),
        product("2", "nike-air-max", "Nike Air Max 97", "Men's Shoes", 3, StockStatus::LowStock, 2680, 159.99, 4.8),
        product("3", "jordan-air", "Jordan Air", "Men's T-Shirt", 28, StockStatus::InStock, 1430, 45.99, 4.2),
    ]
}

pub fn orders() -> Vec<Order> {
    let order = |id: &str, name: &str, slug: &str, raw: f64, customer: &str, placed, status| Order {
        id: id.to_string(),
        product_name: name.to_string(),
        product_image: format!("assets/images/products/{}.webp", slug),
        category: "Sports".to_string(),
        value: format!("${:.2}", raw),
        raw_value: raw,
        customer: customer.to_string(),
        date: placed,
        status,
    };

    vec![
        order("1", "Nike Air Force 1", "nike-air-force", 110.96, "Robert Lewis", date(2024, 6, 19), OrderStatus::Completed),
        order("2", "Men's Dri-FIT 7", "mens-drifit", 38.97, "Tom Barnett", date(2024, 6, 18), OrderStatus::Pending),
        order("3", "Jordan Dri-FIT Sport", "jordan-drifit", 35.60, "Jenson Doyle", date(2024, 6, 17), OrderStatus::Completed),
    ]
}

/// Team members; the last two have no order history
pub fn team_members() -> Vec<TeamMember> {
    let now = Utc::now();
    let member = |n: u32, first: &str, last: &str, role: &str, department: &str, status, joined, idle: TimeDelta, phone: &str| {
        TeamMember {
            id: format!("user-{}", n),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}.{}@xenith.com", first.to_lowercase(), last.to_lowercase()),
            avatar: format!("assets/images/avatars/{}.svg", first.to_lowercase()),
            role: role.to_string(),
            department: department.to_string(),
            status,
            join_date: joined,
            last_login: now - idle,
            phone: Some(phone.to_string()),
            is_online: idle < TimeDelta::hours(1),
            total_orders: None,
            total_revenue: None,
        }
    };

    let mut members = vec![
        member(1, "Zac", "Hudson", "Administrator", "Admin", MemberStatus::Active, date(2023, 1, 15), TimeDelta::zero(), "+1 (555) 123-4567"),
        member(2, "Sarah", "Wilson", "Manager", "Sales", MemberStatus::Active, date(2023, 2, 20), TimeDelta::hours(1), "+1 (555) 234-5678"),
        member(3, "Mike", "Johnson", "Sales Rep", "Sales", MemberStatus::Active, date(2023, 3, 10), TimeDelta::hours(2), "+1 (555) 345-6789"),
        member(4, "Lisa", "Chen", "Support Agent", "Support", MemberStatus::Active, date(2023, 4, 5), TimeDelta::minutes(30), "+1 (555) 456-7890"),
        member(5, "David", "Brown", "Viewer", "Marketing", MemberStatus::Pending, date(2023, 6, 15), TimeDelta::days(1), "+1 (555) 567-8901"),
    ];

    for (member, (orders, revenue)) in members.iter_mut().zip([(156, 85420.0), (89, 42180.0), (234, 128450.0)]) {
        member.total_orders = Some(orders);
        member.total_revenue = Some(revenue);
    }
    members
}

/// Notifications present when the dashboard opens, newest first
pub fn notifications() -> Vec<Notification> {
    let now = Utc::now();
    let at = |kind, title: &str, message: &str, age: TimeDelta, read| {
        let mut notification = Notification::new(kind, title, message);
        notification.created_at = now - age;
        notification.read = read;
        notification
    };

    vec![
        at(NotificationKind::Success, "New Order", "Order #12345 has been completed", TimeDelta::zero(), false),
        at(NotificationKind::Warning, "Low Stock", "Nike Air Max 97 is running low on stock", TimeDelta::hours(1), false),
        at(NotificationKind::Info, "System Update", "Dashboard analytics have been updated", TimeDelta::hours(2), true),
    ]
}
