//! Record shapes of the admin dashboard and their seed data

mod macros;

pub mod country;
pub mod customer;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod seed;
pub mod team;

pub use country::{Country, Trend};
pub use customer::{Customer, CustomerStatus};
pub use dashboard::{Collection, Dashboard};
pub use order::{Order, OrderStatus};
pub use product::{Product, StockStatus};
pub use team::{MemberStatus, TeamMember};
