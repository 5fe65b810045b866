mod cart;
mod catalog;
mod order;
mod post;
mod review;
mod user;

pub use cart::CartLine;
pub use catalog::{Category, Product, Subcategory};
pub use order::{Order, OrderItem, PlacedOrder};
pub use post::{PostStatistic, ScheduledPost};
pub use review::{Review, ReviewSummary};
pub use user::{LoyaltyBalance, User};
