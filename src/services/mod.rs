pub mod backup;
pub mod cache;
pub mod health;
pub mod metrics;
pub mod notify;
pub mod posts;
pub mod signal;
pub mod sync;
