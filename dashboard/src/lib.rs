pub mod cart;
pub mod messages;
pub mod notifications;
pub mod polling;
pub mod service;

pub use cart::Cart;
pub use messages::{MessageFeed, MessagingApi};
pub use notifications::{NotificationApi, NotificationCenter};
pub use polling::{Poller, spawn_poller};
pub use service::{DashboardApi, DashboardService};
