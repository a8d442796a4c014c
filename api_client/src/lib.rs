pub mod client;
pub mod envelope;
pub mod session;

pub mod dtos {
    pub mod auth;
    pub mod billing;
    pub mod dashboard;
}

mod endpoints {
    mod auth;
    mod billing;
    mod dashboard;
}

pub use client::ApiClient;
pub use session::{Session, SessionStore};
