pub mod config;
pub mod error;
pub mod health;
pub mod middleware;

pub mod settlement {
    pub mod controller;
    pub mod service;

    pub use controller::configure_routes;
    pub use service::SettlementService;
}
