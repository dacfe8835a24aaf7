pub mod analytics;
pub mod auth;
pub mod customers;
pub mod members;
pub mod orders;
pub mod products;
pub mod requests;
pub mod settings;
pub mod storefront;
