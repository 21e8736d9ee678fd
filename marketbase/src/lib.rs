//! Seller identity lifecycle and access control for the Marketbase marketplace.

pub mod auth;
