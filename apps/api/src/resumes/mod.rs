pub mod handlers;
pub mod listing;
pub mod service;
pub mod transfer;
