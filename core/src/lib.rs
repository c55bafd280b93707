pub mod error;
pub mod fields;
pub mod i18n;
pub mod models;
pub mod service;
pub mod session;
pub mod store;
pub mod table;
