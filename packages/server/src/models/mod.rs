pub mod auth;
pub mod generation;
pub mod health;
pub mod shared;
