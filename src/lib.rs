pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod controller;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod routes;
pub mod views;

#[cfg(test)]
pub mod testing;
