//! TechHub Admin library.
//!
//! This crate provides the back-office functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Security
//!
//! Every mutating capability of the shop lives here: catalog CRUD, order
//! administration, customer browsing. Only accounts with the `admin` role
//! can log in, and the binary binds to localhost by default.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
