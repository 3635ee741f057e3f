//! Recipe sharing site: registered users publish recipes with an optional
//! image, and anyone may browse them.
//!
//! - `auth`: passwords, cookie sessions, the identity gate and login/register
//! - `recipes`: recipe store and the create/read/update/delete pages
//! - `views`: HTML for the view-models the handlers build
//! - `app`: router assembly and serving

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod recipes;
pub mod state;
pub mod storage;
pub mod views;
