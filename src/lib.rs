pub mod bot;
pub mod cache;
pub mod config;
pub mod db;
pub mod telemetry;
pub mod web;
