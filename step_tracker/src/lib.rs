pub mod app;
pub mod app_state;
pub mod config;
pub mod navigator;
pub mod screens;
pub mod sensors;
pub mod session_tracker;
