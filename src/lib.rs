pub mod availability;
pub mod backend;
pub mod batch;
pub mod booking;
pub mod calendar;
pub mod catalog;
pub mod configuration;
pub mod configuration_handler;
pub mod error;
pub mod http;
pub mod presenter;
pub mod profile;
pub mod services;
pub mod terminal;
#[cfg(test)]
mod testutils;
pub mod types;
pub mod validation;
pub mod view;
