//! Homework Status Bot Library
//!
//! Polls the homework review API and relays status changes to a Telegram chat.
//!
//! This crate provides the core functionality for:
//! - Loading and checking credentials and polling settings
//! - Fetching and validating review API answers
//! - Turning homework statuses into verdict sentences
//! - Running the deduplicating notify loop

pub mod config;
pub mod error;
pub mod homework;
pub mod logging;
pub mod scheduler;
pub mod telegram;
