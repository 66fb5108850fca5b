//! API route handlers
//!
//! Organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Signup, login, logout, current user
//! - `queues`: Staff queue management and ticket operations
//! - `tickets`: Staff ticket finish
//! - `public`: Unauthenticated kiosk and display board endpoints

pub mod auth;
pub mod health;
pub mod public;
pub mod queues;
pub mod tickets;
