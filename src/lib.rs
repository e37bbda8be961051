// Service configuration
pub mod config;

// Session resolution against the hosted auth service
pub mod auth;

// Encrypted Spotify token storage
pub mod credentials;

// Per-owner affirmation log
pub mod affirmations;

// LLM, astronomy and fishing content
pub mod content;

// HTTP APIs
pub mod api;
