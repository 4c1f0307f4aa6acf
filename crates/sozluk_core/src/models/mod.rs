//! Data models for persistence, sync, and the HTTP API.

/// Badges, awards, and contribution events.
pub mod badge;
/// Remote manifest document.
pub mod manifest;
/// Dictionary entries.
pub mod word;

#[cfg(test)]
mod tests;
