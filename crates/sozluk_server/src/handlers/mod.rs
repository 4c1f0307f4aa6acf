//! HTTP request handlers.

pub(crate) mod auth;
/// Badge administration endpoints.
pub mod badges;
/// Contribution approval endpoint.
pub mod contributions;
/// Dictionary sync endpoints.
pub mod sync;
/// Profile endpoints.
pub mod users;
/// Public word lookup and autocomplete.
pub mod words;
