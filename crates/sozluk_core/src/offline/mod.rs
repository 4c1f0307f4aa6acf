//! Offline request handling for the web client.
//!
//! Navigations and asset requests are classified into a [`RouteDecision`]
//! and then served by [`OfflineRouter`] from the network, the precache, or
//! a runtime cache. Push notifications are handled in [`push`].

pub mod push;
pub mod routes;
pub mod strategy;

pub use push::{notification_from_push, on_notification_click, ClickAction, ClientWindow, Notification};
pub use routes::{classify, decide, AssetKind, Request, RouteClass, RouteDecision, Strategy};
pub use strategy::{MemoryCache, Network, OfflineRouter, Response, ResponseCache};
