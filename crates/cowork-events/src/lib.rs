//! Cross-tab booking and membership notifications.
//!
//! Every open tab of the coworking site shares one key-value origin. This crate
//! layers two typed, newest-first event collections on top of it and lets a tab
//! announce new or changed records to every other tab:
//!
//! - [`SignalBus`]: last-value broadcast over dedicated signal keys
//! - [`BookingEvents`]: bookings, announced when new
//! - [`MembershipEvents`]: memberships, announced when new and when updated
//! - [`Tab`]: one context with its bus and both stores
//!
//! All of it is best-effort. Storage failures are logged and swallowed; the only
//! failure a caller sees is `None` from an update of an unknown identifier.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use cowork_core::BookingEvent;
//! use cowork_events::{SyncConfig, Tab};
//!
//! let config = SyncConfig::default();
//! let origin = config.open_origin().unwrap();
//! let admin = Tab::open(&origin, &config.keys);
//! let customer = Tab::open(&origin, &config.keys);
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let _subscription = admin
//!     .bookings()
//!     .on_new(move |signal| sink.lock().unwrap().push(signal.record.id));
//!
//! customer
//!     .bookings()
//!     .notify_new(BookingEvent::new("Asha", 50_000).with_id("b1"));
//! admin.sync();
//!
//! assert_eq!(*seen.lock().unwrap(), vec!["b1".to_string()]);
//! assert_eq!(admin.bookings().list()[0].id, "b1");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bookings;
pub mod bus;
pub mod config;
pub mod error;
pub mod memberships;
pub mod signal;
pub mod store;
pub mod tab;

pub use bookings::BookingEvents;
pub use bus::{SignalBus, Subscription};
pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use memberships::MembershipEvents;
pub use signal::Signal;
pub use store::EventStore;
pub use tab::Tab;
