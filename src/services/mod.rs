// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session driving and its collaborators.

pub mod driver;
pub mod identity;
pub mod location;
pub mod notifier;
pub mod runs;

pub use driver::{DriverOptions, SaveOutcome, SessionDriver};
pub use identity::{Identity, StaticIdentity};
pub use location::{
    LocationError, LocationErrorKind, LocationProvider, ReplayLocationProvider,
    ScriptedLocationProvider,
};
pub use notifier::{NotificationId, NotificationLevel, Notifier, NotifyOptions, TracingNotifier};
pub use runs::RunService;
