/*! This library implements the validation and lifecycle-tracking core of a
 *  GPU command-submission API: query-set creation and timestamp writes are
 *  validated against device capabilities and resource state, and bind groups
 *  are leased from per-layout slot pools.
 *
 *  It is an in-process bookkeeping layer. The native backend, shader
 *  compilation and the surface/windowing stack are external collaborators
 *  and are not modeled here; resources are referred to through opaque,
 *  epoch-checked [`id::Id`]s so that liveness checks are registry lookups
 *  rather than pointer dereferences.
 */

#![allow(
    // It is much clearer to assert negative conditions with eq! false
    clippy::bool_assert_comparison,
    // We don't use syntax sugar where it's not necessary.
    clippy::match_like_matches_macro,
    // Redundant matching is more explicit.
    clippy::redundant_pattern_matching,
    // Explicit lifetimes are often easier to reason about.
    clippy::needless_lifetimes,
    // No need for defaults in the internal types.
    clippy::new_without_default
)]
#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_qualifications
)]

pub mod binding_model;
pub mod command;
mod conv;
pub mod device;
pub mod global;
pub mod hub;
pub mod id;
pub mod identity;
pub mod pool;
pub mod registry;
pub mod resource;
pub mod storage;
pub mod types;

use std::borrow::Cow;

/// The index of a queue submission, increasing monotonically per device.
pub type SubmissionIndex = u64;

type Index = u32;
type Epoch = u32;

pub type Label<'a> = Option<Cow<'a, str>>;

trait LabelHelpers<'a> {
    fn borrow_or_default(&'a self) -> &'a str;
}
impl<'a> LabelHelpers<'a> for Label<'a> {
    fn borrow_or_default(&'a self) -> &'a str {
        self.as_ref().map(|cow| cow.as_ref()).unwrap_or_default()
    }
}

#[cfg(feature = "api_log_info")]
macro_rules! api_log {
    ($($arg:tt)+) => (log::info!($($arg)+))
}
#[cfg(not(feature = "api_log_info"))]
macro_rules! api_log {
    ($($arg:tt)+) => (log::trace!($($arg)+))
}
pub(crate) use api_log;

#[cfg(feature = "resource_log_info")]
macro_rules! resource_log {
    ($($arg:tt)+) => (log::info!($($arg)+))
}
#[cfg(not(feature = "resource_log_info"))]
macro_rules! resource_log {
    ($($arg:tt)+) => (log::trace!($($arg)+))
}
pub(crate) use resource_log;

type FastHashMap<K, V> = fxhash::FxHashMap<K, V>;
type FastHashSet<K> = fxhash::FxHashSet<K>;
