// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for device update notifications.
//!
//! This module provides the core types for managing update callbacks:
//!
//! - [`SubscriptionId`] - Identifier handed out on registration
//! - [`DeviceUpdatedCallback`] - The observer capability
//! - [`CallbackRegistry`] - Ordered registry that fans out notifications

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::device::Device;
use crate::error::{BoxError, CallbackError, CallbackErrors, Error};

/// Unique identifier for a registered callback.
///
/// IDs are unique within a registry's lifetime and can be used to
/// unsubscribe without holding on to the callback handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Future returned by a callback invocation.
pub type CallbackFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'static>>;

/// Shared handle to a callback. Registration and removal use its identity.
pub type DeviceCallback = Arc<dyn DeviceUpdatedCallback>;

/// An observer notified whenever a device's state may have changed.
///
/// The argument is the base [`Device`] handle: name and callbacks only.
/// Observers that need the state of a concrete device kind capture that
/// device themselves, preferably as a `Weak` so the registry does not keep
/// it alive:
///
/// ```
/// use std::sync::{Arc, Weak};
///
/// use parking_lot::Mutex;
/// use knx_device::{Device, DeviceHandler};
/// use knx_device::subscription::callback_fn;
///
/// struct Thermometer {
///     device: Device,
///     celsius: Mutex<f32>,
/// }
///
/// impl DeviceHandler for Thermometer {
///     fn device(&self) -> &Device {
///         &self.device
///     }
///
///     fn kind(&self) -> &'static str {
///         "Thermometer"
///     }
/// }
///
/// let sensor = Arc::new(Thermometer {
///     device: Device::new("Hall.Temperature"),
///     celsius: Mutex::new(21.5),
/// });
///
/// let weak: Weak<Thermometer> = Arc::downgrade(&sensor);
/// let observer = callback_fn(move |_device: Device| {
///     let celsius = weak.upgrade().map(|sensor| *sensor.celsius.lock());
///     async move {
///         println!("temperature: {celsius:?}");
///         Ok(())
///     }
/// });
/// sensor.device().register_device_updated_cb(observer).unwrap();
/// ```
///
/// Implemented for every `Fn(Device) -> impl Future<Output = Result<(), BoxError>>`,
/// so async closures can be registered directly. Types that carry their own
/// state implement it by hand:
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use knx_device::Device;
/// use knx_device::subscription::{CallbackFuture, DeviceUpdatedCallback};
///
/// struct UpdateCounter(Arc<AtomicUsize>);
///
/// impl DeviceUpdatedCallback for UpdateCounter {
///     fn device_updated(&self, _device: Device) -> CallbackFuture {
///         let count = Arc::clone(&self.0);
///         Box::pin(async move {
///             count.fetch_add(1, Ordering::SeqCst);
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait DeviceUpdatedCallback: Send + Sync {
    /// Starts the notification for `device`.
    ///
    /// The returned future runs on its own task; an `Err` or a panic is
    /// reported by [`Device::after_update`] without affecting other
    /// callbacks.
    fn device_updated(&self, device: Device) -> CallbackFuture;
}

impl<F, Fut> DeviceUpdatedCallback for F
where
    F: Fn(Device) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn device_updated(&self, device: Device) -> CallbackFuture {
        Box::pin(self(device))
    }
}

/// Wraps an async closure into a [`DeviceCallback`] handle.
///
/// Keep the returned handle to unregister the callback later.
#[must_use]
pub fn callback_fn<F, Fut>(callback: F) -> DeviceCallback
where
    F: Fn(Device) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(callback)
}

#[derive(Clone)]
struct Entry {
    id: SubscriptionId,
    callback: DeviceCallback,
}

/// Registry of update callbacks for one device.
///
/// Callbacks are kept in registration order. The set is copy-on-write:
/// registration and removal build a new set and swap it in, so a
/// notification pass that already took a snapshot is never affected by
/// them. The lock is never held across an `.await`.
pub struct CallbackRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    /// Current set of callbacks.
    callbacks: RwLock<Arc<Vec<Entry>>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Appends a callback to the registry.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyRegistered` if the same handle is already
    /// registered. The registry is left unchanged.
    pub fn register(&self, callback: DeviceCallback) -> Result<SubscriptionId, Error> {
        let mut guard = self.callbacks.write();
        if let Some(existing) = guard
            .iter()
            .find(|entry| Arc::ptr_eq(&entry.callback, &callback))
        {
            return Err(Error::AlreadyRegistered(existing.id));
        }

        let id = self.next_id();
        let mut entries = Vec::clone(&**guard);
        entries.push(Entry { id, callback });
        *guard = Arc::new(entries);
        Ok(id)
    }

    /// Removes a callback by identity.
    ///
    /// Returns `true` if the callback was found and removed.
    pub fn unregister(&self, callback: &DeviceCallback) -> bool {
        self.remove_where(|entry| Arc::ptr_eq(&entry.callback, callback))
    }

    /// Removes a callback by its subscription ID.
    ///
    /// Returns `true` if the callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.remove_where(|entry| entry.id == id)
    }

    fn remove_where(&self, matches: impl Fn(&Entry) -> bool) -> bool {
        let mut guard = self.callbacks.write();
        let Some(position) = guard.iter().position(matches) else {
            return false;
        };

        let mut entries = Vec::clone(&**guard);
        entries.remove(position);
        *guard = Arc::new(entries);
        true
    }

    /// Removes all callbacks.
    pub fn clear(&self) {
        *self.callbacks.write() = Arc::new(Vec::new());
    }

    /// Returns the subscription IDs in registration order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<SubscriptionId> {
        self.snapshot().iter().map(|entry| entry.id).collect()
    }

    /// Returns `true` if this exact handle is registered.
    #[must_use]
    pub fn contains(&self, callback: &DeviceCallback) -> bool {
        self.snapshot()
            .iter()
            .any(|entry| Arc::ptr_eq(&entry.callback, callback))
    }

    fn snapshot(&self) -> Arc<Vec<Entry>> {
        Arc::clone(&*self.callbacks.read())
    }

    /// Runs every registered callback for `device` and waits for all of
    /// them.
    ///
    /// Each callback runs on its own tokio task, started in registration
    /// order. Each task logs its own failure, and failures are collected
    /// and returned once every task has finished. If this future is dropped
    /// early, the spawned tasks keep running to completion and still log
    /// their failures.
    ///
    /// # Errors
    ///
    /// Returns `CallbackErrors` listing every callback that returned an
    /// error or panicked.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub async fn dispatch(&self, device: &Device) -> Result<(), CallbackErrors> {
        let snapshot = self.snapshot();
        let handles: Vec<_> = snapshot
            .iter()
            .map(|entry| {
                let id = entry.id;
                let owner = device.clone();
                let future = entry.callback.device_updated(device.clone());
                // Logged by the task so a cancelled pass still reports it
                let task = async move {
                    let result = future.await;
                    if let Err(e) = &result {
                        tracing::warn!(
                            device = %owner.name(),
                            %id,
                            error = %e,
                            "Update callback failed"
                        );
                    }
                    result
                };
                (id, tokio::spawn(task))
            })
            .collect();

        let mut errors = Vec::new();
        for (id, handle) in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => errors.push(CallbackError::Failed {
                    id,
                    message: e.to_string(),
                }),
                Err(e) => {
                    let error = CallbackError::Panicked {
                        id,
                        message: e.to_string(),
                    };
                    tracing::warn!(device = %device.name(), %id, error = %error, "Update callback panicked");
                    errors.push(error);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CallbackErrors::new(errors))
        }
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
