// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for telegram dispatch and device actions.

mod common;

use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicU32, Ordering};

use knx_device::subscription::callback_fn;
use knx_device::types::{GroupAddress, Payload};
use knx_device::{
    Device, DeviceHandler, DispatchError, Error, Result, Telegram, TelegramType,
    action_not_implemented,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hook {
    Read,
    Write,
    Response,
}

/// Device kind that records which hook handled each telegram.
///
/// Overrides read and write only, so responses take the default path.
struct RecordingDevice {
    device: Device,
    handled: Mutex<Vec<(Hook, Telegram)>>,
}

impl RecordingDevice {
    fn new() -> Self {
        Self {
            device: Device::new("TestDevice"),
            handled: Mutex::new(Vec::new()),
        }
    }

    fn handled(&self) -> Vec<(Hook, Telegram)> {
        self.handled.lock().clone()
    }
}

impl DeviceHandler for RecordingDevice {
    fn device(&self) -> &Device {
        &self.device
    }

    fn kind(&self) -> &'static str {
        "RecordingDevice"
    }

    async fn process_group_read(&self, telegram: &Telegram) -> Result<()> {
        self.handled.lock().push((Hook::Read, telegram.clone()));
        Ok(())
    }

    async fn process_group_write(&self, telegram: &Telegram) -> Result<()> {
        self.handled.lock().push((Hook::Write, telegram.clone()));
        Ok(())
    }
}

/// Device kind that intercepts responses itself.
struct ResponseDevice(RecordingDevice);

impl DeviceHandler for ResponseDevice {
    fn device(&self) -> &Device {
        self.0.device()
    }

    fn kind(&self) -> &'static str {
        "ResponseDevice"
    }

    async fn process_group_read(&self, telegram: &Telegram) -> Result<()> {
        self.0.process_group_read(telegram).await
    }

    async fn process_group_write(&self, telegram: &Telegram) -> Result<()> {
        self.0.process_group_write(telegram).await
    }

    async fn process_group_response(&self, telegram: &Telegram) -> Result<()> {
        self.0.handled.lock().push((Hook::Response, telegram.clone()));
        Ok(())
    }
}

/// Binary switch that notifies observers when its state flips.
struct Switch {
    device: Device,
    address: GroupAddress,
    state: Mutex<bool>,
}

impl DeviceHandler for Switch {
    fn device(&self) -> &Device {
        &self.device
    }

    fn kind(&self) -> &'static str {
        "Switch"
    }

    fn has_group_address(&self, address: &GroupAddress) -> bool {
        *address == self.address
    }

    fn state_addresses(&self) -> Vec<GroupAddress> {
        vec![self.address]
    }

    async fn process_group_write(&self, telegram: &Telegram) -> Result<()> {
        let on = telegram.payload().and_then(Payload::as_binary) == Some(1);
        let previous = std::mem::replace(&mut *self.state.lock(), on);
        if previous != on {
            self.after_update().await?;
        }
        Ok(())
    }

    async fn do_action(&self, action: &str) -> Result<()> {
        match action {
            "on" => *self.state.lock() = true,
            "off" => *self.state.lock() = false,
            _ => {
                action_not_implemented(self.kind(), action);
                return Ok(());
            }
        }
        self.after_update().await
    }
}

fn address() -> GroupAddress {
    GroupAddress::new(1, 2, 1).unwrap()
}

fn telegram(telegram_type: TelegramType) -> Telegram {
    Telegram::new(
        address(),
        Some(Payload::array([0x01, 0x02])),
        telegram_type,
    )
}

/// Switch with one counting update callback.
fn switch() -> (Switch, Arc<AtomicU32>) {
    let switch = Switch {
        device: Device::new("Kitchen.Light"),
        address: address(),
        state: Mutex::new(false),
    };
    let updates = Arc::new(AtomicU32::new(0));
    let updates_clone = Arc::clone(&updates);
    switch
        .device()
        .register_device_updated_cb(callback_fn(move |_device| {
            let updates = Arc::clone(&updates_clone);
            async move {
                updates.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }))
        .unwrap();
    (switch, updates)
}

// ============================================================================
// Routing
// ============================================================================

mod routing {
    use super::*;

    #[tokio::test]
    async fn read_routes_to_group_read() {
        let device = RecordingDevice::new();
        let telegram = telegram(TelegramType::GroupRead);

        device.process(&telegram).await.unwrap();
        assert_eq!(device.handled(), vec![(Hook::Read, telegram)]);
    }

    #[tokio::test]
    async fn write_routes_to_group_write() {
        let device = RecordingDevice::new();
        let telegram = telegram(TelegramType::GroupWrite);

        device.process(&telegram).await.unwrap();
        assert_eq!(device.handled(), vec![(Hook::Write, telegram)]);
    }

    #[tokio::test]
    async fn response_routes_to_group_response() {
        let device = ResponseDevice(RecordingDevice::new());
        let telegram = telegram(TelegramType::GroupResponse);

        device.process(&telegram).await.unwrap();
        assert_eq!(device.0.handled(), vec![(Hook::Response, telegram)]);
    }

    #[tokio::test]
    async fn default_response_forwards_to_group_write() {
        let device = RecordingDevice::new();
        let telegram = telegram(TelegramType::GroupResponse);

        device.process(&telegram).await.unwrap();
        assert_eq!(device.handled(), vec![(Hook::Write, telegram)]);
    }

    #[tokio::test]
    async fn default_response_forwards_default_telegram() {
        let device = RecordingDevice::new();

        device.process_group_response(&Telegram::default()).await.unwrap();
        assert_eq!(device.handled(), vec![(Hook::Write, Telegram::default())]);
    }

    #[tokio::test]
    async fn unknown_type_is_surfaced() {
        let device = RecordingDevice::new();
        let telegram = telegram(TelegramType::from_apci(0x2C0));

        let result = device.process(&telegram).await;

        assert!(matches!(
            result,
            Err(Error::Dispatch(DispatchError::UnknownTelegramType { apci: 0x2C0 }))
        ));
        assert!(device.handled().is_empty());
    }

    #[tokio::test]
    async fn device_survives_dispatch_error() {
        let device = RecordingDevice::new();

        assert!(device.process(&telegram(TelegramType::Unknown(0x3FF))).await.is_err());
        device.process(&telegram(TelegramType::GroupWrite)).await.unwrap();

        assert_eq!(device.handled().len(), 1);
    }
}

// ============================================================================
// Handlers and notification
// ============================================================================

mod notification {
    use super::*;

    #[tokio::test]
    async fn base_dispatch_does_not_notify() {
        let device = Device::new("TestDevice");
        let updates = Arc::new(AtomicU32::new(0));
        let updates_clone = Arc::clone(&updates);
        device
            .register_device_updated_cb(callback_fn(move |_device| {
                let updates = Arc::clone(&updates_clone);
                async move {
                    updates.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }))
            .unwrap();

        for telegram_type in [
            TelegramType::GroupRead,
            TelegramType::GroupWrite,
            TelegramType::GroupResponse,
        ] {
            device.process(&telegram(telegram_type)).await.unwrap();
        }

        assert_eq!(updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_notifies_on_state_change() {
        let (switch, updates) = switch();
        let on = Telegram::write(address(), Payload::from(true));

        switch.process(&on).await.unwrap();
        assert_eq!(updates.load(Ordering::SeqCst), 1);

        // Same value again, no change
        switch.process(&on).await.unwrap();
        assert_eq!(updates.load(Ordering::SeqCst), 1);

        // A response is an authoritative write
        switch
            .process(&Telegram::response(address(), Payload::from(false)))
            .await
            .unwrap();
        assert_eq!(updates.load(Ordering::SeqCst), 2);
        assert!(!*switch.state.lock());
    }

    #[tokio::test]
    async fn read_request_leaves_state_alone() {
        let (switch, updates) = switch();

        switch.process(&Telegram::read(address())).await.unwrap();

        assert_eq!(updates.load(Ordering::SeqCst), 0);
        assert!(!*switch.state.lock());
    }

    #[tokio::test]
    async fn supported_action_notifies() {
        let (switch, updates) = switch();

        switch.do_action("on").await.unwrap();

        assert!(*switch.state.lock());
        assert_eq!(updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn observer_reads_concrete_state() {
        let (switch, _) = switch();
        let switch = Arc::new(switch);
        let seen = Arc::new(Mutex::new(Vec::new()));

        // The argument is the base handle; the concrete kind is captured
        let weak: Weak<Switch> = Arc::downgrade(&switch);
        let seen_clone = Arc::clone(&seen);
        switch
            .device()
            .register_device_updated_cb(callback_fn(move |device: Device| {
                let switch = weak.upgrade();
                let seen = Arc::clone(&seen_clone);
                async move {
                    if let Some(switch) = switch {
                        assert!(device.same_device(switch.device()));
                        let state = *switch.state.lock();
                        seen.lock().push(state);
                    }
                    Ok(())
                }
            }))
            .unwrap();

        switch
            .process(&Telegram::write(address(), Payload::from(true)))
            .await
            .unwrap();
        switch
            .process(&Telegram::write(address(), Payload::from(false)))
            .await
            .unwrap();

        assert_eq!(*seen.lock(), vec![true, false]);
    }

    #[test]
    fn address_hooks() {
        let (switch, _) = switch();

        assert!(switch.has_group_address(&address()));
        assert!(!switch.has_group_address(&GroupAddress::new(1, 2, 2).unwrap()));
        assert_eq!(switch.state_addresses(), vec![address()]);
        assert_eq!(switch.name(), "Kitchen.Light");
    }
}

// ============================================================================
// Unimplemented actions
// ============================================================================

mod actions {
    use super::*;
    use crate::common::capture_logs;

    #[tokio::test]
    async fn unknown_action_is_logged_not_failed() {
        let (logs, _guard) = capture_logs();
        let device = Device::new("TestDevice");

        device.do_action("xx").await.unwrap();

        let output = logs.contents();
        let records: Vec<_> = output.lines().filter(|line| line.contains("INFO")).collect();
        assert_eq!(records.len(), 1, "unexpected log output: {output}");
        assert!(records[0].contains("Do not implemented action 'xx' for Device"));
        assert_eq!(device.name(), "TestDevice");
        assert!(device.callbacks().is_empty());
    }

    #[tokio::test]
    async fn unknown_action_reports_declared_kind() {
        let (logs, _guard) = capture_logs();
        let device = RecordingDevice::new();

        device.do_action("dim up").await.unwrap();

        assert!(
            logs.contents()
                .contains("Do not implemented action 'dim up' for RecordingDevice")
        );
        assert!(device.handled().is_empty());
    }

    #[tokio::test]
    async fn overridden_action_falls_back_to_logged_noop() {
        let (logs, _guard) = capture_logs();
        let (switch, updates) = switch();

        switch.do_action("blink").await.unwrap();

        let output = logs.contents();
        let records: Vec<_> = output.lines().filter(|line| line.contains("INFO")).collect();
        assert_eq!(records.len(), 1, "unexpected log output: {output}");
        assert!(records[0].contains("Do not implemented action 'blink' for Switch"));
        assert!(!*switch.state.lock());
        assert_eq!(updates.load(Ordering::SeqCst), 0);
    }
}
