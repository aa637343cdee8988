//! CoreFoundation run loop backend
//!
//! Pumps the current thread's CFRunLoop, drives the tick timer with a
//! CFRunLoopTimer and observes the distributed notification center.
//! Distributed notifications are delivered on the main run loop, so
//! `MacHost` must be created and pumped on the main thread.

use std::ffi::c_void;
use std::time::Duration;

use core_foundation::base::{CFIndex, CFType, CFTypeRef, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::date::CFDate;
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::number::CFNumber;
use core_foundation::runloop::{
    kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop, CFRunLoopRunResult, CFRunLoopTimer,
    CFRunLoopTimerContext, CFRunLoopTimerRef,
};
use core_foundation::string::{CFString, CFStringRef};
use serde_json::Value;
use tracing::{debug, info, trace};

use super::{EventPump, HostError, NotificationChannel, NotificationName};
use crate::events::{EventSink, LoopEvent, Payload};

type CFNotificationCenterRef = *mut c_void;

type CFNotificationCallback = extern "C" fn(
    center: CFNotificationCenterRef,
    observer: *mut c_void,
    name: CFStringRef,
    object: *const c_void,
    user_info: CFDictionaryRef,
);

/// CFNotificationSuspensionBehaviorDeliverImmediately
const DELIVER_IMMEDIATELY: CFIndex = 4;

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFNotificationCenterGetDistributedCenter() -> CFNotificationCenterRef;
    fn CFNotificationCenterAddObserver(
        center: CFNotificationCenterRef,
        observer: *const c_void,
        callback: CFNotificationCallback,
        name: CFStringRef,
        object: *const c_void,
        suspension_behavior: CFIndex,
    );
    fn CFNotificationCenterRemoveEveryObserver(
        center: CFNotificationCenterRef,
        observer: *const c_void,
    );
}

/// Upper bound for a single pump; effectively "wait forever"
const PUMP_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

struct InstalledTimer {
    timer: CFRunLoopTimer,
    // Referenced by the timer's context; must outlive the timer
    _sink: Box<EventSink>,
}

struct InstalledObserver {
    center: CFNotificationCenterRef,
    token: *const c_void,
    _name: CFString,
    _object: CFString,
    _sink: Box<EventSink>,
}

/// Host backed by the main thread's CFRunLoop
pub struct MacHost {
    run_loop: CFRunLoop,
    timer: Option<InstalledTimer>,
    observer: Option<InstalledObserver>,
}

impl MacHost {
    /// Attach to the current thread's run loop
    pub fn new() -> Self {
        Self {
            run_loop: CFRunLoop::get_current(),
            timer: None,
            observer: None,
        }
    }
}

impl Default for MacHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPump for MacHost {
    fn add_timer(&mut self, interval: Duration, sink: EventSink) -> Result<(), HostError> {
        if interval.is_zero() {
            return Err(HostError::TimerRegistration);
        }
        self.remove_timer();

        let sink = Box::new(sink);
        let mut context = CFRunLoopTimerContext {
            version: 0,
            info: &*sink as *const EventSink as *mut c_void,
            retain: None,
            release: None,
            copyDescription: None,
        };

        let seconds = interval.as_secs_f64();
        let first_fire = CFDate::now().abs_time() + seconds;
        let timer = CFRunLoopTimer::new(first_fire, seconds, 0, 0, on_timer, &mut context);

        // SAFETY: kCFRunLoopCommonModes is an immutable static CFString
        self.run_loop
            .add_timer(&timer, unsafe { kCFRunLoopCommonModes });

        self.timer = Some(InstalledTimer { timer, _sink: sink });
        Ok(())
    }

    fn remove_timer(&mut self) {
        if let Some(installed) = self.timer.take() {
            // SAFETY: see add_timer
            self.run_loop
                .remove_timer(&installed.timer, unsafe { kCFRunLoopCommonModes });
        }
    }

    fn pump_one(&mut self) -> Result<(), HostError> {
        // SAFETY: kCFRunLoopDefaultMode is an immutable static CFString
        let result = CFRunLoop::run_in_mode(unsafe { kCFRunLoopDefaultMode }, PUMP_TIMEOUT, true);
        trace!(?result, "run loop returned");
        match result {
            CFRunLoopRunResult::Finished => Err(HostError::Disconnected),
            _ => Ok(()),
        }
    }
}

impl NotificationChannel for MacHost {
    fn add_observer(&mut self, name: &NotificationName, sink: EventSink) -> Result<(), HostError> {
        self.remove_observer();

        // SAFETY: returns the process-wide distributed center, never released
        let center = unsafe { CFNotificationCenterGetDistributedCenter() };
        if center.is_null() {
            return Err(HostError::ObserverRegistration(name.clone()));
        }

        let sink = Box::new(sink);
        let token = &*sink as *const EventSink as *const c_void;
        let cf_name = CFString::new(&name.name);
        let cf_object = CFString::new(&name.object);

        // SAFETY: `token` points into `sink`, which lives until the observer
        // is removed in remove_observer.
        unsafe {
            CFNotificationCenterAddObserver(
                center,
                token,
                on_notification,
                cf_name.as_concrete_TypeRef(),
                cf_object.as_concrete_TypeRef() as *const c_void,
                DELIVER_IMMEDIATELY,
            );
        }
        info!(channel = %name, "observing distributed notifications");

        self.observer = Some(InstalledObserver {
            center,
            token,
            _name: cf_name,
            _object: cf_object,
            _sink: sink,
        });
        Ok(())
    }

    fn remove_observer(&mut self) {
        if let Some(installed) = self.observer.take() {
            // SAFETY: removes every registration made with this token before
            // the sink it points to is dropped.
            unsafe {
                CFNotificationCenterRemoveEveryObserver(installed.center, installed.token);
            }
            debug!("distributed notification observer removed");
        }
    }
}

impl Drop for MacHost {
    fn drop(&mut self) {
        self.remove_observer();
        self.remove_timer();
    }
}

extern "C" fn on_timer(_timer: CFRunLoopTimerRef, info: *mut c_void) {
    // SAFETY: `info` is the boxed sink installed in add_timer
    let sink = unsafe { &*(info as *const EventSink) };
    sink.emit(LoopEvent::Tick);
    CFRunLoop::get_current().stop();
}

extern "C" fn on_notification(
    _center: CFNotificationCenterRef,
    observer: *mut c_void,
    _name: CFStringRef,
    _object: *const c_void,
    user_info: CFDictionaryRef,
) {
    // SAFETY: `observer` is the boxed sink installed in add_observer
    let sink = unsafe { &*(observer as *const EventSink) };
    sink.emit(LoopEvent::Notification(decode_user_info(user_info)));
    CFRunLoop::get_current().stop();
}

/// Flatten a notification's userInfo dictionary into a payload
///
/// Non-string keys are skipped; values of unknown types become null.
fn decode_user_info(user_info: CFDictionaryRef) -> Payload {
    let mut payload = Payload::new();
    if user_info.is_null() {
        return payload;
    }

    // SAFETY: non-null userInfo is a valid CFDictionary for the callback's duration
    let dict: CFDictionary = unsafe { CFDictionary::wrap_under_get_rule(user_info) };
    let (keys, values) = dict.get_keys_and_values();

    for (key, value) in keys.into_iter().zip(values) {
        // SAFETY: dictionary keys and values are CF objects retained by `dict`
        let key = unsafe { CFType::wrap_under_get_rule(key as CFTypeRef) };
        let Some(key) = key.downcast::<CFString>() else {
            continue;
        };
        let value = unsafe { CFType::wrap_under_get_rule(value as CFTypeRef) };
        payload.insert(key.to_string(), to_json(&value));
    }

    payload
}

fn to_json(value: &CFType) -> Value {
    if let Some(s) = value.downcast::<CFString>() {
        return Value::String(s.to_string());
    }
    if let Some(b) = value.downcast::<CFBoolean>() {
        return Value::Bool(b.into());
    }
    if let Some(n) = value.downcast::<CFNumber>() {
        if let Some(i) = n.to_i64() {
            return Value::from(i);
        }
        if let Some(f) = n.to_f64() {
            return Value::from(f);
        }
    }
    Value::Null
}
