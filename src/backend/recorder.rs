// SPDX-License-Identifier: GPL-3.0-only

//! A backend that records every wire-level event instead of sending it.
//!
//! All recording objects created from one [`WireLog`] append to the same
//! ordered log, so cross-device ordering can be inspected afterwards. Used by
//! the replay tool and as the stand-in for real protocol objects in tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smithay::backend::input::{Axis, ButtonState};
use smithay::reexports::wayland_server::protocol::wl_seat::Capability;
use tracing::trace;

use crate::config::SeatConfig;
use crate::input::events::{KeyEvent, TouchEvent};
use crate::input::extension::{KeyExtension, TouchExtension};
use crate::seat::SeatMultiplexer;
use crate::seat::data_device::{DataDevice, DataDeviceManager};
use crate::seat::devices::{KeyboardDevice, PointerDevice, SeatResource, TouchDevice};
use crate::seat::surface::{ClientId, SurfaceId};
use crate::utils::coordinates::{GlobalPointF64, SurfaceLocalPointF64};

/// An event as it would have gone out on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum WireEvent {
    Capabilities {
        client: ClientId,
        capabilities: Capability,
    },
    SeatName {
        client: ClientId,
        name: String,
    },
    PointerBound {
        client: ClientId,
        id: u32,
    },
    KeyboardBound {
        client: ClientId,
        id: u32,
    },
    TouchBound {
        client: ClientId,
        id: u32,
    },
    PointerFocus {
        surface: Option<SurfaceId>,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    },
    PointerButton {
        button: u32,
        state: ButtonState,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    },
    PointerMotion {
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    },
    PointerAxis {
        axis: Axis,
        delta: i32,
    },
    KeyboardFocus {
        surface: Option<SurfaceId>,
    },
    KeyPress {
        scan_code: u32,
    },
    KeyRelease {
        scan_code: u32,
    },
    TouchFocus {
        surface: Option<SurfaceId>,
    },
    TouchDown {
        id: i32,
        position: SurfaceLocalPointF64,
    },
    TouchMotion {
        id: i32,
        position: SurfaceLocalPointF64,
    },
    TouchUp {
        id: i32,
    },
    TouchFrame,
    TouchCancel,
    DataDeviceCreated {
        client: ClientId,
        id: u32,
    },
    SelectionFocus {
        client: ClientId,
        id: u32,
    },
    DataDeviceDestroyed {
        client: ClientId,
        id: u32,
    },
    KeyExtension {
        surface: SurfaceId,
        scan_code: u32,
        keysym: u32,
        text: String,
        targeted: bool,
    },
    TouchExtension {
        focus: SurfaceId,
        points: usize,
    },
}

fn surface_name(surface: &Option<SurfaceId>) -> String {
    surface.map_or_else(|| "none".to_string(), |s| s.to_string())
}

impl fmt::Display for WireEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capabilities {
                client,
                capabilities,
            } => write!(f, "{client} wl_seat.capabilities {capabilities:?}"),
            Self::SeatName { client, name } => write!(f, "{client} wl_seat.name {name}"),
            Self::PointerBound { client, id } => write!(f, "{client} wl_pointer@{id} bound"),
            Self::KeyboardBound { client, id } => write!(f, "{client} wl_keyboard@{id} bound"),
            Self::TouchBound { client, id } => write!(f, "{client} wl_touch@{id} bound"),
            Self::PointerFocus {
                surface,
                local,
                global,
            } => write!(
                f,
                "wl_pointer focus {} local={local} global={global}",
                surface_name(surface)
            ),
            Self::PointerButton {
                button,
                state,
                local,
                global,
            } => write!(
                f,
                "wl_pointer.button {button:#x} {state:?} local={local} global={global}"
            ),
            Self::PointerMotion { local, global } => {
                write!(f, "wl_pointer.motion local={local} global={global}")
            }
            Self::PointerAxis { axis, delta } => write!(f, "wl_pointer.axis {axis:?} {delta}"),
            Self::KeyboardFocus { surface } => {
                write!(f, "wl_keyboard focus {}", surface_name(surface))
            }
            Self::KeyPress { scan_code } => write!(f, "wl_keyboard.key {scan_code} pressed"),
            Self::KeyRelease { scan_code } => write!(f, "wl_keyboard.key {scan_code} released"),
            Self::TouchFocus { surface } => write!(f, "wl_touch focus {}", surface_name(surface)),
            Self::TouchDown { id, position } => write!(f, "wl_touch.down {id} {position}"),
            Self::TouchMotion { id, position } => write!(f, "wl_touch.motion {id} {position}"),
            Self::TouchUp { id } => write!(f, "wl_touch.up {id}"),
            Self::TouchFrame => write!(f, "wl_touch.frame"),
            Self::TouchCancel => write!(f, "wl_touch.cancel"),
            Self::DataDeviceCreated { client, id } => {
                write!(f, "{client} wl_data_device@{id} created")
            }
            Self::SelectionFocus { client, id } => {
                write!(f, "{client} wl_data_device@{id} selection focus")
            }
            Self::DataDeviceDestroyed { client, id } => {
                write!(f, "{client} wl_data_device@{id} destroyed")
            }
            Self::KeyExtension {
                surface,
                scan_code,
                keysym,
                text,
                targeted,
            } => write!(
                f,
                "key extension {surface} {scan_code} keysym={keysym:#x} text={text:?} targeted={targeted}"
            ),
            Self::TouchExtension { focus, points } => {
                write!(f, "touch extension {focus} points={points}")
            }
        }
    }
}

/// Shared, ordered record of wire events
#[derive(Debug, Clone, Default)]
pub struct WireLog {
    events: Rc<RefCell<Vec<WireEvent>>>,
}

impl WireLog {
    pub fn push(&self, event: WireEvent) {
        trace!(%event, "wire");
        self.events.borrow_mut().push(event);
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<WireEvent> {
        self.events.borrow().clone()
    }

    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<WireEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// A seat whose sub-devices all record into this log
    pub fn seat(&self, config: &SeatConfig) -> SeatMultiplexer {
        SeatMultiplexer::new(
            config,
            Box::new(RecordingPointer::new(self.clone())),
            Box::new(RecordingKeyboard::new(self.clone())),
            Box::new(RecordingTouch::new(self.clone())),
        )
    }

    pub fn data_device(&self, client: ClientId, id: u32) -> Box<dyn DataDevice> {
        Box::new(RecordingDataDevice {
            log: self.clone(),
            client,
            id,
        })
    }

    pub fn data_device_manager(&self) -> RecordingDataDeviceManager {
        RecordingDataDeviceManager { log: self.clone() }
    }

    pub fn seat_resource(&self, client: ClientId, version: u32) -> RecordingSeatResource {
        RecordingSeatResource {
            log: self.clone(),
            client,
            version,
        }
    }

    /// A key extension that reports events as handled when `handles` is set
    pub fn key_extension(&self, handles: bool) -> RecordingKeyExtension {
        RecordingKeyExtension {
            log: self.clone(),
            handles,
        }
    }

    /// A touch extension that reports events as handled when `handles` is set
    pub fn touch_extension(&self, handles: bool) -> RecordingTouchExtension {
        RecordingTouchExtension {
            log: self.clone(),
            handles,
        }
    }
}

pub struct RecordingPointer {
    log: WireLog,
    focus: Option<SurfaceId>,
}

impl RecordingPointer {
    pub fn new(log: WireLog) -> Self {
        Self { log, focus: None }
    }
}

impl PointerDevice for RecordingPointer {
    fn add(&mut self, client: ClientId, id: u32) {
        self.log.push(WireEvent::PointerBound { client, id });
    }

    fn set_mouse_focus(
        &mut self,
        surface: Option<SurfaceId>,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    ) {
        self.focus = surface;
        self.log.push(WireEvent::PointerFocus {
            surface,
            local,
            global,
        });
    }

    fn focus_surface(&self) -> Option<SurfaceId> {
        self.focus
    }

    fn send_button(
        &mut self,
        button: u32,
        state: ButtonState,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    ) {
        self.log.push(WireEvent::PointerButton {
            button,
            state,
            local,
            global,
        });
    }

    fn send_motion(&mut self, local: SurfaceLocalPointF64, global: GlobalPointF64) {
        self.log.push(WireEvent::PointerMotion { local, global });
    }

    fn send_axis(&mut self, axis: Axis, delta: i32) {
        self.log.push(WireEvent::PointerAxis { axis, delta });
    }
}

pub struct RecordingKeyboard {
    log: WireLog,
    focus: Option<SurfaceId>,
}

impl RecordingKeyboard {
    pub fn new(log: WireLog) -> Self {
        Self { log, focus: None }
    }
}

impl KeyboardDevice for RecordingKeyboard {
    fn add(&mut self, client: ClientId, id: u32) {
        self.log.push(WireEvent::KeyboardBound { client, id });
    }

    fn set_focus(&mut self, surface: Option<SurfaceId>) {
        self.focus = surface;
        self.log.push(WireEvent::KeyboardFocus { surface });
    }

    fn focus(&self) -> Option<SurfaceId> {
        self.focus
    }

    fn send_key_press(&mut self, native_scan_code: u32) {
        self.log.push(WireEvent::KeyPress {
            scan_code: native_scan_code,
        });
    }

    fn send_key_release(&mut self, native_scan_code: u32) {
        self.log.push(WireEvent::KeyRelease {
            scan_code: native_scan_code,
        });
    }
}

pub struct RecordingTouch {
    log: WireLog,
    focus: Option<SurfaceId>,
}

impl RecordingTouch {
    pub fn new(log: WireLog) -> Self {
        Self { log, focus: None }
    }
}

impl TouchDevice for RecordingTouch {
    fn add(&mut self, client: ClientId, id: u32) {
        self.log.push(WireEvent::TouchBound { client, id });
    }

    fn set_focus(&mut self, surface: Option<SurfaceId>) {
        self.focus = surface;
        self.log.push(WireEvent::TouchFocus { surface });
    }

    fn focus(&self) -> Option<SurfaceId> {
        self.focus
    }

    fn send_down(&mut self, id: i32, position: SurfaceLocalPointF64) {
        self.log.push(WireEvent::TouchDown { id, position });
    }

    fn send_motion(&mut self, id: i32, position: SurfaceLocalPointF64) {
        self.log.push(WireEvent::TouchMotion { id, position });
    }

    fn send_up(&mut self, id: i32) {
        self.log.push(WireEvent::TouchUp { id });
    }

    fn send_frame(&mut self) {
        self.log.push(WireEvent::TouchFrame);
    }

    fn send_cancel(&mut self) {
        self.log.push(WireEvent::TouchCancel);
    }
}

pub struct RecordingDataDevice {
    log: WireLog,
    client: ClientId,
    id: u32,
}

impl DataDevice for RecordingDataDevice {
    fn client(&self) -> ClientId {
        self.client
    }

    fn resource_id(&self) -> u32 {
        self.id
    }

    fn send_selection_focus(&mut self) {
        self.log.push(WireEvent::SelectionFocus {
            client: self.client,
            id: self.id,
        });
    }

    fn destroy(self: Box<Self>) {
        self.log.push(WireEvent::DataDeviceDestroyed {
            client: self.client,
            id: self.id,
        });
    }
}

pub struct RecordingDataDeviceManager {
    log: WireLog,
}

impl DataDeviceManager for RecordingDataDeviceManager {
    fn create_data_device(&mut self, client: ClientId, id: u32) -> Box<dyn DataDevice> {
        self.log.push(WireEvent::DataDeviceCreated { client, id });
        self.log.data_device(client, id)
    }
}

pub struct RecordingSeatResource {
    log: WireLog,
    client: ClientId,
    version: u32,
}

impl SeatResource for RecordingSeatResource {
    fn client(&self) -> ClientId {
        self.client
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn send_capabilities(&mut self, capabilities: Capability) {
        self.log.push(WireEvent::Capabilities {
            client: self.client,
            capabilities,
        });
    }

    fn send_name(&mut self, name: &str) {
        self.log.push(WireEvent::SeatName {
            client: self.client,
            name: name.to_string(),
        });
    }
}

pub struct RecordingKeyExtension {
    log: WireLog,
    handles: bool,
}

impl RecordingKeyExtension {
    fn record(&self, event: &KeyEvent, surface: SurfaceId, targeted: bool) -> bool {
        self.log.push(WireEvent::KeyExtension {
            surface,
            scan_code: event.native_scan_code,
            keysym: event.keysym,
            text: event.text.clone(),
            targeted,
        });
        self.handles
    }
}

impl KeyExtension for RecordingKeyExtension {
    fn post_key_event(&mut self, event: &KeyEvent, focus: SurfaceId) -> bool {
        self.record(event, focus, false)
    }

    fn post_global_key_event(&mut self, event: &KeyEvent, surface: SurfaceId) -> bool {
        self.record(event, surface, true)
    }
}

pub struct RecordingTouchExtension {
    log: WireLog,
    handles: bool,
}

impl TouchExtension for RecordingTouchExtension {
    fn post_touch_event(&mut self, event: &TouchEvent, focus: SurfaceId) -> bool {
        self.log.push(WireEvent::TouchExtension {
            focus,
            points: event.points.len(),
        });
        self.handles
    }
}
