// SPDX-License-Identifier: GPL-3.0-only

//! Host-facing input injection.
//!
//! The host platform hands the seat high-level events; they are forwarded to
//! the sub-devices as the discrete sequence the wire protocol expects. Full
//! touch samples are split into per-point events closed by a single frame.

pub mod events;
pub mod extension;

use smithay::backend::input::{Axis, ButtonState, DeviceCapability, KeyState};
use tracing::{trace, warn};

use crate::seat::surface::{SurfaceId, SurfaceInfo, SurfaceLookup};
use crate::seat::{SeatError, SeatMultiplexer};
use crate::utils::coordinates::{GlobalPointF64, SurfaceLocalPointF64};

use self::events::{KeyEvent, TouchEvent, TouchEventKind, TouchPointState};

/// Everything the host platform can feed into the seat
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    DeviceAdded {
        name: String,
        capabilities: Vec<DeviceCapability>,
    },
    DeviceRemoved {
        name: String,
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
    /// Motion that also moves pointer focus to `surface`
    PointerMotionOnSurface {
        surface: Option<SurfaceId>,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    },
    PointerAxis {
        axis: Axis,
        delta: i32,
    },
    TouchPoint {
        id: i32,
        position: SurfaceLocalPointF64,
        state: TouchPointState,
    },
    TouchFrame,
    TouchCancel,
    Key(KeyEvent),
    /// Key event for a specific surface, delivered only through the key extension
    KeyOnSurface {
        surface: SurfaceId,
        event: KeyEvent,
    },
    Touch(TouchEvent),
}

impl SeatMultiplexer {
    /// Process an event from the host platform
    pub fn process_host_event(&mut self, surfaces: &dyn SurfaceLookup, event: HostEvent) {
        match event {
            HostEvent::DeviceAdded { name, capabilities } => {
                self.device_added(&name, capabilities);
            }

            HostEvent::DeviceRemoved { name } => {
                self.device_removed(&name);
            }

            HostEvent::PointerButton {
                button,
                state,
                local,
                global,
            } => match state {
                ButtonState::Pressed => self.send_mouse_press_event(button, local, global),
                ButtonState::Released => self.send_mouse_release_event(button, local, global),
            },

            HostEvent::PointerMotion { local, global } => {
                self.send_mouse_move_event(local, global);
            }

            HostEvent::PointerMotionOnSurface {
                surface,
                local,
                global,
            } => {
                self.send_mouse_move_event_on(surface, local, global);
            }

            HostEvent::PointerAxis { axis, delta } => {
                self.send_mouse_wheel_event(axis, delta);
            }

            HostEvent::TouchPoint {
                id,
                position,
                state,
            } => {
                self.send_touch_point_event(id, position, state);
            }

            HostEvent::TouchFrame => self.send_touch_frame_event(),

            HostEvent::TouchCancel => self.send_touch_cancel_event(),

            HostEvent::Key(event) => self.send_full_key_event(surfaces, &event),

            HostEvent::KeyOnSurface { surface, event } => {
                self.send_full_key_event_to(surface, &event);
            }

            HostEvent::Touch(event) => self.send_full_touch_event(surfaces, &event),
        }
    }

    // --- pointer ---

    pub fn send_mouse_press_event(
        &mut self,
        button: u32,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    ) {
        trace!(button, %local, %global, "Pointer press");
        self.pointer
            .send_button(button, ButtonState::Pressed, local, global);
    }

    pub fn send_mouse_release_event(
        &mut self,
        button: u32,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    ) {
        trace!(button, %local, %global, "Pointer release");
        self.pointer
            .send_button(button, ButtonState::Released, local, global);
    }

    pub fn send_mouse_move_event(&mut self, local: SurfaceLocalPointF64, global: GlobalPointF64) {
        self.pointer.send_motion(local, global);
    }

    /// Move the pointer onto `surface`: focus is updated before the motion is sent
    pub fn send_mouse_move_event_on(
        &mut self,
        surface: Option<SurfaceId>,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    ) {
        self.set_mouse_focus(surface, local, global);
        self.send_mouse_move_event(local, global);
    }

    pub fn send_mouse_wheel_event(&mut self, axis: Axis, delta: i32) {
        trace!(?axis, delta, "Pointer axis");
        self.pointer.send_axis(axis, delta);
    }

    // --- touch ---

    pub fn send_touch_point_event(
        &mut self,
        id: i32,
        position: SurfaceLocalPointF64,
        state: TouchPointState,
    ) {
        match state {
            TouchPointState::Pressed => self.touch.send_down(id, position),
            TouchPointState::Moved => self.touch.send_motion(id, position),
            TouchPointState::Released => self.touch.send_up(id),
            // clients keep the last known position of stationary points
            TouchPointState::Stationary => {}
        }
    }

    pub fn send_touch_frame_event(&mut self) {
        self.touch.send_frame();
    }

    pub fn send_touch_cancel_event(&mut self) {
        self.touch.send_cancel();
    }

    /// Deliver a touch sample to the surface under the pointer
    pub fn send_full_touch_event(&mut self, surfaces: &dyn SurfaceLookup, event: &TouchEvent) {
        let (focus, info) = match self.pointer_focus_info(surfaces) {
            Ok(found) => found,
            Err(err) => {
                warn!(%err, "Dropping touch event, fix the compositor");
                return;
            }
        };

        if event.kind == TouchEventKind::Cancel {
            self.send_touch_cancel_event();
            return;
        }

        if let Some(extension) = self.touch_extension.as_mut() {
            if extension.post_touch_event(event, focus) {
                trace!(%focus, "Touch event handled by extension");
                return;
            }
        }

        if event.points.is_empty() {
            return;
        }

        for point in &event.points {
            let local = point.position.to_surface_local(info.position);
            self.send_touch_point_event(point.id, local, point.state);
        }
        self.send_touch_frame_event();
    }

    fn pointer_focus_info(
        &self,
        surfaces: &dyn SurfaceLookup,
    ) -> Result<(SurfaceId, SurfaceInfo), SeatError> {
        self.mouse_focus(surfaces)
            .and_then(|focus| surfaces.surface(focus).map(|info| (focus, info)))
            .ok_or(SeatError::NoPointerFocus)
    }

    // --- keyboard ---

    /// Deliver a key event to the keyboard focus
    pub fn send_full_key_event(&mut self, surfaces: &dyn SurfaceLookup, event: &KeyEvent) {
        let Some(focus) = self.keyboard_focus(surfaces) else {
            warn!(err = %SeatError::NoKeyboardFocus, "Dropping key event, fix the compositor");
            return;
        };

        if let Some(extension) = self.key_extension.as_mut() {
            if extension.post_key_event(event, focus) {
                trace!(%focus, "Key event handled by extension");
                return;
            }
        }

        trace!(scan_code = event.native_scan_code, state = ?event.state, "Key");
        match event.state {
            KeyState::Pressed => self.keyboard.send_key_press(event.native_scan_code),
            KeyState::Released => self.keyboard.send_key_release(event.native_scan_code),
        }
    }

    /// Deliver a key event to `surface` through the key extension only
    pub fn send_full_key_event_to(&mut self, surface: SurfaceId, event: &KeyEvent) {
        match self.key_extension.as_mut() {
            Some(extension) => {
                extension.post_global_key_event(event, surface);
            }
            None => trace!(%surface, "No key extension, dropping targeted key event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::events::TouchPoint;
    use super::*;
    use crate::backend::recorder::{WireEvent, WireLog};
    use crate::config::SeatConfig;
    use crate::seat::surface::{ClientId, SurfaceMap};

    fn focused_seat(log: &WireLog, map: &mut SurfaceMap) -> SeatMultiplexer {
        map.insert(
            SurfaceId(1),
            SurfaceInfo {
                client: ClientId(1),
                position: GlobalPointF64::new(100.0, 200.0),
                transient_inactive: false,
            },
        );
        let mut seat = log.seat(&SeatConfig::default());
        seat.set_mouse_focus(Some(SurfaceId(1)), (0.0, 0.0).into(), (100.0, 200.0).into());
        assert!(seat.set_keyboard_focus(&*map, Some(SurfaceId(1))));
        log.clear();
        seat
    }

    fn point(id: i32, state: TouchPointState, x: f64, y: f64) -> TouchPoint {
        TouchPoint {
            id,
            state,
            position: GlobalPointF64::new(x, y),
        }
    }

    #[test]
    fn stationary_points_send_nothing() {
        let log = WireLog::default();
        let mut seat = log.seat(&SeatConfig::default());

        seat.send_touch_point_event(1, (1.0, 1.0).into(), TouchPointState::Stationary);

        assert!(log.events().is_empty());
    }

    #[test]
    fn touch_point_states_map_to_down_motion_up() {
        let log = WireLog::default();
        let mut seat = log.seat(&SeatConfig::default());

        seat.send_touch_point_event(3, (1.0, 2.0).into(), TouchPointState::Pressed);
        seat.send_touch_point_event(3, (4.0, 5.0).into(), TouchPointState::Moved);
        seat.send_touch_point_event(3, (4.0, 5.0).into(), TouchPointState::Released);

        assert_eq!(
            log.events(),
            vec![
                WireEvent::TouchDown { id: 3, position: (1.0, 2.0).into() },
                WireEvent::TouchMotion { id: 3, position: (4.0, 5.0).into() },
                WireEvent::TouchUp { id: 3 },
            ]
        );
    }

    #[test]
    fn full_touch_event_is_surface_relative_with_one_frame() {
        let log = WireLog::default();
        let mut map = SurfaceMap::new();
        let mut seat = focused_seat(&log, &mut map);

        let event = TouchEvent::new(
            TouchEventKind::Update,
            vec![
                point(1, TouchPointState::Pressed, 105.0, 205.0),
                point(2, TouchPointState::Stationary, 150.0, 250.0),
                point(3, TouchPointState::Moved, 110.5, 230.0),
            ],
        );
        seat.send_full_touch_event(&map, &event);

        assert_eq!(
            log.events(),
            vec![
                WireEvent::TouchDown { id: 1, position: (5.0, 5.0).into() },
                WireEvent::TouchMotion { id: 3, position: (10.5, 30.0).into() },
                WireEvent::TouchFrame,
            ]
        );
    }

    #[test]
    fn empty_touch_event_sends_no_frame() {
        let log = WireLog::default();
        let mut map = SurfaceMap::new();
        let mut seat = focused_seat(&log, &mut map);

        seat.send_full_touch_event(&map, &TouchEvent::new(TouchEventKind::Update, Vec::new()));

        assert!(log.events().is_empty());
    }

    #[test]
    fn touch_cancel_short_circuits() {
        let log = WireLog::default();
        let mut map = SurfaceMap::new();
        let mut seat = focused_seat(&log, &mut map);
        seat.set_touch_extension(Some(Box::new(log.touch_extension(true))));

        seat.send_full_touch_event(&map, &TouchEvent::cancel());

        assert_eq!(log.events(), vec![WireEvent::TouchCancel]);
    }

    #[test]
    fn touch_without_pointer_focus_is_dropped() {
        let log = WireLog::default();
        let map = SurfaceMap::new();
        let mut seat = log.seat(&SeatConfig::default());

        seat.send_full_touch_event(
            &map,
            &TouchEvent::new(
                TouchEventKind::Begin,
                vec![point(1, TouchPointState::Pressed, 1.0, 1.0)],
            ),
        );
        seat.send_full_touch_event(&map, &TouchEvent::cancel());

        assert!(log.events().is_empty());
    }

    #[test]
    fn touch_extension_can_take_over_decomposition() {
        let log = WireLog::default();
        let mut map = SurfaceMap::new();
        let mut seat = focused_seat(&log, &mut map);
        seat.set_touch_extension(Some(Box::new(log.touch_extension(true))));

        let event = TouchEvent::new(
            TouchEventKind::Begin,
            vec![point(1, TouchPointState::Pressed, 101.0, 201.0)],
        );
        seat.send_full_touch_event(&map, &event);

        assert_eq!(
            log.events(),
            vec![WireEvent::TouchExtension { focus: SurfaceId(1), points: 1 }]
        );
    }

    #[test]
    fn declining_touch_extension_falls_back_to_decomposition() {
        let log = WireLog::default();
        let mut map = SurfaceMap::new();
        let mut seat = focused_seat(&log, &mut map);
        seat.set_touch_extension(Some(Box::new(log.touch_extension(false))));

        let event = TouchEvent::new(
            TouchEventKind::End,
            vec![point(1, TouchPointState::Released, 101.0, 201.0)],
        );
        seat.send_full_touch_event(&map, &event);

        assert_eq!(
            log.events(),
            vec![
                WireEvent::TouchExtension { focus: SurfaceId(1), points: 1 },
                WireEvent::TouchUp { id: 1 },
                WireEvent::TouchFrame,
            ]
        );
    }

    #[test]
    fn key_event_degrades_to_scan_code() {
        let log = WireLog::default();
        let mut map = SurfaceMap::new();
        let mut seat = focused_seat(&log, &mut map);

        seat.send_full_key_event(&map, &KeyEvent::new(KeyState::Pressed, 30));
        seat.send_full_key_event(&map, &KeyEvent::new(KeyState::Released, 30));

        assert_eq!(
            log.events(),
            vec![
                WireEvent::KeyPress { scan_code: 30 },
                WireEvent::KeyRelease { scan_code: 30 },
            ]
        );
    }

    #[test]
    fn key_extension_gets_first_refusal() {
        let log = WireLog::default();
        let mut map = SurfaceMap::new();
        let mut seat = focused_seat(&log, &mut map);
        seat.set_key_extension(Some(Box::new(log.key_extension(true))));

        let event = KeyEvent::new(KeyState::Pressed, 30).with_keysym(0x61, "a");
        seat.send_full_key_event(&map, &event);

        assert_eq!(
            log.events(),
            vec![WireEvent::KeyExtension {
                surface: SurfaceId(1),
                scan_code: 30,
                keysym: 0x61,
                text: "a".to_string(),
                targeted: false,
            }]
        );
    }

    #[test]
    fn key_event_for_destroyed_focus_is_dropped() {
        let log = WireLog::default();
        let mut map = SurfaceMap::new();
        let mut seat = focused_seat(&log, &mut map);
        map.remove(SurfaceId(1));

        seat.send_full_key_event(&map, &KeyEvent::new(KeyState::Pressed, 30));

        assert!(log.events().is_empty());
    }

    #[test]
    fn targeted_key_event_needs_an_extension() {
        let log = WireLog::default();
        let map = SurfaceMap::new();
        let mut seat = log.seat(&SeatConfig::default());

        seat.process_host_event(
            &map,
            HostEvent::KeyOnSurface {
                surface: SurfaceId(5),
                event: KeyEvent::new(KeyState::Pressed, 16),
            },
        );
        assert!(log.events().is_empty());

        // the extension is used even when it declines, and the baseline path is never taken
        seat.set_key_extension(Some(Box::new(log.key_extension(false))));
        seat.send_full_key_event_to(SurfaceId(5), &KeyEvent::new(KeyState::Pressed, 16));
        assert_eq!(
            log.events(),
            vec![WireEvent::KeyExtension {
                surface: SurfaceId(5),
                scan_code: 16,
                keysym: 0,
                text: String::new(),
                targeted: true,
            }]
        );
    }

    #[test]
    fn motion_on_surface_sets_focus_before_moving() {
        let log = WireLog::default();
        let map = SurfaceMap::new();
        let mut seat = log.seat(&SeatConfig::default());

        seat.process_host_event(
            &map,
            HostEvent::PointerMotionOnSurface {
                surface: Some(SurfaceId(2)),
                local: (1.0, 1.0).into(),
                global: (11.0, 21.0).into(),
            },
        );

        assert_eq!(
            log.events(),
            vec![
                WireEvent::PointerFocus {
                    surface: Some(SurfaceId(2)),
                    local: (1.0, 1.0).into(),
                    global: (11.0, 21.0).into(),
                },
                WireEvent::TouchFocus { surface: Some(SurfaceId(2)) },
                WireEvent::PointerMotion {
                    local: (1.0, 1.0).into(),
                    global: (11.0, 21.0).into(),
                },
            ]
        );
    }

    #[test]
    fn pointer_events_are_forwarded_unchanged() {
        let log = WireLog::default();
        let map = SurfaceMap::new();
        let mut seat = log.seat(&SeatConfig::default());

        seat.process_host_event(
            &map,
            HostEvent::PointerButton {
                button: 0x110,
                state: ButtonState::Pressed,
                local: (1.0, 2.0).into(),
                global: (3.0, 4.0).into(),
            },
        );
        seat.process_host_event(&map, HostEvent::PointerAxis { axis: Axis::Vertical, delta: -120 });

        assert_eq!(
            log.events(),
            vec![
                WireEvent::PointerButton {
                    button: 0x110,
                    state: ButtonState::Pressed,
                    local: (1.0, 2.0).into(),
                    global: (3.0, 4.0).into(),
                },
                WireEvent::PointerAxis { axis: Axis::Vertical, delta: -120 },
            ]
        );
    }
}
