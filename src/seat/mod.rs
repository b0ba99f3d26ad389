// SPDX-License-Identifier: GPL-3.0-only

//! The logical seat shared by all clients.
//!
//! [`SeatMultiplexer`] owns one pointer, one keyboard and one touch sub-device
//! plus the per-client data device registry. The dispatch layer calls the
//! binding handlers here; the host feeds input through the injection API in
//! [`crate::input`].

pub mod data_device;
pub mod devices;
pub mod surface;

use indexmap::IndexMap;
use smithay::backend::input::DeviceCapability;
use smithay::reexports::wayland_server::protocol::wl_seat::Capability;
use tracing::{debug, info, trace, warn};

use crate::config::SeatConfig;
use crate::input::extension::{KeyExtension, TouchExtension};
use crate::utils::coordinates::{GlobalPointF64, SurfaceLocalPointF64};

use self::data_device::{DataDevice, DataDeviceManager, DataDeviceRegistry};
use self::devices::{KeyboardDevice, PointerDevice, SeatResource, TouchDevice};
use self::surface::{ClientId, SurfaceId, SurfaceLookup};

/// `wl_seat.name` was added in version 2
const SEAT_NAME_SINCE: u32 = 2;

/// Why the seat refused to act on a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeatError {
    #[error("{0} is an inactive transient and cannot take keyboard focus")]
    TransientInactive(SurfaceId),
    #[error("{0} is not a live surface")]
    UnknownSurface(SurfaceId),
    #[error("Cannot send key event, no keyboard focus")]
    NoKeyboardFocus,
    #[error("Cannot send touch event, no pointer focus")]
    NoPointerFocus,
}

pub struct SeatMultiplexer {
    name: String,
    pub(crate) pointer: Box<dyn PointerDevice>,
    pub(crate) keyboard: Box<dyn KeyboardDevice>,
    pub(crate) touch: Box<dyn TouchDevice>,
    data_devices: DataDeviceRegistry,
    /// Host input devices by name, with whether each one is touch capable
    input_devices: IndexMap<String, bool>,
    pub(crate) key_extension: Option<Box<dyn KeyExtension>>,
    pub(crate) touch_extension: Option<Box<dyn TouchExtension>>,
}

impl SeatMultiplexer {
    pub fn new(
        config: &SeatConfig,
        pointer: Box<dyn PointerDevice>,
        keyboard: Box<dyn KeyboardDevice>,
        touch: Box<dyn TouchDevice>,
    ) -> Self {
        info!(name = %config.seat_name, "Creating seat");
        Self {
            name: config.seat_name.clone(),
            pointer,
            keyboard,
            touch,
            data_devices: DataDeviceRegistry::new(),
            input_devices: IndexMap::new(),
            key_extension: None,
            touch_extension: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pointer(&self) -> &dyn PointerDevice {
        self.pointer.as_ref()
    }

    pub fn keyboard(&self) -> &dyn KeyboardDevice {
        self.keyboard.as_ref()
    }

    pub fn touch(&self) -> &dyn TouchDevice {
        self.touch.as_ref()
    }

    /// Install or remove the extension offered full key events first
    pub fn set_key_extension(&mut self, extension: Option<Box<dyn KeyExtension>>) {
        self.key_extension = extension;
    }

    /// Install or remove the extension offered full touch events first
    pub fn set_touch_extension(&mut self, extension: Option<Box<dyn TouchExtension>>) {
        self.touch_extension = extension;
    }

    // --- host input sources ---

    pub fn device_added(
        &mut self,
        name: &str,
        capabilities: impl IntoIterator<Item = DeviceCapability>,
    ) {
        let touch = capabilities
            .into_iter()
            .any(|cap| matches!(cap, DeviceCapability::Touch));
        info!(name, touch, "Input device added");
        self.input_devices.insert(name.to_string(), touch);
    }

    pub fn device_removed(&mut self, name: &str) {
        if self.input_devices.shift_remove(name).is_some() {
            info!(name, "Input device removed");
        } else {
            debug!(name, "Removal of unknown input device ignored");
        }
    }

    /// Number of known touch-capable input devices
    pub fn touch_source_count(&self) -> usize {
        self.input_devices.values().filter(|touch| **touch).count()
    }

    /// Capabilities advertised to a client binding right now
    pub fn capabilities(&self) -> Capability {
        let mut capabilities = Capability::Pointer | Capability::Keyboard;
        if self.touch_source_count() > 0 {
            capabilities |= Capability::Touch;
        }
        capabilities
    }

    // --- wl_seat requests ---

    /// A client bound the seat global
    pub fn bind(&mut self, resource: &mut dyn SeatResource) {
        let capabilities = self.capabilities();
        debug!(client = %resource.client(), ?capabilities, "Seat bound");
        resource.send_capabilities(capabilities);
        if resource.version() >= SEAT_NAME_SINCE {
            resource.send_name(&self.name);
        }
    }

    pub fn get_pointer(&mut self, client: ClientId, id: u32) {
        trace!(%client, id, "get_pointer");
        self.pointer.add(client, id);
    }

    pub fn get_keyboard(&mut self, client: ClientId, id: u32) {
        trace!(%client, id, "get_keyboard");
        self.keyboard.add(client, id);
    }

    pub fn get_touch(&mut self, client: ClientId, id: u32) {
        trace!(%client, id, "get_touch");
        self.touch.add(client, id);
    }

    /// A client's seat resource went away
    pub fn destroy_resource(&mut self, client: ClientId) {
        debug!(%client, "Seat resource destroyed");
        self.cleanup_data_device_for_client(client, true);
    }

    // --- focus ---

    /// Give keyboard focus to `surface`, or clear it with `None`.
    ///
    /// Returns false and leaves focus alone for inactive transients and for
    /// surfaces the lookup no longer knows.
    pub fn set_keyboard_focus(
        &mut self,
        surfaces: &dyn SurfaceLookup,
        surface: Option<SurfaceId>,
    ) -> bool {
        match self.check_keyboard_focus(surfaces, surface) {
            Ok(client) => {
                if let Some(client) = client {
                    self.send_selection_focus(client);
                }
                debug!(?surface, "Keyboard focus changed");
                self.keyboard.set_focus(surface);
                true
            }
            Err(err) => {
                warn!(%err, "Keyboard focus change rejected");
                false
            }
        }
    }

    /// Owning client of the new focus target, if there is one
    fn check_keyboard_focus(
        &self,
        surfaces: &dyn SurfaceLookup,
        surface: Option<SurfaceId>,
    ) -> Result<Option<ClientId>, SeatError> {
        let Some(id) = surface else {
            return Ok(None);
        };
        let info = surfaces.surface(id).ok_or(SeatError::UnknownSurface(id))?;
        if info.transient_inactive {
            return Err(SeatError::TransientInactive(id));
        }
        Ok(Some(info.client))
    }

    /// Current keyboard focus, if it is still a live surface
    pub fn keyboard_focus(&self, surfaces: &dyn SurfaceLookup) -> Option<SurfaceId> {
        self.keyboard.focus().filter(|id| surfaces.contains(*id))
    }

    /// Point the pointer at `surface`. Touch focus always follows.
    pub fn set_mouse_focus(
        &mut self,
        surface: Option<SurfaceId>,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    ) {
        trace!(?surface, %local, %global, "Pointer focus");
        self.pointer.set_mouse_focus(surface, local, global);
        // wl_touch has no focus request of its own
        self.touch.set_focus(surface);
    }

    /// Current pointer focus, if it is still a live surface
    pub fn mouse_focus(&self, surfaces: &dyn SurfaceLookup) -> Option<SurfaceId> {
        self.pointer.focus_surface().filter(|id| surfaces.contains(*id))
    }

    // --- data devices ---

    /// A client asked the data device manager for a data device on this seat.
    ///
    /// Any previous device of the client is dropped from the registry without
    /// being destroyed: the new request already invalidated it.
    pub fn client_requested_data_device(
        &mut self,
        manager: &mut dyn DataDeviceManager,
        client: ClientId,
        id: u32,
    ) {
        if let Some(old) = self.cleanup_data_device_for_client(client, false) {
            debug!(%client, resource = old.resource_id(), "Replacing data device");
        }
        let device = manager.create_data_device(client, id);
        self.data_devices.insert(client, device);
    }

    pub fn cleanup_data_device_for_client(
        &mut self,
        client: ClientId,
        destroy: bool,
    ) -> Option<Box<dyn DataDevice>> {
        self.data_devices.cleanup_for_client(client, destroy)
    }

    pub fn data_device(&self, client: ClientId) -> Option<&dyn DataDevice> {
        self.data_devices.get(client)
    }

    pub fn data_device_count(&self) -> usize {
        self.data_devices.len()
    }

    fn send_selection_focus(&mut self, client: ClientId) {
        if let Some(device) = self.data_devices.get_mut(client) {
            trace!(%client, "Selection focus");
            device.send_selection_focus();
        }
    }
}

impl Drop for SeatMultiplexer {
    fn drop(&mut self) {
        self.data_devices.destroy_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recorder::{WireEvent, WireLog};
    use crate::seat::surface::{SurfaceInfo, SurfaceMap};

    fn seat(log: &WireLog) -> SeatMultiplexer {
        log.seat(&SeatConfig::default())
    }

    fn surface(map: &mut SurfaceMap, id: u32, client: u32) -> SurfaceId {
        map.insert(
            SurfaceId(id),
            SurfaceInfo {
                client: ClientId(client),
                position: GlobalPointF64::new(0.0, 0.0),
                transient_inactive: false,
            },
        );
        SurfaceId(id)
    }

    #[test]
    fn capabilities_follow_touch_sources() {
        let log = WireLog::default();
        let mut seat = seat(&log);
        assert_eq!(seat.capabilities(), Capability::Pointer | Capability::Keyboard);

        seat.device_added("kbd", [DeviceCapability::Keyboard]);
        assert!(!seat.capabilities().contains(Capability::Touch));

        seat.device_added("panel", [DeviceCapability::Touch, DeviceCapability::Pointer]);
        assert!(seat.capabilities().contains(Capability::Touch));
        assert_eq!(seat.touch_source_count(), 1);

        seat.device_removed("panel");
        assert!(!seat.capabilities().contains(Capability::Touch));
        // unknown devices are ignored
        seat.device_removed("panel");
        assert_eq!(seat.touch_source_count(), 0);
    }

    #[test]
    fn bind_sends_name_only_from_version_two() {
        let log = WireLog::default();
        let mut seat = seat(&log);

        seat.bind(&mut log.seat_resource(ClientId(1), 1));
        seat.bind(&mut log.seat_resource(ClientId(2), 5));

        assert_eq!(
            log.events(),
            vec![
                WireEvent::Capabilities {
                    client: ClientId(1),
                    capabilities: Capability::Pointer | Capability::Keyboard,
                },
                WireEvent::Capabilities {
                    client: ClientId(2),
                    capabilities: Capability::Pointer | Capability::Keyboard,
                },
                WireEvent::SeatName {
                    client: ClientId(2),
                    name: "seat0".to_string(),
                },
            ]
        );
    }

    #[test]
    fn get_requests_register_with_sub_devices() {
        let log = WireLog::default();
        let mut seat = seat(&log);

        seat.get_pointer(ClientId(1), 3);
        seat.get_keyboard(ClientId(1), 4);
        seat.get_touch(ClientId(2), 5);

        assert_eq!(
            log.events(),
            vec![
                WireEvent::PointerBound { client: ClientId(1), id: 3 },
                WireEvent::KeyboardBound { client: ClientId(1), id: 4 },
                WireEvent::TouchBound { client: ClientId(2), id: 5 },
            ]
        );
    }

    #[test]
    fn transient_inactive_surface_cannot_take_keyboard_focus() {
        let log = WireLog::default();
        let mut seat = seat(&log);
        let mut map = SurfaceMap::new();
        let s1 = surface(&mut map, 1, 1);
        let s2 = surface(&mut map, 2, 1);
        map.set_transient_inactive(s2, true);

        assert!(seat.set_keyboard_focus(&map, Some(s1)));
        assert!(!seat.set_keyboard_focus(&map, Some(s2)));
        assert_eq!(seat.keyboard_focus(&map), Some(s1));

        assert!(seat.set_keyboard_focus(&map, None));
        assert_eq!(seat.keyboard_focus(&map), None);
    }

    #[test]
    fn unknown_surface_cannot_take_keyboard_focus() {
        let log = WireLog::default();
        let mut seat = seat(&log);
        let map = SurfaceMap::new();

        assert!(!seat.set_keyboard_focus(&map, Some(SurfaceId(42))));
        assert!(log.events().is_empty());
    }

    #[test]
    fn focus_accessors_revalidate_surfaces() {
        let log = WireLog::default();
        let mut seat = seat(&log);
        let mut map = SurfaceMap::new();
        let s1 = surface(&mut map, 1, 1);

        assert!(seat.set_keyboard_focus(&map, Some(s1)));
        seat.set_mouse_focus(Some(s1), (1.0, 1.0).into(), (1.0, 1.0).into());
        assert_eq!(seat.mouse_focus(&map), Some(s1));

        map.remove(s1);
        assert_eq!(seat.keyboard_focus(&map), None);
        assert_eq!(seat.mouse_focus(&map), None);
    }

    #[test]
    fn touch_focus_tracks_pointer_focus() {
        let log = WireLog::default();
        let mut seat = seat(&log);
        let mut map = SurfaceMap::new();
        let s1 = surface(&mut map, 1, 1);

        seat.set_mouse_focus(Some(s1), (2.0, 3.0).into(), (12.0, 13.0).into());
        assert_eq!(seat.mouse_focus(&map), Some(s1));
        assert_eq!(seat.touch().focus(), Some(s1));

        seat.set_mouse_focus(None, (0.0, 0.0).into(), (0.0, 0.0).into());
        assert_eq!(seat.pointer().focus_surface(), None);
        assert_eq!(seat.touch().focus(), None);

        // pointer focus is always updated before touch focus
        let events = log.events();
        assert!(matches!(events[0], WireEvent::PointerFocus { surface: Some(_), .. }));
        assert_eq!(events[1], WireEvent::TouchFocus { surface: Some(s1) });
    }

    #[test]
    fn repeated_data_device_requests_keep_one_entry() {
        let log = WireLog::default();
        let mut seat = seat(&log);
        let mut manager = log.data_device_manager();

        seat.client_requested_data_device(&mut manager, ClientId(1), 10);
        seat.client_requested_data_device(&mut manager, ClientId(1), 11);

        assert_eq!(seat.data_device_count(), 1);
        assert_eq!(seat.data_device(ClientId(1)).map(|d| d.resource_id()), Some(11));
        // the replaced device is not destroyed
        assert!(!log.events().iter().any(|e| matches!(e, WireEvent::DataDeviceDestroyed { .. })));
    }

    /// Hands out devices that claim a different owner than requested
    struct MisattributingManager(WireLog);

    impl DataDeviceManager for MisattributingManager {
        fn create_data_device(&mut self, _client: ClientId, id: u32) -> Box<dyn DataDevice> {
            self.0.data_device(ClientId(99), id)
        }
    }

    #[test]
    fn data_devices_stay_keyed_by_requesting_client() {
        let log = WireLog::default();
        let mut seat = seat(&log);
        let mut manager = MisattributingManager(log.clone());

        seat.client_requested_data_device(&mut manager, ClientId(1), 10);
        seat.client_requested_data_device(&mut manager, ClientId(1), 11);

        assert_eq!(seat.data_device_count(), 1);
        assert_eq!(seat.data_device(ClientId(1)).map(|d| d.resource_id()), Some(11));
        assert!(seat.data_device(ClientId(99)).is_none());

        assert!(seat.cleanup_data_device_for_client(ClientId(1), true).is_none());
        assert_eq!(seat.data_device_count(), 0);
    }

    #[test]
    fn destroying_seat_resource_destroys_data_device() {
        let log = WireLog::default();
        let mut seat = seat(&log);
        let mut manager = log.data_device_manager();
        seat.client_requested_data_device(&mut manager, ClientId(3), 30);

        seat.destroy_resource(ClientId(3));
        assert!(seat.data_device(ClientId(3)).is_none());
        seat.destroy_resource(ClientId(3));

        let destroyed = log
            .events()
            .into_iter()
            .filter(|e| matches!(e, WireEvent::DataDeviceDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 1);
    }

    #[test]
    fn dropping_seat_destroys_remaining_data_devices() {
        let log = WireLog::default();
        {
            let mut seat = seat(&log);
            let mut manager = log.data_device_manager();
            seat.client_requested_data_device(&mut manager, ClientId(1), 10);
            seat.client_requested_data_device(&mut manager, ClientId(2), 20);
            log.clear();
        }

        assert_eq!(
            log.events(),
            vec![
                WireEvent::DataDeviceDestroyed { client: ClientId(1), id: 10 },
                WireEvent::DataDeviceDestroyed { client: ClientId(2), id: 20 },
            ]
        );
    }

    #[test]
    fn keyboard_focus_notifies_only_the_new_clients_data_device() {
        let log = WireLog::default();
        let mut seat = seat(&log);
        let mut manager = log.data_device_manager();
        let mut map = SurfaceMap::new();
        let s1 = surface(&mut map, 1, 1);
        let s2 = surface(&mut map, 2, 2);
        seat.client_requested_data_device(&mut manager, ClientId(1), 10);
        seat.client_requested_data_device(&mut manager, ClientId(2), 20);
        assert!(seat.set_keyboard_focus(&map, Some(s1)));
        log.clear();

        assert!(seat.set_keyboard_focus(&map, Some(s2)));

        assert_eq!(
            log.events(),
            vec![
                WireEvent::SelectionFocus { client: ClientId(2), id: 20 },
                WireEvent::KeyboardFocus { surface: Some(s2) },
            ]
        );
    }
}
