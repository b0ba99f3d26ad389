// SPDX-License-Identifier: GPL-3.0-only

//! Per-client data device (selection/clipboard channel) bookkeeping.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::surface::ClientId;

/// A client's data transfer channel
pub trait DataDevice {
    /// Client owning the underlying protocol resource
    fn client(&self) -> ClientId;

    /// Protocol object id of the underlying resource
    fn resource_id(&self) -> u32;

    /// Advertise the current selection to this client after it gained keyboard focus
    fn send_selection_focus(&mut self);

    /// Release the protocol resource backing this device
    fn destroy(self: Box<Self>);
}

/// Creates data devices on client request
pub trait DataDeviceManager {
    fn create_data_device(&mut self, client: ClientId, id: u32) -> Box<dyn DataDevice>;
}

/// At most one data device per client, in registration order
#[derive(Default)]
pub struct DataDeviceRegistry {
    devices: IndexMap<ClientId, Box<dyn DataDevice>>,
}

impl DataDeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `device` for `client`.
    ///
    /// An existing entry for the same client is handed back undestroyed.
    pub fn insert(
        &mut self,
        client: ClientId,
        device: Box<dyn DataDevice>,
    ) -> Option<Box<dyn DataDevice>> {
        if device.client() != client {
            warn!(%client, owner = %device.client(), "Data device owned by another client");
        }
        debug!(%client, resource = device.resource_id(), "Registering data device");
        self.devices.insert(client, device)
    }

    /// Drop the entry for `client`.
    ///
    /// With `destroy` set the entry's resource is released and nothing is
    /// returned; otherwise the entry is handed back and tearing it down is the
    /// caller's business. No entry is not an error.
    pub fn cleanup_for_client(
        &mut self,
        client: ClientId,
        destroy: bool,
    ) -> Option<Box<dyn DataDevice>> {
        let device = self.devices.shift_remove(&client)?;
        debug!(%client, resource = device.resource_id(), destroy, "Removing data device");
        if destroy {
            device.destroy();
            None
        } else {
            Some(device)
        }
    }

    pub fn get(&self, client: ClientId) -> Option<&dyn DataDevice> {
        self.devices.get(&client).map(|device| device.as_ref())
    }

    pub fn get_mut(&mut self, client: ClientId) -> Option<&mut (dyn DataDevice + 'static)> {
        self.devices.get_mut(&client).map(|device| device.as_mut())
    }

    pub fn clients(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.devices.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Destroy every registered device
    pub fn destroy_all(&mut self) {
        for (client, device) in self.devices.drain(..) {
            debug!(%client, resource = device.resource_id(), "Destroying data device");
            device.destroy();
        }
    }
}
