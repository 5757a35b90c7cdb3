//! A scriptable [`LocationProvider`] for tests.
//!
//! Clones share state, so a test can keep one handle to script the device while the engine holds another.
use std::sync::{Arc, Mutex, MutexGuard};

use feast_common::Coordinate;
use log::*;
use tokio::sync::mpsc;

use crate::location::{Address, LocationError, LocationProvider, PermissionStatus, PositionWatch, WatchOptions};

#[derive(Debug)]
struct MockState {
    permission: PermissionStatus,
    position: Result<Coordinate, LocationError>,
    address: Option<Address>,
    geocoding_fails: bool,
    watchers: Vec<(u64, mpsc::Sender<Coordinate>)>,
    next_watch_id: u64,
    released_watches: usize,
    last_options: Option<WatchOptions>,
    permission_requests: usize,
}

#[derive(Debug, Clone)]
pub struct MockLocationProvider {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockLocationProvider {
    fn default() -> Self {
        Self::at(Coordinate { latitude: 21.03, longitude: 105.85 })
    }
}

impl MockLocationProvider {
    /// A device that grants permission and sits at `position`.
    pub fn at(position: Coordinate) -> Self {
        let state = MockState {
            permission: PermissionStatus::Granted,
            position: Ok(position),
            address: None,
            geocoding_fails: false,
            watchers: Vec::new(),
            next_watch_id: 0,
            released_watches: 0,
            last_options: None,
            permission_requests: 0,
        };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_permission(&self, permission: PermissionStatus) {
        self.lock().permission = permission;
    }

    pub fn set_position(&self, position: Coordinate) {
        self.lock().position = Ok(position);
    }

    pub fn fail_position(&self, reason: &str) {
        self.lock().position = Err(LocationError::Unavailable(reason.to_string()));
    }

    /// Every coordinate reverse geocodes to `address`.
    pub fn set_address(&self, address: Address) {
        self.lock().address = Some(address);
    }

    pub fn fail_geocoding(&self, fail: bool) {
        self.lock().geocoding_fails = fail;
    }

    /// Feeds a position sample to every open watch. Returns how many watches received it.
    pub fn push_position(&self, position: Coordinate) -> usize {
        let state = self.lock();
        state.watchers.iter().filter(|(_, tx)| tx.try_send(position).is_ok()).count()
    }

    pub fn active_watches(&self) -> usize {
        self.lock().watchers.len()
    }

    pub fn released_watches(&self) -> usize {
        self.lock().released_watches
    }

    pub fn permission_requests(&self) -> usize {
        self.lock().permission_requests
    }

    pub fn last_watch_options(&self) -> Option<WatchOptions> {
        self.lock().last_options.clone()
    }
}

impl LocationProvider for MockLocationProvider {
    async fn request_permission(&self) -> PermissionStatus {
        let mut state = self.lock();
        state.permission_requests += 1;
        state.permission
    }

    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.lock().position.clone()
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Vec<Address>, LocationError> {
        let state = self.lock();
        if state.geocoding_fails {
            return Err(LocationError::GeocodeFailed(format!("No geocoder for {coordinate}")));
        }
        Ok(state.address.iter().cloned().collect())
    }

    async fn watch_position(&self, options: WatchOptions) -> Result<PositionWatch, LocationError> {
        let (tx, rx) = mpsc::channel(64);
        let id = {
            let mut state = self.lock();
            if state.permission == PermissionStatus::Denied {
                return Err(LocationError::PermissionDenied);
            }
            let id = state.next_watch_id;
            state.next_watch_id += 1;
            state.watchers.push((id, tx));
            state.last_options = Some(options);
            id
        };
        let shared = Arc::clone(&self.state);
        Ok(PositionWatch::new(rx, move || {
            let mut state = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            state.watchers.retain(|(watch_id, _)| *watch_id != id);
            state.released_watches += 1;
            trace!("📍️ Mock position watch {id} released");
        }))
    }
}
