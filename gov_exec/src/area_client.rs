//! # Area Client
//!
//! Recieves area events from the controller and applies them to the shared
//! area registry. Events arrive asynchronously with respect to the control
//! loop, so the client runs its own thread and the registry mediates between
//! the two.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

// Internal
use crate::areas::{Area, AreaRegistry};
use crate::params::GovExecParams;
use comms_if::{
    area::AreaEvent,
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Area event client.
///
/// Owns the background thread which drains the event socket for the life of
/// the session.
pub struct AreaClient {
    shutdown: Arc<AtomicBool>,

    join_handle: Option<thread::JoinHandle<()>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AreaClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AreaClient {
    /// Start recieving area events into the given registry.
    ///
    /// This function will not block until the controller connects.
    pub fn start(
        ctx: &zmq::Context,
        params: &GovExecParams,
        registry: AreaRegistry,
    ) -> Result<Self, AreaClientError> {
        // Create the socket options. The recieve timeout bounds how long the
        // thread takes to notice a shutdown request.
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            subscribe: Some(String::new()),
            connect_timeout: 1000,
            recv_timeout: 100,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            socket_options,
            &params.area_events_endpoint
        ).map_err(AreaClientError::SocketError)?;

        let shutdown = Arc::new(AtomicBool::new(false));

        // Spawn the event thread
        let shutdown_clone = shutdown.clone();
        let join_handle = thread::spawn(move || {
            event_thread(socket, shutdown_clone, registry)
        });

        Ok(Self {
            shutdown,
            join_handle: Some(join_handle),
        })
    }

    /// Stop the client, waiting for the event thread to exit.
    pub fn stop(mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        if let Some(jh) = self.join_handle.take() {
            jh.join().ok();
        }

        info!("AreaClient stopped");
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Drain the event socket until shutdown is requested.
fn event_thread(
    socket: MonitoredSocket,
    shutdown: Arc<AtomicBool>,
    registry: AreaRegistry,
) {
    while !shutdown.load(Ordering::Relaxed) {
        let event_str = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Recieved an area event which was not valid UTF-8");
                continue;
            },
            // No event within the timeout
            Err(zmq::Error::EAGAIN) => continue,
            // The context is being torn down, exit quietly
            Err(zmq::Error::ETERM) => break,
            Err(e) => {
                warn!("Error recieving area event: {}", e);
                continue;
            }
        };

        match AreaEvent::from_json(&event_str) {
            Ok(event) => apply_event(&registry, event),
            Err(e) => warn!("Could not parse recieved area event: {}", e)
        }
    }
}

/// Apply a single event to the registry.
fn apply_event(registry: &AreaRegistry, event: AreaEvent) {
    match event {
        AreaEvent::Boundary(data) => {
            debug!("Recieved area: {} ({})", data.id, data.label);
            registry.upsert(Area::from_data(data));
        },
        AreaEvent::BoundaryAll(data) => {
            debug!("Recieved {} areas", data.len());
            registry.upsert_many(data.into_iter().map(Area::from_data).collect());
        },
        AreaEvent::BoundaryRemove(id) => {
            registry.remove(&id);
        }
    }
}
