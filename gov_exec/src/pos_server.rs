//! # Position Server
//!
//! Broadcasts the vehicle's position report to the controller once per cycle,
//! whether or not a valid fix is held.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::gps::PosReport,
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};

use crate::params::GovExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position report server
pub struct PosServer {
    socket: MonitoredSocket
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PosServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the position report: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the position report: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PosServer {
    /// Create a new instance of the position server.
    ///
    /// This function will not block until the controller connects.
    pub fn new(ctx: &zmq::Context, params: &GovExecParams) -> Result<Self, PosServerError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.pos_report_endpoint
        ).map_err(PosServerError::SocketError)?;

        // Create self
        Ok(Self {
            socket
        })
    }

    /// Send the given position report.
    pub fn send(&mut self, report: &PosReport) -> Result<(), PosServerError> {
        // Serialize the report
        let report_string = serde_json::to_string(report)
            .map_err(PosServerError::SerializationError)?;

        // Send the report
        self.socket.send(&report_string, 0)
            .map_err(PosServerError::SendError)
    }
}
