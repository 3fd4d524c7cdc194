//! # Input Gate Client
//!
//! This module provides networking abstractions to connect to the input dispatch collaborator.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::input::{InputGateCmd, InputGateResponse},
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};

use crate::params::GovExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct InputClient {
    gate_socket: MonitoredSocket
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum InputClientError {

    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the input dispatch")]
    NotConnected,

    #[error("Could not send the gate command: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the input dispatch: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the data: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response from the input dispatch: {0}")]
    DeserializeError(serde_json::Error),

}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputClient {
    /// Create a new instance of the input gate client.
    pub fn new(ctx: &zmq::Context, params: &GovExecParams) -> Result<Self, InputClientError> {

        // Create the socket options
        let gate_socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        // Create the socket
        let gate_socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            gate_socket_options,
            &params.input_gate_endpoint
        ).map_err(InputClientError::SocketError)?;

        // Create self
        Ok(Self {
            gate_socket
        })
    }

    /// Send a gate command to the input dispatch.
    ///
    /// The protocol is idempotent so commanding the current state is safe.
    pub fn send_cmd(
        &mut self,
        cmd: InputGateCmd
    ) -> Result<InputGateResponse, InputClientError> {
        // If not connected return now
        if !self.gate_socket.connected() {
            return Err(InputClientError::NotConnected)
        }

        // Serialize the command
        let cmd_str = serde_json::to_string(&cmd)
            .map_err(InputClientError::SerializationError)?;

        // Send the command
        self.gate_socket.send(&cmd_str, 0)
            .map_err(InputClientError::SendError)?;

        // Recieve response back from the dispatch
        let msg = self.gate_socket.recv_msg(0);

        match msg {
            Ok(m) => {
                serde_json::from_str(m.as_str().unwrap_or(""))
                    .map_err(InputClientError::DeserializeError)
            },
            Err(e) => {
                Err(InputClientError::RecvError(e))
            }
        }
    }
}
