//! # Operator Command Client

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    cmd::{OpCmd, OpCmdParseError, OpCmdResponse},
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};

use crate::params::GovExecParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Operator command client
pub struct CmdClient {
    socket: MonitoredSocket
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the operator")]
    NotConnected,

    #[error("Could not send a response to the operator: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the operator: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the data: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not parse the recieved command")]
    CmdParseError(OpCmdParseError),

    #[error("The operator sent a message which was not valid UTF-8")]
    NonUtf8Response
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdClient {

    /// Create a new instance of the operator command client.
    ///
    /// This function will not block until the operator connects.
    pub fn new(ctx: &zmq::Context, params: &GovExecParams) -> Result<Self, CmdClientError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            req_correlate: true,
            req_relaxed: false,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(
            ctx,
            zmq::REP,
            socket_options,
            &params.op_cmd_endpoint
        ).map_err(CmdClientError::SocketError)?;

        // Create self
        Ok(Self {
            socket
        })
    }

    /// Check if the client is connected to the operator
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Recieve a single command from the operator.
    ///
    /// The protocol here is to call recieve_cmd in a loop until `Ok(None)` is returned, indicating
    /// that there are no more pending commands to be recieved. This does not mean that the
    /// operator will not send another command in the future, just that there are none to handle
    /// right now.
    ///
    /// After recieving a valid command the client must send a response using `.send_response()`
    /// before attempting to recieve another command. If an error occurs in receiving the command
    /// the response will be sent automatically by this function.
    pub fn recieve_cmd(&self) -> Result<Option<OpCmd>, CmdClientError> {
        // Check the operator is connected
        if !self.socket.connected() {
            return Err(CmdClientError::NotConnected)
        }

        // Attempt to read a string from the socket
        let cmd_str = match self.socket.recv_string(0) {
            // Valid message
            Ok(Ok(s)) => s,
            // Non UTF-8 message
            Ok(Err(_)) => {
                // Send invalid message response
                self.send_response(OpCmdResponse::Invalid)?;

                return Err(CmdClientError::NonUtf8Response)
            },
            // No message in timeout
            Err(zmq::Error::EAGAIN) => return Ok(None),
            // Recieve error
            Err(e) => {
                // No response is sent if we could not recieve
                return Err(CmdClientError::RecvError(e))
            }
        };

        // Parse the command
        OpCmd::from_json(&cmd_str)
            .map_err(|e| {
                // Send the invalid response
                self.send_response(OpCmdResponse::Invalid).ok();

                CmdClientError::CmdParseError(e)
            })
            .map(Some)
    }

    /// Send the given response back to the operator.
    ///
    /// This function must be called after recieving a command.
    pub fn send_response(&self, response: OpCmdResponse) -> Result<(), CmdClientError> {
        // Check the operator is connected
        if !self.socket.connected() {
            return Err(CmdClientError::NotConnected)
        }

        // Serialise the response
        let response_str = serde_json::to_string(&response)
            .map_err(CmdClientError::SerializationError)?;

        // Send the response
        self.socket.send(&response_str, 0)
            .map_err(CmdClientError::SendError)
    }
}
