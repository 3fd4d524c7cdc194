//! Simple drive server test
//!
//! Accepts drive demands and prints them, standing in for the actuator
//! driver.

use comms_if::eqpt::drive::{DriveDems, DriveDemsResponse};
use comms_if::net::{MonitoredSocket, SocketOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create the context for zmq
    let ctx = zmq::Context::new();

    // Set the socket options
    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    // Create the socket
    let socket = MonitoredSocket::new(
        &ctx,
        zmq::REP,
        socket_options,
        "tcp://*:5031"
    )?;

    println!("Drive test server running on port 5031");

    // Respond to client demands
    loop {
        // Wait for the client to send us a demand
        let msg = socket.recv_msg(0)?;

        let response = match msg.as_str() {
            Some(s) => match serde_json::from_str::<DriveDems>(s) {
                Ok(dems) if dems.is_valid() => {
                    println!("Drive demand: {:.3}", dems.throttle_norm);
                    DriveDemsResponse::DemsOk
                },
                Ok(dems) => {
                    println!("Invalid demand: {:?}", dems);
                    DriveDemsResponse::DemsInvalid
                },
                Err(e) => {
                    println!("Could not parse demand: {}", e);
                    DriveDemsResponse::DemsInvalid
                }
            },
            None => DriveDemsResponse::DemsInvalid
        };

        socket.send(&serde_json::to_string(&response)?, 0)?;
    }
}
