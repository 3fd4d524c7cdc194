//! Simple area event server test
//!
//! Publishes a pair of sample areas so the exec can be run without the real
//! controller. One square slows the vehicle, the other is a reversed stop
//! area with string-typed props, as the controller sends them.

use comms_if::net::{MonitoredSocket, SocketOptions};
use std::thread;
use std::time::Duration;

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
        zmq::PUB,
        socket_options,
        "tcp://*:5030"
    )?;

    println!("Area test server running on port 5030");

    let all_boundary_data = r#"{
        "event": "BOUNDARY_ALL",
        "payload": [
            {
                "id": "1",
                "label": "test_area",
                "type": "StopArea",
                "boundary": [[0, 0], [0, 10], [10, 10], [10, 0]],
                "props": {"prop1": "empty", "reversed": "True", "disables_inputs": true}
            },
            {
                "id": "2",
                "label": "test_area2",
                "type": "GameArea",
                "boundary": [[0, 0], [0, 20], [20, 20], [20, 0]],
                "props": {"prop1": "empty", "slowing_factor": "3"}
            }
        ]
    }"#;

    // Publish the area set periodically so that late subscribers get it too
    loop {
        socket.send(all_boundary_data, 0)?;
        println!("Published area set");

        thread::sleep(Duration::from_secs(5));
    }
}
