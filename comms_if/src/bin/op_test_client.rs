//! Simple operator command client test
//!
//! Sends a drive command to the exec and prints the response.

use comms_if::net::{MonitoredSocket, SocketOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create the context for zmq
    let ctx = zmq::Context::new();

    // Set the socket options. The operator side binds, the exec's command
    // client connects to it.
    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        send_timeout: -1,
        recv_timeout: 5000,
        req_correlate: true,
        ..Default::default()
    };

    // Create the socket
    let socket = MonitoredSocket::new(
        &ctx,
        zmq::REQ,
        socket_options,
        "tcp://*:5032"
    )?;

    // Read the throttle from the command line, defaulting to half speed
    let throttle: f64 = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(0.5);

    let cmd = format!(
        r#"{{"type": "DRIVE", "payload": {{"throttle_norm": {}}}}}"#,
        throttle
    );

    println!("Sending {}", cmd);
    socket.send(&cmd, 0)?;

    let response = socket.recv_string(0)?;
    match response {
        Ok(r) => println!("Response: {}", r),
        Err(_) => println!("Response was not valid UTF-8")
    }

    Ok(())
}
