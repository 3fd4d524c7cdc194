//! Simple receiver daemon test
//!
//! Publishes GGA sentences for a position drifting slowly north, standing in
//! for the GPS receiver. Every tenth sentence is corrupted so the exec's
//! recovery policy can be watched working.

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
        "tcp://*:5033"
    )?;

    println!("GPS test server running on port 5033");

    let mut count: u64 = 0;

    loop {
        let sentence = if count % 10 == 9 {
            String::from("$GPGGA,garbage")
        }
        else {
            // Degrees-and-decimal-minutes, starting just north of the equator
            let lat_minutes = 1.0 + (count as f64) * 0.01;
            format!(
                "$GPGGA,123519,00{:06.3},N,00001.000,E,1,08,0.9,12.4,M,46.9,M,,*47",
                lat_minutes
            )
        };

        socket.send(&sentence, 0)?;
        println!("Published {}", sentence);

        count += 1;
        thread::sleep(Duration::from_secs(1));
    }
}
