//! Receiver sentence sources

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use std::fs::read_to_string;
use std::path::Path;

// Internal
use comms_if::net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Reads sentences published by the receiver daemon over the network.
pub struct NetSource {
    socket: MonitoredSocket,
}

/// Replays sentences from a file, one per read, allowing the exec to run
/// without receiver hardware attached.
pub struct ReplaySource {
    sentences: std::vec::IntoIter<String>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The outcome of one source read.
#[derive(Debug)]
pub enum SourceData {
    /// Nothing arrived within the read timeout
    None,

    /// A raw sentence
    Sentence(String),

    /// The source is exhausted and will never produce another sentence
    EndOfStream,
}

/// Errors raised while reading from a sentence source.
///
/// Any of these is fatal to the control loop, which must stop the vehicle
/// and disable inputs before propagating it.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a sentence from the receiver: {0}")]
    RecvError(zmq::Error),

    #[error("The receiver sent a sentence which was not valid UTF-8")]
    NonUtf8Sentence,

    #[error("Could not load the replay file: {0}")]
    ReplayLoadError(std::io::Error),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of raw receiver sentences.
///
/// Reading the source is the control loop's only long-blocking step, so
/// implementations must return within a bounded time whether or not data
/// arrived.
pub trait SentenceSource {
    /// Read the next sentence from the source.
    fn read_sentence(&mut self) -> Result<SourceData, SourceError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl NetSource {
    /// Create a new source subscribed to the receiver daemon.
    ///
    /// This function will not block until the daemon connects.
    pub fn new(
        ctx: &zmq::Context,
        endpoint: &str,
        recv_timeout_ms: i32,
    ) -> Result<Self, SourceError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            subscribe: Some(String::new()),
            connect_timeout: 1000,
            recv_timeout: recv_timeout_ms,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            socket_options,
            endpoint,
        ).map_err(SourceError::SocketError)?;

        Ok(Self { socket })
    }
}

impl SentenceSource for NetSource {
    fn read_sentence(&mut self) -> Result<SourceData, SourceError> {
        match self.socket.recv_string(0) {
            Ok(Ok(s)) => Ok(SourceData::Sentence(s)),
            Ok(Err(_)) => Err(SourceError::NonUtf8Sentence),
            // No sentence within the timeout
            Err(zmq::Error::EAGAIN) => Ok(SourceData::None),
            Err(e) => Err(SourceError::RecvError(e)),
        }
    }
}

impl ReplaySource {
    /// Load a replay from the given file, one sentence per line.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let content = read_to_string(&path)
            .map_err(SourceError::ReplayLoadError)?;

        let sentences: Vec<String> = content
            .lines()
            .map(String::from)
            .filter(|l| !l.is_empty())
            .collect();

        info!(
            "Loaded replay of {} sentences from {:?}",
            sentences.len(),
            path.as_ref()
        );

        Ok(Self {
            sentences: sentences.into_iter(),
        })
    }
}

impl SentenceSource for ReplaySource {
    fn read_sentence(&mut self) -> Result<SourceData, SourceError> {
        match self.sentences.next() {
            Some(s) => Ok(SourceData::Sentence(s)),
            None => Ok(SourceData::EndOfStream),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_replay_source() {
        let mut path = std::env::temp_dir();
        path.push("gov_exec_replay_source_test.txt");

        std::fs::write(
            &path,
            "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\n\
             \n\
             $GPGGA,123520,4807.039,N,01131.001,E,1,08,0.9,545.6,M,46.9,M,,*47\n",
        )
        .unwrap();

        let mut source = ReplaySource::new(&path).unwrap();

        assert!(matches!(
            source.read_sentence().unwrap(),
            SourceData::Sentence(_)
        ));
        assert!(matches!(
            source.read_sentence().unwrap(),
            SourceData::Sentence(_)
        ));
        assert!(matches!(
            source.read_sentence().unwrap(),
            SourceData::EndOfStream
        ));

        std::fs::remove_file(&path).ok();
    }
}
