use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Command-link health, shared with the run loop for the periodic status
/// line. The receive task is the only writer.
#[derive(Debug, Clone, Default)]
pub struct LinkStatus {
    pub frames_rx: u64,
    pub frames_dropped: u64,
    pub last_frame: Option<Instant>,
    pub last_peer: Option<SocketAddr>,
}

impl LinkStatus {
    pub fn frame_age(&self) -> Option<Duration> {
        self.last_frame.map(|t| t.elapsed())
    }
}
