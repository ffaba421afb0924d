//! Command endpoint: receives operator frames over UDP, applies them to the
//! supervisor, and answers with a small status frame.
//!
//! The receive task never touches the tick cadence; each command is applied
//! under a single lock acquisition so a tick observes it fully or not at all.

pub mod state;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::net::UdpSocket;
use tracing::{debug, info, trace, warn};

use hover_nav::{Shape, Supervisor};
use hover_proto::frame::{Command, Status};
use state::LinkStatus;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub bind: String,
    /// Answer every accepted command with a status frame.
    pub reply_status: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:2390".to_string(), reply_status: true }
    }
}

pub struct CommandEndpoint {
    socket: UdpSocket,
    supervisor: Arc<Mutex<Supervisor>>,
    status: Arc<Mutex<LinkStatus>>,
    reply_status: bool,
}

impl CommandEndpoint {
    pub async fn bind(cfg: &LinkConfig, supervisor: Arc<Mutex<Supervisor>>) -> Result<Self> {
        let socket = UdpSocket::bind(&cfg.bind)
            .await
            .with_context(|| format!("bind command socket {}", cfg.bind))?;
        info!(addr = %cfg.bind, "command endpoint listening");
        Ok(Self {
            socket,
            supervisor,
            status: Arc::new(Mutex::new(LinkStatus::default())),
            reply_status: cfg.reply_status,
        })
    }

    /// Shared link-health record for the run loop's status line.
    pub fn status_handle(&self) -> Arc<Mutex<LinkStatus>> {
        self.status.clone()
    }

    /// Receive loop. Malformed and foreign frames are dropped silently
    /// (trace-logged); socket errors are logged and the loop keeps going.
    pub async fn run(self) -> Result<()> {
        let mut buf = [0u8; 64];
        loop {
            let (n, peer) = match self.socket.recv_from(&mut buf).await {
                Ok(v) => v,
                Err(e) => {
                    warn!("command socket receive failed: {e}");
                    continue;
                }
            };
            match Command::decode(&buf[..n]) {
                Ok(cmd) => {
                    let reply = self.apply(cmd);
                    {
                        let mut st = self.status.lock().unwrap();
                        st.frames_rx += 1;
                        st.last_frame = Some(Instant::now());
                        st.last_peer = Some(peer);
                    }
                    if self.reply_status {
                        if let Err(e) = self.socket.send_to(&reply.encode(), peer).await {
                            debug!(%peer, "status reply failed: {e}");
                        }
                    }
                }
                Err(e) => {
                    trace!(%peer, "dropping frame: {e}");
                    self.status.lock().unwrap().frames_dropped += 1;
                }
            }
        }
    }

    /// Apply one decoded command. Every accepted command kicks the watchdog;
    /// the shape and override mutators kick internally, the altitude update
    /// kicks alongside.
    fn apply(&self, cmd: Command) -> Status {
        let now = Instant::now();
        let mut sup = self.supervisor.lock().unwrap();
        match cmd {
            Command::Stop => sup.request_shape(Shape::Stop, now),
            Command::StartSquare => sup.request_shape(Shape::Square, now),
            Command::StartRectangle => sup.request_shape(Shape::Rectangle, now),
            Command::StartOval => sup.request_shape(Shape::Oval, now),
            Command::StartTriangle => sup.request_shape(Shape::Triangle, now),
            Command::SetAltitudeMm(mm) => {
                sup.set_target_altitude_mm(mm);
                sup.kick_safety(now);
            }
            Command::OverrideOn => sup.enable_override(true, now),
            Command::OverrideOff => sup.enable_override(false, now),
        }
        debug!(?cmd, state = ?sup.state(), "command applied");
        Status {
            state: sup.state().code(),
            alt_mm: sup.last_downward_mm().unwrap_or(0),
        }
    }
}
