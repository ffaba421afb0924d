use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;

use hover_fc::{LogStabilizer, RangeSensors, ScriptedSensors, SensorSimConfig, Stabilizer};
use hover_link::{CommandEndpoint, LinkConfig};
use hover_nav::altitude::AltitudeConfig;
use hover_nav::{doctor, NavConfig, Shape, Supervisor};

#[derive(Debug, Parser)]
#[command(
    name = "hover",
    version,
    about = "hover - autonomous navigation supervisor for small flight vehicles"
)]
struct Cli {
    #[arg(long)]
    config: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Validate the configuration and report safety-relevant policy choices.
    Doctor,
    /// Fly: command endpoint plus the periodic tick loop.
    Run,
    /// Offline scripted mission on a synthetic clock; prints a 1 Hz timeline.
    Sim,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct Config {
    nav: NavConfig,
    altitude: AltitudeConfig,
    link: LinkConfig,
    sensors: SensorSimConfig,
}

fn load_config(path: &str) -> Result<Config> {
    let s = std::fs::read_to_string(path).context("read config")?;
    Ok(toml::from_str(&s).context("parse config toml")?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.cmd {
        Cmd::Doctor => doctor_cmd(&cfg)?,
        Cmd::Run => run(&cfg).await?,
        Cmd::Sim => sim(&cfg)?,
    }
    Ok(())
}

fn doctor_cmd(cfg: &Config) -> Result<()> {
    info!("doctor: starting");
    doctor::check_nav(&cfg.nav)?;
    doctor::check_altitude(&cfg.altitude)?;
    cfg.link
        .bind
        .parse::<std::net::SocketAddr>()
        .with_context(|| format!("link.bind is not a socket address: {}", cfg.link.bind))?;
    info!("doctor: OK");
    Ok(())
}

async fn run(cfg: &Config) -> Result<()> {
    info!("run: starting");

    let start = Instant::now();
    let sup = Arc::new(Mutex::new(Supervisor::new(
        &cfg.nav,
        cfg.altitude.clone(),
        start,
    )));

    let endpoint = CommandEndpoint::bind(&cfg.link, sup.clone()).await?;
    let link = endpoint.status_handle();
    tokio::spawn(endpoint.run());

    let sup_tick = sup.clone();
    let nav = cfg.nav.clone();
    let sensors_cfg = cfg.sensors.clone();
    let tick_task = tokio::spawn(async move {
        let mut sensors = ScriptedSensors::constant(&sensors_cfg, Instant::now());
        let mut stab = LogStabilizer::default();
        let period = Duration::from_secs_f64(1.0 / f64::from(nav.tick_hz));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut last_line = Instant::now();
        loop {
            ticker.tick().await;
            let now = Instant::now();
            let down = sensors.downward_mm();
            let forward = sensors.forward_mm();
            let sp = sup_tick.lock().unwrap().tick(now, down, forward);
            stab.apply(&sp);

            if last_line.elapsed() >= Duration::from_secs(1) {
                let (state, alt) = {
                    let s = sup_tick.lock().unwrap();
                    (s.state(), s.last_downward_mm())
                };
                let (frames, frame_age) = {
                    let l = link.lock().unwrap();
                    (l.frames_rx, l.frame_age())
                };
                info!(
                    ?state,
                    alt_mm = alt.unwrap_or(0),
                    frames_rx = frames,
                    last_cmd_s = frame_age.map(|a| a.as_secs()),
                    "status"
                );
                last_line = now;
            }
        }
    });

    tokio::signal::ctrl_c().await.context("wait for shutdown")?;
    info!("shutting down");
    tick_task.abort();
    Ok(())
}

/// Scripted bench flight mirroring the hardware test profile: square at the
/// configured altitude, an obstacle in front between 8 s and 20 s, operator
/// heartbeats for the first 20 s, then command silence until the watchdog
/// lands the vehicle.
fn sim(cfg: &Config) -> Result<()> {
    let start = Instant::now();
    let mut sup = Supervisor::new(&cfg.nav, cfg.altitude.clone(), start);
    sup.request_shape(Shape::Square, start);

    let tick = Duration::from_millis(10);
    let mut t = Duration::ZERO;
    while t <= Duration::from_secs(70) {
        let now = start + t;
        let secs = t.as_secs_f32();
        let down = 1200.0 + 10.0 * (2.0 * std::f32::consts::PI * 0.5 * secs).sin();
        let forward: u16 = if (8.0..20.0).contains(&secs) { 500 } else { 2000 };

        let heartbeat_due = t.as_millis() % 1000 == 0;
        if heartbeat_due && t < Duration::from_secs(20) {
            sup.kick_safety(now);
        }

        let sp = sup.tick(now, Some(down as u16), Some(forward));

        if heartbeat_due {
            println!(
                "t={:>2}s state={:?} v=({:+.2},{:+.2}) thrust={} down={}mm front={}mm",
                t.as_secs(),
                sup.state(),
                sp.vx,
                sp.vy,
                sp.thrust,
                down as u16,
                forward
            );
        }
        t += tick;
    }
    Ok(())
}
