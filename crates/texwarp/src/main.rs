//! TexWarp - interactive texture warp explorer.
//!
//! Drag the control points on the left pane to change how the source image
//! is sampled; the right pane shows the GPU-rendered result. Drop an image
//! file onto the window to replace the source, press `s` to save the warp
//! output as a PNG, `Esc` to quit.

#![warn(missing_docs)]

mod app;
mod preview;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

use app::{App, AppOptions};
use texwarp_core::Topology;

const USAGE: &str = "usage: texwarp [IMAGE] [--topology quad|grid] [--output PATH]";

fn parse_args() -> Result<AppOptions> {
    let mut image = None;
    let mut topology = Topology::default();
    let mut output = PathBuf::from("texwarp.png");

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--topology" => {
                let name = args.next().context(USAGE)?;
                topology = Topology::from_name(&name)
                    .with_context(|| format!("unknown topology {name:?}\n{USAGE}"))?;
            }
            "--output" => {
                output = PathBuf::from(args.next().context(USAGE)?);
            }
            "--help" | "-h" => bail!("{USAGE}"),
            other if image.is_none() && !other.starts_with('-') => {
                image = Some(PathBuf::from(other));
            }
            other => bail!("unexpected argument {other:?}\n{USAGE}"),
        }
    }

    Ok(AppOptions {
        image,
        topology,
        output,
    })
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = parse_args()?;
    info!(topology = ?options.topology, "starting");

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(options)?;
    event_loop.run_app(&mut app).context("event loop failed")?;
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
