// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use anyhow::{Context, Result};
use calloop::{EventLoop, LoopSignal, channel::Event as ChannelEvent};
use seatmux::{
    backend::{
        self, ScriptSource,
        replay::{ReplayError, ReplayHost},
    },
    config::SeatConfig,
};
use clap::Parser;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay scripted host input through a recording seat", long_about = None)]
struct Cli {
    /// Replay script, read from stdin when omitted
    script: Option<PathBuf>,
}

impl Cli {
    fn source(&self) -> ScriptSource {
        match &self.script {
            Some(path) => ScriptSource::File(path.clone()),
            None => ScriptSource::Stdin,
        }
    }
}

/// The replay tool's event loop state
struct State {
    host: ReplayHost,
    loop_signal: LoopSignal,
    should_stop: bool,
    error: Option<ReplayError>,
    replayed: usize,
}

impl State {
    /// Print everything the seat sent since the last flush
    fn flush_wire_events(&self) {
        for event in self.host.log.take() {
            println!("{event}");
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = main_inner(cli) {
        error!("Error occurred in main(): {:#}", err);
        std::process::exit(1);
    }
}

fn main_inner(cli: Cli) -> Result<()> {
    // setup logger
    init_logger()?;
    info!("seatmux starting up!");

    let config = SeatConfig::from_env().context("Invalid seat configuration")?;
    let source = cli.source();

    // init event loop
    let mut event_loop = EventLoop::<State>::try_new()
        .context("Failed to initialize event loop")?;

    // script lines are parsed off-thread and injected on this one
    let script = backend::spawn_script_reader(source)?;
    event_loop
        .handle()
        .insert_source(script, |event, _, state| match event {
            ChannelEvent::Msg(Ok(command)) => {
                state.host.apply(command);
                state.replayed += 1;
                state.flush_wire_events();
            }
            ChannelEvent::Msg(Err(err)) => {
                state.error = Some(err);
                state.should_stop = true;
            }
            ChannelEvent::Closed => state.should_stop = true,
        })
        .map_err(|err| anyhow::anyhow!("Failed to init replay source: {}", err.error))?;

    let mut state = State {
        host: ReplayHost::new(&config),
        loop_signal: event_loop.get_signal(),
        should_stop: false,
        error: None,
        replayed: 0,
    };

    info!(seat = state.host.seat.name(), "Starting event loop");

    // run the event loop
    event_loop.run(None, &mut state, |state| {
        // shall we shut down?
        if state.should_stop {
            info!("Shutting down");
            state.loop_signal.stop();
            state.loop_signal.wakeup();
        }
    })?;

    info!(commands = state.replayed, "Event loop exited");

    // seat teardown destroys the remaining data devices
    let State { host, error, .. } = state;
    let log = host.log.clone();
    drop(host);
    for event in log.take() {
        println!("{event}");
    }

    match error {
        Some(err) => Err(err).context("Replay aborted"),
        None => Ok(()),
    }
}

fn init_logger() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("seatmux=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
