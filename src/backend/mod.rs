// SPDX-License-Identifier: GPL-3.0-only

pub mod recorder;
pub mod replay;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use calloop::channel::{self, Channel, Sender};
use tracing::{debug, info};

use self::replay::{ReplayCommand, ReplayError, parse_line};

/// A parsed script line, or the error that ended the script
pub type ScriptMessage = Result<ReplayCommand, ReplayError>;

/// Where the replay script is read from
#[derive(Debug, Clone)]
pub enum ScriptSource {
    Stdin,
    File(PathBuf),
}

/// Read `source` on a worker thread and deliver parsed commands to the event loop.
///
/// The channel closes once the script is exhausted or after the first error.
pub fn spawn_script_reader(source: ScriptSource) -> Result<Channel<ScriptMessage>> {
    let reader: Box<dyn BufRead + Send> = match &source {
        ScriptSource::Stdin => Box::new(BufReader::new(io::stdin())),
        ScriptSource::File(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open replay script {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
    };
    info!(?source, "Reading replay script");

    let (sender, channel) = channel::channel();
    std::thread::Builder::new()
        .name("seatmux-script".into())
        .spawn(move || read_script(reader, sender))
        .context("Failed to spawn script reader")?;

    Ok(channel)
}

fn read_script(reader: Box<dyn BufRead + Send>, sender: Sender<ScriptMessage>) {
    for (index, text) in reader.lines().enumerate() {
        let line = index + 1;
        let message = match text {
            Ok(text) => match parse_line(line, &text) {
                Ok(Some(command)) => Ok(command),
                Ok(None) => continue,
                Err(err) => Err(err),
            },
            Err(err) => Err(ReplayError::Read {
                line,
                message: err.to_string(),
            }),
        };

        let failed = message.is_err();
        if sender.send(message).is_err() {
            debug!("Event loop went away, stopping script reader");
            return;
        }
        if failed {
            return;
        }
    }
}
