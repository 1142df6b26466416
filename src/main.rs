// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use ttsynth::driver;
use ttsynth::error::SchedulerError;
use ttsynth::network::Network;
use ttsynth::xml;

/// Synthesize a time-triggered transmission schedule from a network and traffic description.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Input network/traffic XML document.
    network: PathBuf,
    /// Output schedule XML document, written only if a schedule is found.
    schedule: PathBuf,
    /// Abort the CBC solve after this many seconds and report whatever it has found so far.
    #[clap(long)]
    cbc_seconds: Option<u32>,
    /// Also dump the solved network model as JSON to this path (requires the `serde` feature).
    #[clap(long)]
    dump_json: Option<PathBuf>,
}

fn main() -> ExitCode {
    pretty_env_logger::init_timed();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<(), SchedulerError> {
    let net = load(&cli.network)?;
    let net = driver::synthesize(net, cli.cbc_seconds)?;

    let out = File::create(&cli.schedule).map_err(ttsynth::error::InputError::Io)?;
    xml::write(&net, out)?;

    if let Some(json_path) = &cli.dump_json {
        dump_json(&net, json_path)?;
    }

    Ok(())
}

fn load(path: &PathBuf) -> Result<Network, SchedulerError> {
    let file = File::open(path).map_err(ttsynth::error::InputError::Io)?;
    let raw = xml::load(BufReader::new(file))?;
    let net = Network::new(
        raw.links,
        raw.frames,
        raw.hyperperiod,
        raw.hop_delay,
        raw.protocol_period,
        raw.protocol_time,
        raw.min_inter_frame_gap,
    )?;
    Ok(net)
}

#[cfg(feature = "serde")]
fn dump_json(net: &Network, json_path: &PathBuf) -> Result<(), SchedulerError> {
    let file = File::create(json_path).map_err(ttsynth::error::InputError::Io)?;
    serde_json::to_writer_pretty(file, net)
        .map_err(|e| ttsynth::error::InputError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
    Ok(())
}

#[cfg(not(feature = "serde"))]
fn dump_json(_net: &Network, _json_path: &PathBuf) -> Result<(), SchedulerError> {
    log::warn!("--dump-json was passed but this binary was built without the `serde` feature");
    Ok(())
}
