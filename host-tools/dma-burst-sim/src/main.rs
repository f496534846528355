// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0
use clap::{Args, Parser, Subcommand};
use dma_burst::burst_test;
use dma_burst::sram::{ADC_SRAM_BASE, ADC_SRAM_WORDS};
use dma_burst::{Backpressure, DmaBurstSoc, Sram};
use log::info;
use std::{
    fmt::{Debug, Display},
    io::{stdin, stdout, Error as IoError, ErrorKind as IoErrorKind, Result as IoResult},
    num::ParseIntError,
    path::PathBuf,
};

macro_rules! other_io_error {
    ($litstr:literal) => {
        IoError::new(IoErrorKind::Other, $litstr)
    };
    ($($other:tt)*) => {
        IoError::new(IoErrorKind::Other, format!($($other)*))
    };
}

mod config;
mod console;

use config::{SimConfig, ZeroSize};
use console::Console;

type SimSoc = DmaBurstSoc<Backpressure<Sram<ADC_SRAM_WORDS>>>;

/// Cycle-stepped simulator of the Wishbone DMA burst test engine.
#[derive(Parser)]
#[command(version, about)]
struct Clap {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the burst test and verify the SRAM contents.
    Run(RunArgs),
    /// Interactive console, like the SoC's firmware shell.
    Console(SimArgs),
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    sim: SimArgs,
    /// Number of bursts to run back to back.
    #[arg(short, long)]
    passes: Option<u32>,
}

#[derive(Args)]
struct SimArgs {
    /// JSON file with simulation settings.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Words per burst.
    #[arg(short = 's', long)]
    burst_size: Option<u16>,
    /// Byte address of the target region.
    #[arg(short, long, value_parser = parse_addr)]
    base: Option<u32>,
    /// Byte offset added to the base address.
    #[arg(short, long, value_parser = parse_addr)]
    offset: Option<u32>,
    /// SRAM backpressure: never, fixed:N, script:A,B,..., random:MAX:SEED or forever.
    #[arg(long)]
    stall: Option<String>,
    /// Cycles to wait for `ready` before giving up.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    poll_budget: Option<u64>,
    /// How a start pulse with burst size 0 is handled.
    #[arg(long, value_enum)]
    zero_size: Option<ZeroSize>,
}

impl SimArgs {
    /// Load the config file, if any, and apply the command line on top.
    fn load_config(&self) -> IoResult<SimConfig> {
        let mut config = SimConfig::load(self.config.as_deref())?;
        if let Some(burst_size) = self.burst_size {
            config.burst_size = burst_size;
        }
        if let Some(base) = self.base {
            config.base = base;
        }
        if let Some(offset) = self.offset {
            config.offset = offset;
        }
        if let Some(stall) = &self.stall {
            config.stall.clone_from(stall);
        }
        if let Some(poll_budget) = self.poll_budget {
            config.poll_budget = poll_budget;
        }
        if let Some(zero_size) = self.zero_size {
            config.zero_size = zero_size;
        }
        config.check()?;
        Ok(config)
    }
}

pub(crate) fn parse_addr(addr: &str) -> Result<u32, ParseIntError> {
    const BIN_PREFIXES: [&str; 4] = ["0b", "0B", "b", "B"];
    const OCT_PREFIXES: [&str; 4] = ["0o", "0O", "o", "O"];
    const HEX_PREFIXES: [&str; 4] = ["0x", "0X", "x", "X"];
    if let Some(pfx) = BIN_PREFIXES.into_iter().find(|&pfx| addr.starts_with(pfx)) {
        u32::from_str_radix(&addr[pfx.len()..], 2)
    } else if let Some(pfx) = OCT_PREFIXES.into_iter().find(|&pfx| addr.starts_with(pfx)) {
        u32::from_str_radix(&addr[pfx.len()..], 8)
    } else if let Some(pfx) = HEX_PREFIXES.into_iter().find(|&pfx| addr.starts_with(pfx)) {
        u32::from_str_radix(&addr[pfx.len()..], 16)
    } else {
        addr.parse()
    }
}

trait IntoIoResult<T> {
    fn into_io_result(self, prefix: impl AsRef<str>) -> IoResult<T>;
}

impl<T, E: Debug + Display> IntoIoResult<T> for Result<T, E> {
    fn into_io_result(self, prefix: impl AsRef<str>) -> IoResult<T> {
        self.map_err(|err| other_io_error!("{}\nShort: {err}\nLong: {err:?}", prefix.as_ref()))
    }
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
    let stdout_subscriber = tracing_subscriber::fmt::layer()
        .compact()
        .without_time()
        .with_filter(
            // No default, use RUST_LOG or fall back to WARN.
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
                .from_env_lossy(),
        );

    tracing_subscriber::registry()
        .with(stdout_subscriber)
        .init();
}

fn build_soc(config: &SimConfig) -> IoResult<SimSoc> {
    let pattern = config
        .stall_pattern()
        .into_io_result(format!("Invalid stall pattern '{}'", config.stall))?;
    info!("SRAM at {:#010x}, stall pattern {}", ADC_SRAM_BASE, pattern);
    let bus = Backpressure::new(Sram::new(ADC_SRAM_BASE), pattern);
    Ok(DmaBurstSoc::with_zero_size_policy(
        bus,
        config.zero_size.into(),
    ))
}

fn run(args: RunArgs) -> IoResult<()> {
    let mut config = args.sim.load_config()?;
    if let Some(passes) = args.passes {
        config.passes = passes;
    }
    if config.passes == 0 {
        return Err(other_io_error!("Number of passes must be at least 1"));
    }

    let mut soc = build_soc(&config)?;
    let params = config.params();
    for pass in 0..config.passes {
        let report = burst_test::run(&mut soc, &params, config.poll_budget)
            .into_io_result(format!("Burst test failed in pass {pass}"))?;
        println!(
            "pass {pass}: {} words at {:#010x}, payload {}, pass_count {}, {} cycles",
            report.burst_size,
            report.start.into_underlying() << 2,
            report.payload,
            report.pass_count,
            report.cycles,
        );
    }

    let bus = soc.bus();
    println!(
        "{} passes ok, {} cycles total, {} stall cycles, {} writes dropped",
        config.passes,
        soc.cycle(),
        bus.stall_cycles(),
        bus.inner().dropped(),
    );
    if bus.handshake_violations() != 0 {
        return Err(other_io_error!(
            "Engine changed {} requests while stalled",
            bus.handshake_violations()
        ));
    }
    Ok(())
}

fn console(args: SimArgs) -> IoResult<()> {
    let config = args.load_config()?;
    let soc = build_soc(&config)?;
    let mut console = Console::new(soc, config.params(), config.poll_budget);
    console.run(stdin().lock(), stdout().lock())?;
    info!("Console closed after {} cycles", console.soc().cycle());
    Ok(())
}

fn main() -> IoResult<()> {
    init_logging();
    match Clap::parse().command {
        Command::Run(args) => run(args),
        Command::Console(args) => console(args),
    }
}
