// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Line-based console in the style of the SoC's `RUNTIME>` firmware shell.

use std::fmt;
use std::io::{BufRead, Result as IoResult, Write};
use std::str::{FromStr, SplitWhitespace};

use dma_burst::burst_test::{self, BurstParams};
use dma_burst::{BusWriter, Csr, DmaBurstSoc, MemoryReadback, WordAddress};

use crate::parse_addr;

pub const PROMPT: &str = "RUNTIME>";

const HELP: &[(&str, &str)] = &[
    ("help", "this command"),
    ("reboot", "reboot CPU"),
    ("workaround", "same as wishbone, the simulation has no CPU cache"),
    ("wishbone [size] [offset]", "wishbone dma test"),
    ("status", "show engine state"),
    ("read <reg>", "read a register by name or offset"),
    ("write <reg> <value>", "write a register by name or offset"),
    ("step [n]", "advance n clock cycles"),
    ("dump <addr> <count>", "print count words of memory"),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Reboot,
    Workaround,
    Wishbone {
        burst_size: Option<u16>,
        offset: Option<u32>,
    },
    Status,
    Read(Csr),
    Write(Csr, u32),
    Step(u32),
    Dump {
        start: u32,
        count: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandParseError {
    Empty,
    UnknownCommand(String),
    UnknownRegister(String),
    MissingArgument(&'static str),
    InvalidNumber(String),
    UnexpectedArgument(String),
}

impl fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandParseError::Empty => write!(f, "empty command"),
            CommandParseError::UnknownCommand(cmd) => {
                write!(f, "unknown command '{cmd}', try 'help'")
            }
            CommandParseError::UnknownRegister(reg) => write!(f, "unknown register '{reg}'"),
            CommandParseError::MissingArgument(arg) => write!(f, "missing argument <{arg}>"),
            CommandParseError::InvalidNumber(s) => write!(f, "'{s}' is not a valid number"),
            CommandParseError::UnexpectedArgument(s) => write!(f, "unexpected argument '{s}'"),
        }
    }
}

fn number(token: &str) -> Result<u32, CommandParseError> {
    parse_addr(token).map_err(|_| CommandParseError::InvalidNumber(token.to_string()))
}

fn burst_size(token: &str) -> Result<u16, CommandParseError> {
    u16::try_from(number(token)?).map_err(|_| CommandParseError::InvalidNumber(token.to_string()))
}

fn required<'a>(
    tokens: &mut SplitWhitespace<'a>,
    arg: &'static str,
) -> Result<&'a str, CommandParseError> {
    tokens.next().ok_or(CommandParseError::MissingArgument(arg))
}

fn register(token: &str) -> Result<Csr, CommandParseError> {
    Csr::from_name(token)
        .or_else(|| parse_addr(token).ok().and_then(Csr::from_offset))
        .ok_or_else(|| CommandParseError::UnknownRegister(token.to_string()))
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or(CommandParseError::Empty)?;

        let command = match name {
            "help" => Command::Help,
            "reboot" => Command::Reboot,
            "workaround" => Command::Workaround,
            "status" => Command::Status,
            "read" => Command::Read(register(required(&mut tokens, "reg")?)?),
            "write" => {
                let csr = register(required(&mut tokens, "reg")?)?;
                Command::Write(csr, number(required(&mut tokens, "value")?)?)
            }
            "dump" => {
                let start = number(required(&mut tokens, "addr")?)?;
                Command::Dump {
                    start,
                    count: number(required(&mut tokens, "count")?)?,
                }
            }
            "wishbone" => Command::Wishbone {
                burst_size: tokens.next().map(burst_size).transpose()?,
                offset: tokens.next().map(number).transpose()?,
            },
            "step" => Command::Step(tokens.next().map(number).transpose()?.unwrap_or(1)),
            _ => return Err(CommandParseError::UnknownCommand(name.to_string())),
        };

        match tokens.next() {
            Some(extra) => Err(CommandParseError::UnexpectedArgument(extra.to_string())),
            None => Ok(command),
        }
    }
}

/// Executes console commands against a simulated SoC.
pub struct Console<B> {
    soc: DmaBurstSoc<B>,
    params: BurstParams,
    poll_budget: u64,
}

impl<B: BusWriter + MemoryReadback> Console<B> {
    /// `params` are used by `wishbone` for everything not given on the
    /// command line.
    pub fn new(soc: DmaBurstSoc<B>, params: BurstParams, poll_budget: u64) -> Self {
        Console {
            soc,
            params,
            poll_budget,
        }
    }

    pub fn soc(&self) -> &DmaBurstSoc<B> {
        &self.soc
    }

    /// Read commands from `input` until it is exhausted.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> IoResult<()> {
        writeln!(out, "\nDMA burst simulator")?;
        self.help(&mut out)?;
        write!(out, "{PROMPT}")?;
        out.flush()?;

        for line in input.lines() {
            match line?.parse::<Command>() {
                Ok(command) => self.execute(command, &mut out)?,
                Err(CommandParseError::Empty) => {}
                Err(err) => writeln!(out, "{err}")?,
            }
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
        writeln!(out)
    }

    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> IoResult<()> {
        match command {
            Command::Help => self.help(out),
            Command::Reboot => {
                self.soc.reset();
                writeln!(out, "CPU reset")
            }
            Command::Workaround => {
                writeln!(out, "wishbone burst test with workaround...")?;
                self.wishbone(self.params, out)
            }
            Command::Wishbone { burst_size, offset } => {
                let params = BurstParams {
                    burst_size: burst_size.unwrap_or(self.params.burst_size),
                    address_offset: offset.unwrap_or(self.params.address_offset),
                    ..self.params
                };
                self.wishbone(params, out)
            }
            Command::Status => {
                let engine = self.soc.engine();
                writeln!(out, "state:         {:?}", engine.state())?;
                writeln!(out, "words_written: {}", engine.words_written())?;
                writeln!(out, "pass_count:    {}", engine.pass_count())?;
                writeln!(out, "cycle:         {}", self.soc.cycle())
            }
            Command::Read(csr) => {
                writeln!(out, "{csr} = {:#010x}", self.soc.csr_read(csr))
            }
            Command::Write(csr, value) => {
                self.soc.csr_write(csr, value);
                Ok(())
            }
            Command::Step(cycles) => {
                self.soc.run(cycles as u64);
                writeln!(out, "cycle {}", self.soc.cycle())
            }
            Command::Dump { start, count } => {
                let first = WordAddress::truncate(start >> 2);
                for i in 0..count {
                    let address = first.wrapping_add_u32(i);
                    let byte_address = address.into_underlying() << 2;
                    match self.soc.bus().read_word(address) {
                        Some(word) => writeln!(out, "{byte_address:#010x}: {word:#010x}")?,
                        None => writeln!(out, "{byte_address:#010x}: unmapped")?,
                    }
                }
                Ok(())
            }
        }
    }

    fn help(&self, out: &mut impl Write) -> IoResult<()> {
        writeln!(out, "Available commands:")?;
        for (usage, description) in HELP {
            writeln!(out, "{usage:<32}- {description}")?;
        }
        Ok(())
    }

    fn wishbone(&mut self, params: BurstParams, out: &mut impl Write) -> IoResult<()> {
        writeln!(out, "wishbone burst test...")?;
        writeln!(out, "waiting for ready!")?;
        match burst_test::run(&mut self.soc, &params, self.poll_budget) {
            Ok(report) => {
                writeln!(out, "memory readback!")?;
                for i in 0..report.burst_size {
                    let address = report.start.wrapping_add_u32(i as u32);
                    let word = self.soc.bus().read_word(address).unwrap_or_default();
                    writeln!(out, "memory[{i}]: {word}")?;
                }
                writeln!(out, "done after {} cycles", report.cycles)
            }
            Err(err) => writeln!(out, "burst test failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dma_burst::sram::ADC_SRAM_BASE;
    use dma_burst::Sram;

    fn console() -> Console<Sram<128>> {
        let soc = DmaBurstSoc::new(Sram::new(ADC_SRAM_BASE));
        Console::new(soc, BurstParams::default(), 1000)
    }

    fn run_script(console: &mut Console<Sram<128>>, script: &str) -> String {
        let mut out = Vec::new();
        console.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("help".parse::<Command>(), Ok(Command::Help));
        assert_eq!("  reboot ".parse::<Command>(), Ok(Command::Reboot));
        assert_eq!(
            "wishbone".parse::<Command>(),
            Ok(Command::Wishbone {
                burst_size: None,
                offset: None
            })
        );
        assert_eq!(
            "wishbone 16 0x40".parse::<Command>(),
            Ok(Command::Wishbone {
                burst_size: Some(16),
                offset: Some(0x40)
            })
        );
        assert_eq!("read ready".parse::<Command>(), Ok(Command::Read(Csr::Ready)));
        assert_eq!("read 0x14".parse::<Command>(), Ok(Command::Read(Csr::PassCount)));
        assert_eq!(
            "write burst_size 0b101".parse::<Command>(),
            Ok(Command::Write(Csr::BurstSize, 5))
        );
        assert_eq!("step".parse::<Command>(), Ok(Command::Step(1)));
        assert_eq!("step 100".parse::<Command>(), Ok(Command::Step(100)));
        assert_eq!(
            "dump 0x30000000 4".parse::<Command>(),
            Ok(Command::Dump {
                start: 0x3000_0000,
                count: 4
            })
        );
    }

    #[test]
    fn rejects_bad_commands() {
        assert_eq!("".parse::<Command>(), Err(CommandParseError::Empty));
        assert_eq!(
            "flash".parse::<Command>(),
            Err(CommandParseError::UnknownCommand("flash".to_string()))
        );
        assert_eq!(
            "read".parse::<Command>(),
            Err(CommandParseError::MissingArgument("reg"))
        );
        assert_eq!(
            "read status".parse::<Command>(),
            Err(CommandParseError::UnknownRegister("status".to_string()))
        );
        assert_eq!(
            "write base".parse::<Command>(),
            Err(CommandParseError::MissingArgument("value"))
        );
        assert_eq!(
            "wishbone 70000".parse::<Command>(),
            Err(CommandParseError::InvalidNumber("70000".to_string()))
        );
        assert_eq!(
            "help me".parse::<Command>(),
            Err(CommandParseError::UnexpectedArgument("me".to_string()))
        );
    }

    #[test]
    fn wishbone_test_prints_readback() {
        let mut console = console();
        let out = run_script(&mut console, "wishbone\nread pass_count\n");
        assert!(out.contains("waiting for ready!"));
        assert!(out.contains("memory[0]: 0\n"));
        assert!(out.contains("memory[63]: 0\n"));
        assert!(out.contains("pass_count = 0x00000001"));
        assert!(out.ends_with(&format!("{PROMPT}\n")));
    }

    #[test]
    fn register_poke_and_step() {
        let mut console = console();
        let script = "write burst_size 2\nwrite base 0x30000000\nwrite start 1\nstep 3\n\
                      read ready\ndump 0x30000000 3\n";
        let out = run_script(&mut console, script);
        assert!(out.contains("cycle 3"));
        assert!(out.contains("ready = 0x00000001"));
        assert!(out.contains("0x30000000: 0x00000000"));
        assert_eq!(console.soc().csr_read(Csr::PassCount), 1);
    }

    #[test]
    fn reboot_resets_pass_count() {
        let mut console = console();
        run_script(&mut console, "wishbone 4\nwishbone 4\n");
        assert_eq!(console.soc().csr_read(Csr::PassCount), 2);
        let out = run_script(&mut console, "reboot\nstatus\n");
        assert!(out.contains("CPU reset"));
        assert!(out.contains("pass_count:    0"));
        assert_eq!(console.soc().cycle(), 0);
    }

    #[test]
    fn workaround_runs_the_default_test() {
        let mut console = console();
        let out = run_script(&mut console, "workaround\n");
        assert!(out.contains("wishbone burst test with workaround..."));
        assert!(out.contains("memory[63]: 0\n"));
        assert_eq!(console.soc().csr_read(Csr::PassCount), 1);
    }

    #[test]
    fn failures_are_reported_not_fatal() {
        let mut console = console();
        let out = run_script(&mut console, "wishbone 0\nbogus\nhelp\n");
        assert!(out.contains("burst test failed: burst size is 0"));
        assert!(out.contains("unknown command 'bogus'"));
        assert!(out.matches("Available commands:").count() == 2);
    }
}
