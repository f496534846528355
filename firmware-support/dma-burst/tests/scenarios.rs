// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use dma_burst::burst_test::{self, BurstParams};
use dma_burst::registers::CsrError;
use dma_burst::sram::ADC_SRAM_BASE;
use dma_burst::{
    Backpressure, Csr, DmaBurstSoc, PassCount, Sram, StallPattern, StepOutcome, WordAddress,
    WriteRequest, ZeroSizePolicy,
};

use bus_common::{configure, run_burst, Recorder};


fn write(address: u32, data: u32) -> WriteRequest {
    WriteRequest {
        address: WordAddress::truncate(address),
        data,
    }
}

#[test]
fn four_word_burst_at_0x1000() {
    let mut soc = DmaBurstSoc::new(Recorder::default());
    configure(&mut soc, 4, 0x1000, 0);
    run_burst(&mut soc, 100);

    assert_eq!(
        soc.bus().writes,
        [
            write(0x400, 0),
            write(0x401, 0),
            write(0x402, 0),
            write(0x403, 0)
        ]
    );
    assert_eq!(soc.csr_read(Csr::Ready), 1);
    assert_eq!(soc.csr_read(Csr::PassCount), 1);
}

#[test]
fn rejected_write_is_offered_again() {
    let pattern: StallPattern = "script:0,0,2".parse().unwrap();
    let mut soc = DmaBurstSoc::new(Backpressure::new(Recorder::default(), pattern));
    configure(&mut soc, 4, 0, 0);

    soc.csr_write(Csr::Start, 1);
    assert_eq!(soc.step(), StepOutcome::Started { burst_size: 4 });
    assert_eq!(soc.step(), StepOutcome::Accepted(write(0, 0)));
    assert_eq!(soc.step(), StepOutcome::Accepted(write(1, 0)));
    for _ in 0..2 {
        assert_eq!(soc.step(), StepOutcome::Stalled(write(2, 0)));
        assert_eq!(soc.engine().words_written(), 2);
        assert_eq!(soc.csr_read(Csr::Ready), 0);
    }
    assert_eq!(soc.step(), StepOutcome::Accepted(write(2, 0)));
    assert_eq!(
        soc.step(),
        StepOutcome::Completed {
            request: write(3, 0),
            pass_count: PassCount::truncate(1),
        }
    );

    assert_eq!(soc.bus().inner().writes.len(), 4);
    assert_eq!(soc.bus().stall_cycles(), 2);
    assert_eq!(soc.bus().handshake_violations(), 0);
}

#[test]
fn pass_count_wraps_after_32_bursts() {
    let mut soc = DmaBurstSoc::new(Recorder::default());
    configure(&mut soc, 1, 0, 0);

    for pass in 0..32 {
        run_burst(&mut soc, 10);
        assert_eq!(soc.bus().writes.last().map(|w| w.data), Some(pass));
    }
    assert_eq!(soc.csr_read(Csr::PassCount), 0);

    run_burst(&mut soc, 10);
    assert_eq!(soc.bus().writes.last().map(|w| w.data), Some(0));
    assert_eq!(soc.csr_read(Csr::PassCount), 1);
}

#[test]
fn start_during_burst_is_dropped() {
    let mut soc = DmaBurstSoc::new(Recorder::default());
    configure(&mut soc, 4, 0, 0);

    soc.csr_write(Csr::Start, 1);
    soc.step();
    soc.step();
    soc.csr_write(Csr::Start, 1);
    soc.run(3);
    assert!(soc.engine().is_ready());

    for _ in 0..10 {
        assert_eq!(soc.step(), StepOutcome::Idle);
    }
    assert_eq!(soc.bus().writes.len(), 4);
    assert_eq!(soc.csr_read(Csr::PassCount), 1);
}

#[test]
fn start_on_last_write_is_dropped() {
    let mut soc = DmaBurstSoc::new(Recorder::default());
    configure(&mut soc, 2, 0, 0);

    soc.csr_write(Csr::Start, 1);
    soc.step();
    soc.step();
    soc.csr_write(Csr::Start, 1);
    assert!(matches!(soc.step(), StepOutcome::Completed { .. }));
    assert_eq!(soc.step(), StepOutcome::Idle);
    assert_eq!(soc.bus().writes.len(), 2);
}

#[test]
fn configuration_is_latched_at_start() {
    let mut soc = DmaBurstSoc::new(Recorder::default());
    configure(&mut soc, 4, 0x1000, 0);

    soc.csr_write(Csr::Start, 1);
    soc.step();
    configure(&mut soc, 10, 0x2000, 0x10);
    while !soc.engine().is_ready() {
        soc.step();
    }
    let first: Vec<u32> = soc.bus().writes.iter().map(|w| w.address.into()).collect();
    assert_eq!(first, [0x400, 0x401, 0x402, 0x403]);

    run_burst(&mut soc, 100);
    let second = &soc.bus().writes[4..];
    assert_eq!(second.len(), 10);
    assert_eq!(second[0], write(0x804, 1));
    assert_eq!(second[9], write(0x80d, 1));
}

#[test]
fn held_trigger_line_starts_one_burst() {
    let mut soc = DmaBurstSoc::new(Recorder::default());
    configure(&mut soc, 3, 0, 0);

    soc.set_trigger_line(true);
    soc.run(20);
    assert_eq!(soc.bus().writes.len(), 3);
    assert_eq!(soc.csr_read(Csr::PassCount), 1);

    soc.set_trigger_line(false);
    soc.step();
    soc.set_trigger_line(true);
    soc.run(10);
    assert_eq!(soc.bus().writes.len(), 6);
    assert_eq!(soc.csr_read(Csr::PassCount), 2);
}

#[test]
fn zero_size_burst_is_skipped() {
    let mut soc = DmaBurstSoc::new(Recorder::default());
    configure(&mut soc, 0, 0x1000, 0);

    soc.csr_write(Csr::Start, 1);
    assert_eq!(soc.step(), StepOutcome::EmptyBurst);
    assert_eq!(soc.csr_read(Csr::Ready), 1);
    soc.run(10);
    assert!(soc.bus().writes.is_empty());
    assert_eq!(soc.csr_read(Csr::PassCount), 0);
}

#[test]
fn zero_size_burst_as_single_word() {
    let mut soc =
        DmaBurstSoc::with_zero_size_policy(Recorder::default(), ZeroSizePolicy::SingleWord);
    configure(&mut soc, 0, 0x1000, 0);

    let outcomes = run_burst(&mut soc, 10);
    assert_eq!(outcomes.len(), 2);
    assert_eq!(soc.bus().writes, [write(0x400, 0)]);
    assert_eq!(soc.csr_read(Csr::PassCount), 1);
}

#[test]
fn burst_size_is_truncated_to_16_bits() {
    let mut soc = DmaBurstSoc::new(Recorder::default());
    configure(&mut soc, 0x1_0003, 0, 0);
    assert_eq!(soc.csr_read(Csr::BurstSize), 3);
    run_burst(&mut soc, 10);
    assert_eq!(soc.bus().writes.len(), 3);
}

#[test]
fn unknown_register_offset() {
    let mut soc = DmaBurstSoc::new(Recorder::default());
    assert_eq!(
        soc.csr_read_offset(0x18),
        Err(CsrError::UnknownRegister { offset: 0x18 })
    );
    assert_eq!(
        soc.csr_write_offset(0x40, 1),
        Err(CsrError::UnknownRegister { offset: 0x40 })
    );
}

#[test]
fn sram_holds_big_endian_pass_count() {
    let mut soc = DmaBurstSoc::new(Sram::<16>::new(0x1000));
    configure(&mut soc, 4, 0x1000, 4);
    run_burst(&mut soc, 10);
    run_burst(&mut soc, 10);

    let sram = soc.bus();
    assert_eq!(sram.word_bytes(WordAddress::truncate(0x400)), Some([0; 4]));
    assert_eq!(
        sram.word_bytes(WordAddress::truncate(0x401)),
        Some([0, 0, 0, 1])
    );
    assert_eq!(sram.read_byte_address(0x1010), Some(1));
    assert_eq!(sram.writes(), 8);
}

#[test]
fn burst_test_survives_random_backpressure() {
    let pattern: StallPattern = "random:3:7".parse().unwrap();
    let bus = Backpressure::new(Sram::<64>::new(ADC_SRAM_BASE), pattern);
    let mut soc = DmaBurstSoc::new(bus);

    let report = burst_test::run(&mut soc, &BurstParams::default(), 10_000).unwrap();
    assert_eq!(report.burst_size, 64);
    assert_eq!(report.pass_count, PassCount::truncate(1));
    assert_eq!(report.cycles, 1 + 64 + soc.bus().stall_cycles());
    assert_eq!(soc.bus().handshake_violations(), 0);
}
