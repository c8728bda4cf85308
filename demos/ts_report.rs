//! Prints the header and adaptation field of every packet in a transport stream file, and the
//! progress of PES packet reassembly for one PID.
//!
//! ```text
//! cargo run --example ts_report -- <file.ts> [pid]
//! ```
//!
//! The PID defaults to 136, and may be given in decimal or as `0x`-prefixed hex.

use fixedbitset::FixedBitSet;
use hex_slice::AsHex;
use mpeg2ts_assembler::packet::{AdaptationField, ClockRef, PacketHeader, Pid, PACKET_SIZE};
use mpeg2ts_assembler::{AbsorbOutcome, PesAssembler};
use std::cmp;
use std::env;
use std::fs::File;
use std::io::{self, Read};
use std::process;

const DEFAULT_PID: u16 = 136;

fn parse_pid(arg: &str) -> Option<Pid> {
    let val = match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok()?,
        None => arg.parse().ok()?,
    };
    Pid::try_from(val).ok()
}

fn format_clock(clock: ClockRef) -> String {
    format!(
        "base={} ext={} ({})",
        clock.base(),
        clock.extension(),
        u64::from(clock)
    )
}

fn report_adaptation_field(af: &AdaptationField<'_>) {
    println!(
        "    adaptation_field length={} discontinuity={} random_access={} es_priority={} stuffing={}",
        af.length(),
        af.discontinuity_indicator(),
        af.random_access_indicator(),
        af.elementary_stream_priority_indicator(),
        af.stuffing_bytes()
    );
    if let Some(pcr) = af.pcr() {
        println!("    PCR {}", format_clock(pcr));
    }
    if let Some(opcr) = af.opcr() {
        println!("    OPCR {}", format_clock(opcr));
    }
    if let Some(countdown) = af.splice_countdown() {
        println!("    splice_countdown={}", countdown);
    }
    if let Some(data) = af.transport_private_data() {
        println!("    transport_private_data {:02x}", data.plain_hex(false));
    }
    if let Some(ext) = af.adaptation_field_extension() {
        println!("    adaptation_field_extension {} bytes", ext.len());
    }
}

#[derive(Default)]
struct Summary {
    packets: usize,
    errors: usize,
    finished: usize,
    lost: usize,
}

fn report_packet(
    index: usize,
    pk: &[u8],
    assembler: &mut PesAssembler,
    pids: &mut FixedBitSet,
    summary: &mut Summary,
) {
    let header = match PacketHeader::parse(pk) {
        Ok(h) => h,
        Err(e) => {
            println!("#{}: error: {}", index, e);
            summary.errors += 1;
            return;
        }
    };
    pids.insert(usize::from(header.pid()));
    println!(
        "#{}: {:?}{} tei={} pusi={} priority={} {:?} {:?} cc={}",
        index,
        header.pid(),
        header
            .pid()
            .well_known_name()
            .map(|n| format!(" ({})", n))
            .unwrap_or_default(),
        header.transport_error_indicator(),
        header.payload_unit_start_indicator(),
        header.transport_priority(),
        header.transport_scrambling_control(),
        header.adaptation_control(),
        header.continuity_counter().count()
    );
    // an undecodable adaptation field leaves the payload position unknown, but the packet
    // still goes to the assembler so that its continuity counter is tracked
    let af = match AdaptationField::parse(&pk[PacketHeader::SIZE..], header.adaptation_control())
    {
        Ok(af) => af,
        Err(e) => {
            println!("    error: {}", e);
            summary.errors += 1;
            None
        }
    };
    if let Some(ref af) = af {
        report_adaptation_field(af);
    }
    match assembler.absorb(pk, &header, af.as_ref()) {
        AbsorbOutcome::WrongTarget => (),
        AbsorbOutcome::Lost => {
            summary.lost += 1;
            println!("    PES: lost");
        }
        AbsorbOutcome::Started(pes) => {
            println!(
                "    PES: started {:?} length={:?} pts={:?} dts={:?}",
                pes.stream_id(),
                pes.pes_packet_length(),
                pes.pts().map(|t| t.value()),
                pes.dts().map(|t| t.value())
            );
        }
        AbsorbOutcome::Continuing => println!("    PES: continuing, {} bytes", assembler.len()),
        AbsorbOutcome::Finished { len } => {
            summary.finished += 1;
            let expected = assembler.header().and_then(|h| h.total_len());
            println!(
                "    PES: finished, {} bytes (expected {:?}{}) {:02x}",
                len,
                expected,
                if expected == Some(len) { "" } else { ", MISMATCH" },
                assembler.packet()[..cmp::min(len, 16)].plain_hex(false)
            );
        }
    }
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = env::args().skip(1);
    let name = match args.next() {
        Some(name) => name,
        None => {
            eprintln!("usage: ts_report <file.ts> [pid]");
            process::exit(1);
        }
    };
    let pid = match args.next() {
        Some(arg) => match parse_pid(&arg) {
            Some(pid) => pid,
            None => {
                eprintln!("invalid pid {:?}", arg);
                process::exit(1);
            }
        },
        None => Pid::new(DEFAULT_PID),
    };
    let mut f = File::open(&name)?;

    let mut assembler = PesAssembler::new(pid);
    let mut pids = FixedBitSet::with_capacity(Pid::PID_COUNT);
    let mut summary = Summary::default();
    let mut buf = vec![0u8; PACKET_SIZE * 1024];
    let mut pending = 0;
    loop {
        let n = f.read(&mut buf[pending..])?;
        if n == 0 {
            break;
        }
        let available = pending + n;
        let whole = available - available % PACKET_SIZE;
        for pk in buf[..whole].chunks_exact(PACKET_SIZE) {
            report_packet(summary.packets, pk, &mut assembler, &mut pids, &mut summary);
            summary.packets += 1;
        }
        buf.copy_within(whole..available, 0);
        pending = available - whole;
    }
    if pending > 0 {
        println!("ignoring trailing partial packet of {} bytes", pending);
    }
    println!(
        "{} packets, {} distinct PIDs, {} errors, {} PES packets finished on {:?}, {} losses",
        summary.packets,
        pids.count_ones(..),
        summary.errors,
        summary.finished,
        pid,
        summary.lost
    );
    Ok(())
}
