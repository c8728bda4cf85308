use iai_callgrind::{library_benchmark, library_benchmark_group, main};
use mpeg2ts_assembler::packet::{AdaptationField, PacketHeader, Pid, PACKET_SIZE};
use mpeg2ts_assembler::{AbsorbOutcome, PesAssembler};

const PES_PID: u16 = 0x44;

/// audio PES packets of 1000 bytes each, one after another on `PES_PID`
fn synthesize_stream(units: usize) -> Vec<u8> {
    let mut unit = vec![0x00, 0x00, 0x01, 0xc0, 0x03, 0xe2, 0x80, 0x80, 0x05];
    unit.extend_from_slice(&[0x21, 0x00, 0x01, 0x00, 0x03]);
    unit.resize(1000, 0x55);

    let mut stream = Vec::new();
    let mut cc = 0u8;
    for _ in 0..units {
        for (i, chunk) in unit.chunks(184).enumerate() {
            let start = stream.len();
            stream.extend_from_slice(&[
                0x47,
                (if i == 0 { 0x40 } else { 0 }) | (PES_PID >> 8) as u8,
                PES_PID as u8,
            ]);
            if chunk.len() == 184 {
                stream.push(0x10 | cc);
            } else {
                let af_len = PACKET_SIZE - 5 - chunk.len();
                stream.extend_from_slice(&[0x30 | cc, af_len as u8]);
                if af_len > 0 {
                    stream.push(0);
                }
                stream.resize(start + 5 + af_len, 0xff);
            }
            stream.extend_from_slice(chunk);
            cc = (cc + 1) & 0xf;
        }
    }
    stream
}

#[library_benchmark]
fn assembler() -> usize {
    let buf = synthesize_stream(500);

    let mut assembler = PesAssembler::new(Pid::new(PES_PID));
    let mut finished = 0;
    for pk in std::hint::black_box(&buf[..]).chunks_exact(PACKET_SIZE) {
        let header = match PacketHeader::parse(pk) {
            Ok(h) => h,
            Err(_) => continue,
        };
        let af = match AdaptationField::parse(&pk[PacketHeader::SIZE..], header.adaptation_control())
        {
            Ok(af) => af,
            Err(_) => continue,
        };
        if let AbsorbOutcome::Finished { .. } = assembler.absorb(pk, &header, af.as_ref()) {
            finished += 1;
        }
    }
    finished
}

library_benchmark_group!(
    name = ci;
    benchmarks = assembler
);

main!(library_benchmark_groups = ci);
