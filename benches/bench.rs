use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use mpeg2ts_assembler::packet::{AdaptationField, PacketHeader, Pid, PACKET_SIZE};
use mpeg2ts_assembler::{AbsorbOutcome, PesAssembler};

const PES_PID: u16 = 0x100;
const PES_LEN: usize = 20_000;

/// A stream of video PES packets on `PES_PID`, interleaved with null packets, with a PCR in the
/// adaptation field at each unit start.
fn synthesize_stream(units: usize) -> Vec<u8> {
    let mut unit = vec![0x00, 0x00, 0x01, 0xe0, 0x00, 0x00, 0x80, 0xc0, 0x0a];
    unit.extend_from_slice(&[0x31, 0x00, 0x01, 0x00, 0x01, 0x11, 0x00, 0x01, 0x00, 0x01]);
    unit.resize(PES_LEN, 0xaa);
    let declared = (PES_LEN - 6) as u16;
    unit[4] = (declared >> 8) as u8;
    unit[5] = declared as u8;

    let mut stream = Vec::new();
    let mut cc = 0u8;
    for _ in 0..units {
        // 176 byte chunks leave room in each packet for an adaptation field holding a PCR
        for (i, chunk) in unit.chunks(176).enumerate() {
            let start = stream.len();
            let af_len = PACKET_SIZE - 5 - chunk.len();
            stream.extend_from_slice(&[
                0x47,
                (if i == 0 { 0x40 } else { 0 }) | (PES_PID >> 8) as u8,
                PES_PID as u8,
                0x30 | cc,
                af_len as u8,
                if i == 0 { 0x10 } else { 0 },
            ]);
            stream.resize(start + 5 + af_len, 0xff);
            stream.extend_from_slice(chunk);
            cc = (cc + 1) & 0xf;

            // null packet
            stream.extend_from_slice(&[0x47, 0x1f, 0xff, 0x10]);
            stream.resize(stream.len() + 184, 0xff);
        }
    }
    stream
}

fn assemble(stream: &[u8]) -> usize {
    let mut assembler = PesAssembler::new(Pid::new(PES_PID));
    let mut finished = 0;
    for pk in stream.chunks_exact(PACKET_SIZE) {
        let header = match PacketHeader::parse(pk) {
            Ok(h) => h,
            Err(_) => continue,
        };
        let af = match AdaptationField::parse(&pk[PacketHeader::SIZE..], header.adaptation_control())
        {
            Ok(af) => af,
            Err(_) => continue,
        };
        if let AbsorbOutcome::Finished { len } = assembler.absorb(pk, &header, af.as_ref()) {
            finished += len;
        }
    }
    finished
}

fn mpeg2ts_assembler(c: &mut Criterion) {
    let buf = synthesize_stream(200);
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(buf.len() as u64));
    group.bench_function("assemble", |b| {
        b.iter(|| assemble(criterion::black_box(&buf[..])));
    });
    group.finish();
}

criterion_group!(benches, mpeg2ts_assembler);
criterion_main!(benches);
