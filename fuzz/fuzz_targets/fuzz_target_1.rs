#![no_main]

use libfuzzer_sys::fuzz_target;
use mpeg2ts_assembler::packet::{AdaptationField, PacketHeader, Pid, PACKET_SIZE};
use mpeg2ts_assembler::{pes, PesAssembler};

fuzz_target!(|data: &[u8]| {
    // the PES header decoder is also exercised directly, since most fuzzed packets won't
    // survive long enough to reach it
    let _ = pes::PesHeader::parse(data);

    let mut assembler = PesAssembler::new(Pid::new(0x100));
    for pk in data.chunks(PACKET_SIZE) {
        let header = match PacketHeader::parse(pk) {
            Ok(h) => h,
            Err(_) => continue,
        };
        // follow whatever PID the first decodable packet is on
        if assembler.pid() != header.pid() && !assembler.is_assembling() {
            assembler.init(header.pid());
        }
        let af = match AdaptationField::parse(&pk[PacketHeader::SIZE..], header.adaptation_control()) {
            Ok(af) => af,
            Err(_) => continue,
        };
        if let Some(af) = af {
            let _ = af.stuffing_bytes();
        }
        assembler.absorb(pk, &header, af.as_ref());
    }
});
