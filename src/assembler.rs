//! Reassembly of complete PES packets from the payloads of the transport stream packets that
//! carry them.
//!
//! A [`PesAssembler`](struct.PesAssembler.html) tracks a single PID.  Each transport stream
//! packet is handed to [`absorb()`](struct.PesAssembler.html#method.absorb), which reports what
//! happened as an [`AbsorbOutcome`](enum.AbsorbOutcome.html).  The bytes collected so far are
//! then available from [`packet()`](struct.PesAssembler.html#method.packet).

use crate::packet::{AdaptationField, ContinuityCounter, PacketHeader, Pid, PACKET_SIZE};
use crate::pes::PesHeader;
use log::{debug, warn};
use std::collections::TryReserveError;

/// Owned, growable storage for the bytes of the PES packet being assembled.
///
/// Capacity grows by doubling, and never to less than
/// [`MIN_CAPACITY`](#associatedconstant.MIN_CAPACITY) bytes.  Allocation is fallible, so a
/// failed append leaves the buffer as it was rather than aborting the process.
#[derive(Debug, Default)]
pub struct AssemblyBuffer {
    data: Vec<u8>,
}
impl AssemblyBuffer {
    /// The smallest allocation made by the first `append()`.
    pub const MIN_CAPACITY: usize = 1024;

    /// Create an empty buffer, with no storage allocated yet.
    pub fn new() -> AssemblyBuffer {
        AssemblyBuffer { data: Vec::new() }
    }

    /// Copy `bytes` onto the end of the buffer.
    ///
    /// If more storage is needed but cannot be allocated, the error is returned and the buffer
    /// content is unchanged.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), TryReserveError> {
        let required = self.data.len() + bytes.len();
        if required > self.data.capacity() {
            let new_capacity = (self.data.capacity() * 2)
                .max(required)
                .max(Self::MIN_CAPACITY);
            self.data.try_reserve_exact(new_capacity - self.data.len())?;
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Discard the content, retaining the allocated storage for reuse.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes that may be held before the next reallocation.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The bytes held.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }
}

/// The result of passing one transport stream packet to
/// [`PesAssembler::absorb()`](struct.PesAssembler.html#method.absorb).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsorbOutcome {
    /// The packet does not belong to the assembler's PID, or it starts a unit whose PES header
    /// could not be decoded.
    WrongTarget,
    /// The packet could not be used: either continuity with the previous packet was lost, or
    /// it continues a unit whose start was never seen.  Any partially assembled unit has been
    /// discarded.
    Lost,
    /// A new PES packet began, with the given header.
    Started(PesHeader),
    /// More bytes of the current PES packet were collected (or the packet carried no payload),
    /// but the PES packet is not yet complete.
    Continuing,
    /// All bytes of the PES packet declared by the header's _PES_packet_length_ have been
    /// collected.
    Finished {
        /// The number of bytes now available from
        /// [`PesAssembler::packet()`](struct.PesAssembler.html#method.packet)
        len: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssemblerState {
    Idle,
    Assembling,
}

/// Collects the payloads of the transport stream packets of one PID into whole PES packets.
///
/// The assembler starts out idle.  A packet with `payload_unit_start_indicator` set, whose
/// payload begins with a valid PES header, starts a new unit; subsequent packets with the
/// expected continuity counter values extend it.  A gap in continuity counter values
/// discards the unit, and the assembler waits for the next unit start.
///
/// A unit with an unbounded _PES_packet_length_ never reports
/// [`Finished`](enum.AbsorbOutcome.html#variant.Finished); its bytes can be read from
/// [`packet()`](#method.packet) before handing over the packet that starts the next unit.
#[derive(Debug)]
pub struct PesAssembler {
    pid: Pid,
    buffer: AssemblyBuffer,
    last_counter: Option<ContinuityCounter>,
    header: Option<PesHeader>,
    state: AssemblerState,
}
impl PesAssembler {
    /// Create an idle assembler which will collect PES packets carried on the given PID.
    pub fn new(pid: Pid) -> PesAssembler {
        PesAssembler {
            pid,
            buffer: AssemblyBuffer::new(),
            last_counter: None,
            header: None,
            state: AssemblerState::Idle,
        }
    }

    /// Discard any partially assembled unit and any continuity state, and start collecting
    /// PES packets on the given PID instead.
    pub fn init(&mut self, pid: Pid) {
        self.pid = pid;
        self.last_counter = None;
        self.reset();
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.header = None;
        self.state = AssemblerState::Idle;
    }

    fn is_continuous(&self, header: &PacketHeader) -> bool {
        match self.last_counter {
            Some(cc) if header.adaptation_control().has_payload() => {
                header.continuity_counter().follows(cc)
            }
            Some(cc) => header.continuity_counter() == cc,
            None => true,
        }
    }

    /// Process one transport stream packet.
    ///
    /// `packet` holds the whole packet, `header` is the header decoded from it, and
    /// `adaptation_field` is the adaptation field decoded from it (if the header indicates
    /// that one is present).  Passing `None` for a packet that does have an adaptation field
    /// treats the packet as carrying no payload, while still tracking its continuity counter.
    ///
    /// If the buffer cannot grow to hold the payload, the payload bytes are dropped and a
    /// warning is logged, but the outcome is otherwise unaffected.
    pub fn absorb(
        &mut self,
        packet: &[u8],
        header: &PacketHeader,
        adaptation_field: Option<&AdaptationField<'_>>,
    ) -> AbsorbOutcome {
        if header.pid() != self.pid {
            return AbsorbOutcome::WrongTarget;
        }
        if self.state == AssemblerState::Assembling && !self.is_continuous(header) {
            debug!(
                "{:?}: continuity lost, last={:?} this={} ({:?})",
                self.pid,
                self.last_counter.map(|cc| cc.count()),
                header.continuity_counter().count(),
                header.adaptation_control()
            );
            self.reset();
            return AbsorbOutcome::Lost;
        }
        if header.adaptation_control().has_payload() {
            self.last_counter = Some(header.continuity_counter());
        }
        let end = packet.len().min(PACKET_SIZE);
        let payload = match header
            .payload_offset(adaptation_field)
            .and_then(|offset| packet.get(offset..end))
        {
            Some(payload) => payload,
            None => {
                return if self.state == AssemblerState::Assembling {
                    AbsorbOutcome::Continuing
                } else {
                    AbsorbOutcome::Lost
                };
            }
        };
        if header.payload_unit_start_indicator() {
            self.reset();
            let pes_header = match PesHeader::parse(payload) {
                Ok(h) => h,
                Err(e) => {
                    warn!("{:?}: ignoring unit start: {}", self.pid, e);
                    return AbsorbOutcome::WrongTarget;
                }
            };
            self.append(payload);
            self.header = Some(pes_header);
            self.state = AssemblerState::Assembling;
            match pes_header.total_len() {
                Some(total) if total <= payload.len() => AbsorbOutcome::Finished {
                    len: self.buffer.len(),
                },
                _ => AbsorbOutcome::Started(pes_header),
            }
        } else if self.state == AssemblerState::Assembling {
            self.append(payload);
            if self.is_complete() {
                AbsorbOutcome::Finished {
                    len: self.buffer.len(),
                }
            } else {
                AbsorbOutcome::Continuing
            }
        } else {
            AbsorbOutcome::Lost
        }
    }

    fn append(&mut self, payload: &[u8]) {
        if let Err(e) = self.buffer.append(payload) {
            warn!(
                "{:?}: dropping {} payload bytes, buffer holding {} could not grow: {}",
                self.pid,
                payload.len(),
                self.buffer.len(),
                e
            );
        }
    }

    fn is_complete(&self) -> bool {
        match self.header.and_then(|h| h.total_len()) {
            Some(total) => self.buffer.len() >= total,
            None => false,
        }
    }

    /// The PID whose packets this assembler collects.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// The header of the PES packet currently being assembled, if any.
    pub fn header(&self) -> Option<&PesHeader> {
        self.header.as_ref()
    }

    /// The bytes of the PES packet collected so far, starting with its header.
    pub fn packet(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// The number of bytes collected so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// `true` if no bytes have been collected.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// `true` between the start of a unit and the next loss of continuity.
    pub fn is_assembling(&self) -> bool {
        self.state == AssemblerState::Assembling
    }
}

#[cfg(test)]
mod test {
    use crate::assembler::*;
    use crate::packet::{AdaptationField, PacketHeader, Pid};
    use crate::pes::{PesLength, StreamId};
    use assert_matches::assert_matches;
    use hex_literal::*;

    const PID: u16 = 136;

    /// a packet carrying the given payload, padded to size with adaptation field stuffing
    fn ts_packet(pid: u16, pusi: bool, cc: u8, payload: &[u8]) -> Vec<u8> {
        assert!(payload.len() <= 184);
        let mut p = vec![
            0x47,
            (if pusi { 0x40 } else { 0 }) | (pid >> 8) as u8,
            pid as u8,
        ];
        if payload.len() == 184 {
            p.push(0x10 | cc);
        } else {
            p.push(0x30 | cc);
            let af_len = 183 - payload.len();
            p.push(af_len as u8);
            if af_len > 0 {
                p.push(0); // flags
                p.resize(5 + af_len, 0xff);
            }
        }
        p.extend_from_slice(payload);
        assert_eq!(188, p.len());
        p
    }

    fn af_only_packet(pid: u16, cc: u8) -> Vec<u8> {
        let mut p = vec![0x47, (pid >> 8) as u8, pid as u8, 0x20 | cc, 183, 0];
        p.resize(188, 0xff);
        p
    }

    /// a padding stream PES packet, declaring the given length and `total` bytes long
    fn padding_unit(declared_len: u16, total: usize) -> Vec<u8> {
        let mut unit = vec![0, 0, 1, 0xbe, (declared_len >> 8) as u8, declared_len as u8];
        unit.resize(total, 0xff);
        unit
    }

    fn packetise(pid: u16, first_cc: u8, unit: &[u8]) -> Vec<Vec<u8>> {
        unit.chunks(184)
            .enumerate()
            .map(|(i, chunk)| ts_packet(pid, i == 0, (first_cc + i as u8) & 0xf, chunk))
            .collect()
    }

    fn absorb(assembler: &mut PesAssembler, pk: &[u8]) -> AbsorbOutcome {
        let header = PacketHeader::parse(pk).unwrap();
        let af = AdaptationField::parse(&pk[PacketHeader::SIZE..], header.adaptation_control())
            .unwrap();
        assembler.absorb(pk, &header, af.as_ref())
    }

    #[test]
    fn two_packet_unit() {
        let mut unit = hex!("000001e000e48080052100010003").to_vec();
        unit.resize(6 + 0xe4, 0xaa);
        let packets = packetise(PID, 5, &unit);
        assert_eq!(2, packets.len());
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_matches!(
            absorb(&mut a, &packets[0]),
            AbsorbOutcome::Started(h) if h.stream_id() == StreamId::Video(0)
                && h.pts().map(|t| t.value()) == Some(1)
        );
        assert!(a.is_assembling());
        assert_eq!(184, a.len());
        assert_eq!(
            AbsorbOutcome::Finished { len: 6 + 0xe4 },
            absorb(&mut a, &packets[1])
        );
        assert_eq!(&unit[..], a.packet());
        assert_eq!(
            Some(PesLength::Bounded(std::num::NonZeroU16::new(0xe4).unwrap())),
            a.header().map(|h| h.pes_packet_length())
        );
    }

    #[test]
    fn two_payload_only_packets() {
        // 6 + 362 bytes exactly fill two packet payloads
        let mut unit = hex!("000001e0016a8080052100010003").to_vec();
        unit.resize(6 + 362, 0xaa);
        let packets = packetise(PID, 5, &unit);
        assert_eq!(2, packets.len());
        assert_eq!(0x15, packets[0][3]);
        assert_eq!(0x16, packets[1][3]);
        let other = ts_packet(PID + 1, false, 0, &[0xff; 184]);
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_matches!(
            absorb(&mut a, &packets[0]),
            AbsorbOutcome::Started(h) if h.pts().map(|t| t.value()) == Some(1)
        );
        assert_eq!(AbsorbOutcome::WrongTarget, absorb(&mut a, &other));
        assert_eq!(
            AbsorbOutcome::Finished { len: 368 },
            absorb(&mut a, &packets[1])
        );
        assert_eq!(&unit[..], a.packet());
    }

    #[test]
    fn missing_adaptation_field_keeps_continuity() {
        let unit = padding_unit(400, 406);
        let packets = packetise(PID, 0, &unit);
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_matches!(absorb(&mut a, &packets[0]), AbsorbOutcome::Started(_));
        // adaptation field and payload signalled, but no adaptation field given
        let pk = ts_packet(PID, false, 1, &[0xff; 100]);
        let header = PacketHeader::parse(&pk).unwrap();
        assert_eq!(AbsorbOutcome::Continuing, a.absorb(&pk, &header, None));
        assert_eq!(184, a.len());
        let next = ts_packet(PID, false, 2, &[0xff; 184]);
        assert_eq!(AbsorbOutcome::Continuing, absorb(&mut a, &next));
        assert_eq!(368, a.len());
    }

    #[test]
    fn finished_exactly_at_declared_length() {
        let unit = padding_unit(400, 406);
        let packets = packetise(PID, 0, &unit);
        assert_eq!(3, packets.len());
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_matches!(absorb(&mut a, &packets[0]), AbsorbOutcome::Started(_));
        assert_eq!(AbsorbOutcome::Continuing, absorb(&mut a, &packets[1]));
        assert_eq!(368, a.len());
        assert_eq!(
            AbsorbOutcome::Finished { len: 406 },
            absorb(&mut a, &packets[2])
        );
    }

    #[test]
    fn single_packet_unit() {
        let unit = padding_unit(20, 26);
        let pk = ts_packet(PID, true, 0, &unit);
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_eq!(AbsorbOutcome::Finished { len: 26 }, absorb(&mut a, &pk));
        assert_eq!(Some(StreamId::PaddingStream), a.header().map(|h| h.stream_id()));
    }

    #[test]
    fn counter_wraps_without_loss() {
        // 18 packets, counters 0..=15, 0, 1
        let unit = padding_unit(0xffff, 18 * 184);
        let packets = packetise(PID, 0, &unit);
        assert_eq!(18, packets.len());
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_matches!(absorb(&mut a, &packets[0]), AbsorbOutcome::Started(_));
        for pk in &packets[1..] {
            assert_eq!(AbsorbOutcome::Continuing, absorb(&mut a, pk));
        }
        assert_eq!(18 * 184, a.len());
    }

    #[test]
    fn counter_gap_is_lost() {
        let mut a = PesAssembler::new(Pid::new(PID));
        let start = padding_unit(1000, 184);
        assert_matches!(
            absorb(&mut a, &ts_packet(PID, true, 0, &start)),
            AbsorbOutcome::Started(_)
        );
        assert_eq!(
            AbsorbOutcome::Continuing,
            absorb(&mut a, &ts_packet(PID, false, 1, &[0xff; 184]))
        );
        assert_eq!(
            AbsorbOutcome::Lost,
            absorb(&mut a, &ts_packet(PID, false, 3, &[0xff; 184]))
        );
        assert!(!a.is_assembling());
        assert!(a.is_empty());
        assert_eq!(None, a.header());
        // nothing further collected until the next unit start,
        assert_eq!(
            AbsorbOutcome::Lost,
            absorb(&mut a, &ts_packet(PID, false, 4, &[0xff; 184]))
        );
        assert_matches!(
            absorb(&mut a, &ts_packet(PID, true, 5, &start)),
            AbsorbOutcome::Started(_)
        );
        assert_eq!(184, a.len());
    }

    #[test]
    fn wrong_pid_does_not_disturb_state() {
        let unit = padding_unit(400, 406);
        let packets = packetise(PID, 0, &unit);
        let other = packetise(PID + 1, 9, &padding_unit(10, 16));
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_matches!(absorb(&mut a, &packets[0]), AbsorbOutcome::Started(_));
        assert_eq!(AbsorbOutcome::WrongTarget, absorb(&mut a, &other[0]));
        assert_eq!(AbsorbOutcome::Continuing, absorb(&mut a, &packets[1]));
        assert_eq!(AbsorbOutcome::WrongTarget, absorb(&mut a, &other[0]));
        assert_eq!(
            AbsorbOutcome::Finished { len: 406 },
            absorb(&mut a, &packets[2])
        );
        assert_eq!(&unit[..], a.packet());
    }

    #[test]
    fn continuation_while_idle_is_lost() {
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_eq!(
            AbsorbOutcome::Lost,
            absorb(&mut a, &ts_packet(PID, false, 3, &[0xff; 100]))
        );
        assert!(!a.is_assembling());
        assert_eq!(AbsorbOutcome::Lost, absorb(&mut a, &af_only_packet(PID, 3)));
    }

    #[test]
    fn bad_start_code_is_wrong_target() {
        let mut a = PesAssembler::new(Pid::new(PID));
        let pk = ts_packet(PID, true, 0, &hex!("000002be0004ffffffff"));
        assert_eq!(AbsorbOutcome::WrongTarget, absorb(&mut a, &pk));
        assert!(!a.is_assembling());
        assert_eq!(None, a.header());
    }

    #[test]
    fn adaptation_field_only_packets() {
        let unit = padding_unit(400, 406);
        let packets = packetise(PID, 7, &unit);
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_matches!(absorb(&mut a, &packets[0]), AbsorbOutcome::Started(_));
        // counter does not advance for a packet without payload
        assert_eq!(AbsorbOutcome::Continuing, absorb(&mut a, &af_only_packet(PID, 7)));
        assert_eq!(184, a.len());
        assert_eq!(AbsorbOutcome::Continuing, absorb(&mut a, &packets[1]));
        assert_eq!(AbsorbOutcome::Lost, absorb(&mut a, &af_only_packet(PID, 9)));
        assert!(!a.is_assembling());
    }

    #[test]
    fn unbounded_unit() {
        let mut unit = hex!("000001e000008080052100010003").to_vec();
        unit.resize(184, 0xaa);
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_matches!(
            absorb(&mut a, &ts_packet(PID, true, 0, &unit)),
            AbsorbOutcome::Started(h) if h.pes_packet_length() == PesLength::Unbounded
        );
        for cc in 1..5 {
            assert_eq!(
                AbsorbOutcome::Continuing,
                absorb(&mut a, &ts_packet(PID, false, cc, &[0xbb; 184]))
            );
        }
        assert!(a.is_assembling());
        assert_eq!(5 * 184, a.len());
        assert_matches!(
            absorb(&mut a, &ts_packet(PID, true, 5, &unit)),
            AbsorbOutcome::Started(_)
        );
        assert_eq!(184, a.len());
    }

    #[test]
    fn continuation_after_finished() {
        let unit = padding_unit(20, 26);
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_eq!(
            AbsorbOutcome::Finished { len: 26 },
            absorb(&mut a, &ts_packet(PID, true, 0, &unit))
        );
        assert_eq!(
            AbsorbOutcome::Finished { len: 36 },
            absorb(&mut a, &ts_packet(PID, false, 1, &[0xff; 10]))
        );
    }

    #[test]
    fn init_resets() {
        let unit = padding_unit(400, 406);
        let packets = packetise(PID, 0, &unit);
        let mut a = PesAssembler::new(Pid::new(PID));
        assert_matches!(absorb(&mut a, &packets[0]), AbsorbOutcome::Started(_));
        a.init(Pid::new(PID + 1));
        assert_eq!(Pid::new(PID + 1), a.pid());
        assert!(!a.is_assembling());
        assert!(a.is_empty());
        assert_eq!(AbsorbOutcome::WrongTarget, absorb(&mut a, &packets[1]));
        let other = packetise(PID + 1, 12, &padding_unit(10, 16));
        assert_eq!(AbsorbOutcome::Finished { len: 16 }, absorb(&mut a, &other[0]));
    }

    #[test]
    fn buffer_growth() {
        let mut buf = AssemblyBuffer::new();
        assert_eq!(0, buf.capacity());
        buf.append(&[1; 10]).unwrap();
        assert!(buf.capacity() >= AssemblyBuffer::MIN_CAPACITY);
        buf.append(&[2; 2000]).unwrap();
        assert_eq!(2010, buf.len());
        assert!(buf.capacity() >= 2010);
        assert_eq!(&[1; 10][..], &buf.as_slice()[..10]);
        assert_eq!(&[2; 2000][..], &buf.as_slice()[10..]);
        let cap = buf.capacity();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(cap, buf.capacity());
    }
}
