//! The fixed 4-byte transport stream [`PacketHeader`](struct.PacketHeader.html), and the
//! optional [`AdaptationField`](struct.AdaptationField.html) which may follow it.
//!
//! Both are decoded eagerly: every field is extracted during `parse()`, and the resulting
//! values are read-only afterwards.

use log::warn;
use std::{error, fmt};

/// The fixed 188 byte size of a transport stream packet.
pub const PACKET_SIZE: usize = 188;

/// the different values indicating whether a packet carries an adaptation field, a payload,
/// or both.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AdaptationControl {
    /// This value is used if the transport stream packet `adaptation_control` field uses the value
    /// `0b00`, which is not defined by _ISO/IEC 13818-1_.
    Reserved,
    /// indicates that this packet contains a payload, but not an adaptation field
    PayloadOnly,
    /// indicates that this packet contains an adaptation field, but not a payload
    AdaptationFieldOnly,
    /// indicates that this packet contains both an adaptation field and a payload
    AdaptationFieldAndPayload,
}

impl AdaptationControl {
    #[inline(always)]
    fn from(val: u8) -> AdaptationControl {
        match val & 0b11 {
            0 => AdaptationControl::Reserved,
            1 => AdaptationControl::PayloadOnly,
            2 => AdaptationControl::AdaptationFieldOnly,
            _ => AdaptationControl::AdaptationFieldAndPayload,
        }
    }

    /// True if this AdaptationControl variant indicates that the packet will have a payload
    #[inline(always)]
    pub fn has_payload(self) -> bool {
        match self {
            AdaptationControl::Reserved | AdaptationControl::AdaptationFieldOnly => false,
            AdaptationControl::PayloadOnly | AdaptationControl::AdaptationFieldAndPayload => true,
        }
    }

    /// True if this AdaptationControl variant indicates that an adaptation field follows the
    /// packet header
    #[inline(always)]
    pub fn has_adaptation_field(self) -> bool {
        match self {
            AdaptationControl::Reserved | AdaptationControl::PayloadOnly => false,
            AdaptationControl::AdaptationFieldOnly
            | AdaptationControl::AdaptationFieldAndPayload => true,
        }
    }
}

impl From<AdaptationControl> for u8 {
    fn from(val: AdaptationControl) -> u8 {
        match val {
            AdaptationControl::Reserved => 0,
            AdaptationControl::PayloadOnly => 1,
            AdaptationControl::AdaptationFieldOnly => 2,
            AdaptationControl::AdaptationFieldAndPayload => 3,
        }
    }
}

/// Indicates content scrambling in use, if any.
///
/// Scrambling schemes themselves are left undefined by _ISO/IEC 13818-1_; this crate only
/// reports the 2-bit code and never descrambles anything.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TransportScramblingControl {
    /// The stream is not scrambled.
    NotScrambled,
    /// The stream is scrambled using a scheme not defined in _ISO/IEC 13818-1_.
    Undefined(u8),
}

impl TransportScramblingControl {
    fn from(val: u8) -> TransportScramblingControl {
        match val & 0b11 {
            0 => TransportScramblingControl::NotScrambled,
            v => TransportScramblingControl::Undefined(v),
        }
    }
}

impl From<TransportScramblingControl> for u8 {
    fn from(val: TransportScramblingControl) -> u8 {
        match val {
            TransportScramblingControl::NotScrambled => 0,
            TransportScramblingControl::Undefined(v) => v,
        }
    }
}

/// A _Clock Reference_ is used to represent the values of PCR and OPCR fields within the
/// adaptation field, and the ESCR field of a PES header.
///
/// A _Clock Reference_ includes a 33-bit, 90kHz `base` component, together with another 9-bit,
/// high-resolution `extension` component.
///
/// Together these can be viewed as a 42-bit, 27MHz quantity (e.g. `let full_value = pcr as u64`).
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct ClockRef {
    base: u64,
    extension: u16,
}

impl From<ClockRef> for u64 {
    fn from(pcr: ClockRef) -> u64 {
        pcr.base * ClockRef::EXTENSION_RATIO + u64::from(pcr.extension)
    }
}

impl fmt::Debug for ClockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "PCR{{{:08x}:{:04x}}}", self.base, self.extension)
    }
}
impl ClockRef {
    /// Number of bytes occupied by a PCR or OPCR value within the adaptation field.
    pub const SIZE: usize = 6;

    /// Ratio between the 27MHz extension clock and the 90kHz base clock.
    pub const EXTENSION_RATIO: u64 = 300;

    /// Decodes the 6-byte PCR layout; the 6 reserved bits between base and extension are
    /// ignored.
    ///
    /// Panics if `data` is shorter than 6 bytes
    pub fn from_slice(data: &[u8]) -> ClockRef {
        ClockRef {
            base: u64::from(data[0]) << 25
                | u64::from(data[1]) << 17
                | u64::from(data[2]) << 9
                | u64::from(data[3]) << 1
                | u64::from(data[4]) >> 7,
            extension: (u16::from(data[4]) & 0b1) << 8 | u16::from(data[5]),
        }
    }
    /// Panics if the `base` is greater than 2^33-1 or the `extension` is greater than 2^9-1
    pub fn from_parts(base: u64, extension: u16) -> ClockRef {
        assert!(base < (1 << 33));
        assert!(extension < (1 << 9));
        ClockRef { base, extension }
    }

    /// get the 33-bit, 90kHz 'base' component of the timestamp
    pub fn base(&self) -> u64 {
        self.base
    }

    /// get the 9-bit 'extension' component of the timestamp, measured in 300ths of the 90kHz base
    /// clockrate (i.e. 27MHz)
    pub fn extension(&self) -> u16 {
        self.extension
    }
}

/// A counter value used within a transport stream to detect discontinuities in a sequence of packets.
/// The continuity counter should increase by one for each packet with a given PID for which
/// `adaptation_control` indicates that a payload should be present.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct ContinuityCounter {
    val: u8,
}

impl From<u8> for ContinuityCounter {
    #[inline]
    fn from(count: u8) -> ContinuityCounter {
        ContinuityCounter::new(count)
    }
}

impl ContinuityCounter {
    /// Panics if the given value is greater than 15.
    #[inline]
    pub fn new(count: u8) -> ContinuityCounter {
        assert!(count < 0b10000);
        ContinuityCounter { val: count }
    }

    /// Returns this counter's value, which will be between 0 and 15 inclusive.
    #[inline]
    pub fn count(self) -> u8 {
        self.val
    }

    /// true iff the given `ContinuityCounter` value follows this one.  Note that the maximum counter
    /// value is 15, and the counter 'wraps around':
    ///
    /// ```rust
    /// # use mpeg2ts_assembler::packet::ContinuityCounter;
    /// let a = ContinuityCounter::new(0);
    /// let b = ContinuityCounter::new(15);
    /// assert!(a.follows(b));  // after 15, counter wraps around to 0
    /// ```
    #[inline]
    pub fn follows(self, other: ContinuityCounter) -> bool {
        (other.val + 1) & 0b1111 == self.val
    }
}

/// A Packet Identifier value, between `0x0000` and `0x1fff`.
///
/// PID values identify a particular sub-stream within the overall Transport Stream.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pid(u16);
impl Pid {
    /// The largest possible PID value, `0x1fff`.
    pub const MAX_VALUE: u16 = 0x1fff;

    /// The total number of distinct PID values, `0x2000` (equal to `MAX_VALUE` + 1)
    pub const PID_COUNT: usize = (Self::MAX_VALUE + 1) as usize;

    /// Program Association Table
    pub const PAT: Pid = Pid::new(0x0000);
    /// Conditional Access Table
    pub const CAT: Pid = Pid::new(0x0001);
    /// Transport Stream Description Table
    pub const TSDT: Pid = Pid::new(0x0002);
    /// IPMP Control Information Table
    pub const IPMP: Pid = Pid::new(0x0003);
    /// DVB Network Information Table
    pub const NIT: Pid = Pid::new(0x0010);
    /// DVB Service Description Table
    pub const SDT: Pid = Pid::new(0x0011);
    /// Null packets, used to pad out a stream to a constant bitrate
    pub const NULL: Pid = Pid::new(0x1fff);

    /// Panics if the given value is greater than `Pid::MAX_VALUE`.
    pub const fn new(pid: u16) -> Pid {
        assert!(pid <= Pid::MAX_VALUE);
        Pid(pid)
    }

    /// A short name for the PIDs that have a fixed meaning in ISO/IEC 13818-1 or DVB, or `None`
    /// for PIDs assigned by the program map.
    pub fn well_known_name(self) -> Option<&'static str> {
        match self {
            Pid::PAT => Some("PAT"),
            Pid::CAT => Some("CAT"),
            Pid::TSDT => Some("TSDT"),
            Pid::IPMP => Some("IPMP"),
            Pid::NIT => Some("NIT"),
            Pid::SDT => Some("SDT"),
            Pid::NULL => Some("NULL"),
            _ => None,
        }
    }
}
impl TryFrom<u16> for Pid {
    type Error = ();

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= Pid::MAX_VALUE {
            Ok(Pid(value))
        } else {
            Err(())
        }
    }
}
impl From<Pid> for u16 {
    #[inline]
    fn from(pid: Pid) -> Self {
        pid.0
    }
}
impl From<Pid> for usize {
    #[inline]
    fn from(pid: Pid) -> Self {
        pid.0 as usize
    }
}
impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Pid({:04x})", self.0)
    }
}

/// Problems which prevent a [`PacketHeader`](struct.PacketHeader.html) being decoded.
#[derive(Debug, PartialEq, Eq)]
pub enum PacketError {
    /// The buffer is too short to hold the packet header
    NotEnoughData {
        /// the number of bytes required
        requested: usize,
        /// the number of bytes actually present
        available: usize,
    },
    /// The first byte of the packet was not `PacketHeader::SYNC_BYTE` (0x47)
    SyncByteMismatch(u8),
}
impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketError::NotEnoughData {
                requested,
                available,
            } => write!(
                f,
                "packet header needs {} bytes, only {} available",
                requested, available
            ),
            PacketError::SyncByteMismatch(b) => {
                write!(f, "sync byte {:#04x} is not {:#04x}", b, PacketHeader::SYNC_BYTE)
            }
        }
    }
}
impl error::Error for PacketError {}

/// The 4-byte header found at the start of every transport stream packet, per
/// _ISO/IEC 13818-1, Section 2.4.3.2_.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PacketHeader {
    transport_error_indicator: bool,
    payload_unit_start_indicator: bool,
    transport_priority: bool,
    pid: Pid,
    transport_scrambling_control: TransportScramblingControl,
    adaptation_control: AdaptationControl,
    continuity_counter: ContinuityCounter,
}

impl PacketHeader {
    /// The value `0x47`, which must appear in the first byte of every transport stream packet.
    pub const SYNC_BYTE: u8 = 0x47;

    /// The fixed size of the header, which is also the number of bytes consumed by `parse()`.
    pub const SIZE: usize = 4;

    /// returns `true` if the given value is a valid synchronisation byte, the value
    /// `PacketHeader::SYNC_BYTE` (0x47).
    #[inline(always)]
    pub fn is_sync_byte(b: u8) -> bool {
        b == Self::SYNC_BYTE
    }

    /// Decodes the header fields from the first `PacketHeader::SIZE` bytes of `buf`.
    pub fn parse(buf: &[u8]) -> Result<PacketHeader, PacketError> {
        if buf.len() < Self::SIZE {
            return Err(PacketError::NotEnoughData {
                requested: Self::SIZE,
                available: buf.len(),
            });
        }
        if !Self::is_sync_byte(buf[0]) {
            return Err(PacketError::SyncByteMismatch(buf[0]));
        }
        Ok(PacketHeader {
            transport_error_indicator: buf[1] & 0b1000_0000 != 0,
            payload_unit_start_indicator: buf[1] & 0b0100_0000 != 0,
            transport_priority: buf[1] & 0b0010_0000 != 0,
            pid: Pid(u16::from(buf[1] & 0b0001_1111) << 8 | u16::from(buf[2])),
            transport_scrambling_control: TransportScramblingControl::from(buf[3] >> 6),
            adaptation_control: AdaptationControl::from(buf[3] >> 4),
            continuity_counter: ContinuityCounter::new(buf[3] & 0b0000_1111),
        })
    }

    /// *May* have been set if some previous processing of this TS data detected at least
    /// 1 uncorrectable bit error in this TS packet.
    #[inline]
    pub fn transport_error_indicator(&self) -> bool {
        self.transport_error_indicator
    }

    /// a structure larger than a single packet payload needs to be split across multiple packets,
    /// `payload_unit_start_indicator()` indicates if this packet payload contains the start of the
    /// structure.  If `false`, this packets payload is a continuation of a structure which began
    /// in an earlier packet within the transport stream.
    #[inline]
    pub fn payload_unit_start_indicator(&self) -> bool {
        self.payload_unit_start_indicator
    }

    /// When `true`, this TS packet has higher priority than other packets of the the same PID.
    pub fn transport_priority(&self) -> bool {
        self.transport_priority
    }

    /// The sub-stream to which this packet belongs.
    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Value of the _transport_scrambling_control_ field.
    pub fn transport_scrambling_control(&self) -> TransportScramblingControl {
        self.transport_scrambling_control
    }

    /// Indicates if an adaptation field, a payload, or both follow this header.
    #[inline]
    pub fn adaptation_control(&self) -> AdaptationControl {
        self.adaptation_control
    }

    /// Each packet with a given `pid()` value within a transport stream should have a continuity
    /// counter value which increases by 1 from the last counter value seen.
    #[inline]
    pub fn continuity_counter(&self) -> ContinuityCounter {
        self.continuity_counter
    }

    /// Offset of the first payload byte within the packet, given the adaptation field (if any)
    /// that was parsed from the same packet.
    ///
    /// Returns `None` when the packet has no payload: either `adaptation_control()` says so,
    /// or the adaptation field fills the whole packet.  Also returns `None` if
    /// `adaptation_control()` signals an adaptation field but none is supplied, since the
    /// payload position is then unknown.
    pub fn payload_offset(&self, adaptation_field: Option<&AdaptationField<'_>>) -> Option<usize> {
        if !self.adaptation_control.has_payload() {
            return None;
        }
        let offset = if self.adaptation_control.has_adaptation_field() {
            Self::SIZE + adaptation_field?.consumed_len()
        } else {
            Self::SIZE
        };
        if offset < PACKET_SIZE {
            Some(offset)
        } else {
            None
        }
    }
}

/// Bounds-checked sequential access to the sub-fields of a variable length structure.
pub(crate) struct FieldReader<'buf> {
    buf: &'buf [u8],
    pos: usize,
}
impl<'buf> FieldReader<'buf> {
    pub(crate) fn new(buf: &'buf [u8]) -> FieldReader<'buf> {
        FieldReader { buf, pos: 0 }
    }

    /// the next `len` bytes, or `None` without advancing if fewer remain
    pub(crate) fn take(&mut self, len: usize) -> Option<&'buf [u8]> {
        let end = self.pos.checked_add(len)?;
        let s = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(s)
    }

    /// a block preceded by a 1-byte length
    pub(crate) fn take_prefixed(&mut self) -> Option<&'buf [u8]> {
        let len = *self.buf.get(self.pos)? as usize;
        let s = self.buf.get(self.pos + 1..self.pos + 1 + len)?;
        self.pos += 1 + len;
        Some(s)
    }
}

/// Some error encountered while parsing adaptation field syntax
#[derive(Debug, PartialEq, Eq)]
pub enum AdaptationFieldError {
    /// The buffer ends before the adaptation field it is supposed to hold.
    NotEnoughData {
        /// the number of bytes required by the declared _adaptation_field_length_
        requested: usize,
        /// the number of bytes actually present
        available: usize,
    },
    /// The _adaptation_field_length_ is larger than permitted for the packet's
    /// `AdaptationControl`.
    LengthTooLarge {
        /// the declared _adaptation_field_length_
        length: u8,
        /// the maximum permitted value
        max: u8,
    },
}
impl fmt::Display for AdaptationFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdaptationFieldError::NotEnoughData {
                requested,
                available,
            } => write!(
                f,
                "adaptation field needs {} bytes, only {} available",
                requested, available
            ),
            AdaptationFieldError::LengthTooLarge { length, max } => write!(
                f,
                "adaptation_field_length {} exceeds maximum of {}",
                length, max
            ),
        }
    }
}
impl error::Error for AdaptationFieldError {}

/// A collection of fields that may optionally appear after the header of a transport stream
/// packet, per _ISO/IEC 13818-1, Section 2.4.3.4_.
///
/// The transport private data and extension blocks are borrowed from the packet buffer rather
/// than copied.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AdaptationField<'buf> {
    length: u8,
    flags: u8,
    pcr: Option<ClockRef>,
    opcr: Option<ClockRef>,
    splice_countdown: Option<i8>,
    transport_private_data: Option<&'buf [u8]>,
    adaptation_field_extension: Option<&'buf [u8]>,
}

impl<'buf> AdaptationField<'buf> {
    /// Largest _adaptation_field_length_ accepted when the packet carries no payload.
    pub const MAX_LENGTH_WITHOUT_PAYLOAD: u8 = 184;
    /// Largest _adaptation_field_length_ accepted when a payload follows the adaptation field.
    pub const MAX_LENGTH_WITH_PAYLOAD: u8 = 183;

    const FLAGS_SIZE: usize = 1;

    /// Decode the adaptation field at the start of `buf`, which must hold the packet content
    /// following the 4-byte header (i.e. starting with the _adaptation_field_length_ byte).
    ///
    /// Returns `Ok(None)` if `control` indicates that there is no adaptation field, in which
    /// case no bytes are consumed.
    ///
    /// If a flag announces a sub-field that does not fit within the declared length, a
    /// warning is logged and that sub-field, together with all those following it, is
    /// reported absent.
    pub fn parse(
        buf: &'buf [u8],
        control: AdaptationControl,
    ) -> Result<Option<AdaptationField<'buf>>, AdaptationFieldError> {
        let max = match control {
            AdaptationControl::Reserved | AdaptationControl::PayloadOnly => return Ok(None),
            AdaptationControl::AdaptationFieldOnly => Self::MAX_LENGTH_WITHOUT_PAYLOAD,
            AdaptationControl::AdaptationFieldAndPayload => Self::MAX_LENGTH_WITH_PAYLOAD,
        };
        let length = *buf.first().ok_or(AdaptationFieldError::NotEnoughData {
            requested: 1,
            available: 0,
        })?;
        if length > max {
            return Err(AdaptationFieldError::LengthTooLarge { length, max });
        }
        let end = 1 + usize::from(length);
        if end > buf.len() {
            return Err(AdaptationFieldError::NotEnoughData {
                requested: end,
                available: buf.len(),
            });
        }
        let mut af = AdaptationField {
            length,
            flags: 0,
            pcr: None,
            opcr: None,
            splice_countdown: None,
            transport_private_data: None,
            adaptation_field_extension: None,
        };
        if length > 0 {
            let data = &buf[1..end];
            af.flags = data[0];
            if let Err(field) = af.read_optional_fields(&data[Self::FLAGS_SIZE..]) {
                warn!(
                    "adaptation_field_length {} too small to hold {}, ignoring remaining fields",
                    length, field
                );
            }
        }
        Ok(Some(af))
    }

    fn read_optional_fields(&mut self, data: &'buf [u8]) -> Result<(), &'static str> {
        let mut r = FieldReader::new(data);
        if self.pcr_flag() {
            self.pcr = Some(ClockRef::from_slice(r.take(ClockRef::SIZE).ok_or("PCR")?));
        }
        if self.opcr_flag() {
            self.opcr = Some(ClockRef::from_slice(r.take(ClockRef::SIZE).ok_or("OPCR")?));
        }
        if self.splicing_point_flag() {
            self.splice_countdown = Some(r.take(1).ok_or("splice_countdown")?[0] as i8);
        }
        if self.transport_private_data_flag() {
            self.transport_private_data =
                Some(r.take_prefixed().ok_or("transport_private_data")?);
        }
        if self.adaptation_field_extension_flag() {
            self.adaptation_field_extension =
                Some(r.take_prefixed().ok_or("adaptation_field_extension")?);
        }
        Ok(())
    }

    /// The _adaptation_field_length_ value; the number of bytes following the length byte.
    pub fn length(&self) -> u8 {
        self.length
    }

    /// Total bytes occupied in the packet, including the length byte itself.
    pub fn consumed_len(&self) -> usize {
        usize::from(self.length) + 1
    }

    /// Get the value of the _discontinuity_indicator_ field which might have been written into
    /// the transport stream by some 'upstream' processor on discovering that there was a break
    /// in the data.
    pub fn discontinuity_indicator(&self) -> bool {
        self.flags & 0b1000_0000 != 0
    }
    /// Get the value of the _random_access_indicator_ field.
    pub fn random_access_indicator(&self) -> bool {
        self.flags & 0b0100_0000 != 0
    }
    /// Get the value of the _elementary_stream_priority_indicator_ field.
    pub fn elementary_stream_priority_indicator(&self) -> bool {
        self.flags & 0b0010_0000 != 0
    }
    /// _PCR_flag_
    pub fn pcr_flag(&self) -> bool {
        self.flags & 0b0001_0000 != 0
    }
    /// _OPCR_flag_
    pub fn opcr_flag(&self) -> bool {
        self.flags & 0b0000_1000 != 0
    }
    /// _splicing_point_flag_
    pub fn splicing_point_flag(&self) -> bool {
        self.flags & 0b0000_0100 != 0
    }
    /// _transport_private_data_flag_
    pub fn transport_private_data_flag(&self) -> bool {
        self.flags & 0b0000_0010 != 0
    }
    /// _adaptation_field_extension_flag_
    pub fn adaptation_field_extension_flag(&self) -> bool {
        self.flags & 0b0000_0001 != 0
    }

    /// The _Program Clock Reference_, if present
    pub fn pcr(&self) -> Option<ClockRef> {
        self.pcr
    }
    /// The _Original Program Clock Reference_, if present
    pub fn opcr(&self) -> Option<ClockRef> {
        self.opcr
    }
    /// The _splice_countdown_ value, if present.  Not interpreted further.
    pub fn splice_countdown(&self) -> Option<i8> {
        self.splice_countdown
    }
    /// The _private_data_byte_ values, if present
    pub fn transport_private_data(&self) -> Option<&'buf [u8]> {
        self.transport_private_data
    }
    /// The body of the adaptation field extension (following its length byte), if present
    pub fn adaptation_field_extension(&self) -> Option<&'buf [u8]> {
        self.adaptation_field_extension
    }

    /// Number of stuffing bytes padding out the end of the adaptation field.
    ///
    /// Derived from the lengths of the sub-fields found by `parse()`, without revisiting the
    /// packet data.
    pub fn stuffing_bytes(&self) -> usize {
        if self.length == 0 {
            return 0;
        }
        let used = Self::FLAGS_SIZE
            + self.pcr.map_or(0, |_| ClockRef::SIZE)
            + self.opcr.map_or(0, |_| ClockRef::SIZE)
            + self.splice_countdown.map_or(0, |_| 1)
            + self.transport_private_data.map_or(0, |d| 1 + d.len())
            + self.adaptation_field_extension.map_or(0, |d| 1 + d.len());
        usize::from(self.length).saturating_sub(used)
    }
}

impl<'buf> fmt::Debug for AdaptationField<'buf> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("AdaptationField");
        d.field("length", &self.length);
        d.field("discontinuity_indicator", &self.discontinuity_indicator());
        d.field("random_access_indicator", &self.random_access_indicator());
        d.field(
            "elementary_stream_priority_indicator",
            &self.elementary_stream_priority_indicator(),
        );
        d.field("pcr", &self.pcr);
        d.field("opcr", &self.opcr);
        d.field("splice_countdown", &self.splice_countdown);
        d.field("transport_private_data", &self.transport_private_data);
        d.field(
            "adaptation_field_extension",
            &self.adaptation_field_extension,
        );
        d.field("stuffing_bytes", &self.stuffing_bytes());
        d.finish()
    }
}
