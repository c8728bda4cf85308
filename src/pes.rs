//! Support for Packetised Elementary Stream headers within Transport Stream packet payloads.
//!
//! Elementary streams are split into 'elementary stream packets', which are then further split
//! into the payloads of transport stream packets.  The [`PesHeader`](struct.PesHeader.html)
//! found at the start of each of these packets identifies the stream, the overall packet
//! length and (for audio and video streams) the presentation and decode timestamps.
//!
//! Reassembly of whole PES packets is handled by the
//! [`assembler`](../assembler/index.html) module.

use crate::packet::{ClockRef, FieldReader};
use log::warn;
use std::{error, fmt, num};

/// Type for the length of a PES packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PesLength {
    /// The PES packet continues until the next TS packet that has `payload_unit_start_indicator`
    /// set.  Only permitted for video streams, but really needed wherever the size of the PES
    /// packet would exceed the 16 bits of this field.
    Unbounded,
    /// The PES packet's length, not counting the 6 bytes of the fixed header (likely to exceed
    /// the size of the TS packet that contains the PES packet header).
    Bounded(num::NonZeroU16),
}

/// Values which may be returned by
/// [`PesHeader::stream_id()`](struct.PesHeader.html#method.stream_id) to identify the kind of
/// content within the Packetized Elementary Stream, per _ISO/IEC 13818-1_, _Table 2-22_.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StreamId {
    /// `program_stream_map`
    ProgramStreamMap,
    /// `private_stream_1`
    PrivateStream1,
    /// `padding_stream`
    PaddingStream,
    /// `private_stream_2`
    PrivateStream2,
    /// ISO/IEC 13818-3 or ISO/IEC 11172-3 or ISO/IEC 13818-7 or ISO/IEC 14496-3 audio stream,
    /// with the given 5-bit stream number
    Audio(u8),
    /// Rec. ITU-T H.262 | ISO/IEC 13818-2, ISO/IEC 11172-2, ISO/IEC 14496-2, Rec. ITU-T H.264 |
    /// ISO/IEC 14496-10 or Rec. ITU-T H.265 | ISO/IEC 23008-2 video stream, with the given 4-bit
    /// stream number
    Video(u8),
    /// `ECM_stream`
    EcmStream,
    /// `EMM_stream`
    EmmStream,
    /// Rec. ITU-T H.222.0 | ISO/IEC 13818-1 Annex B or ISO/IEC 13818-6_DSMCC_stream
    DsmCc,
    /// ISO/IEC_13522_stream
    Iso13522Stream,
    /// Rec. ITU-T H.222.1 type A
    H2221TypeA,
    /// Rec. ITU-T H.222.1 type B
    H2221TypeB,
    /// Rec. ITU-T H.222.1 type C
    H2221TypeC,
    /// Rec. ITU-T H.222.1 type D
    H2221TypeD,
    /// Rec. ITU-T H.222.1 type E
    H2221TypeE,
    /// `ancillary_stream`
    AncillaryStream,
    /// ISO/IEC 14496-1_SL-packetized_stream
    SlPacketizedStream,
    /// ISO/IEC 14496-1_FlexMux_stream
    FlexMuxStream,
    /// metadata stream
    MetadataStream,
    /// `extended_stream_id`
    ExtendedStreamId,
    /// reserved data stream
    ReservedDataStream,
    /// `program_stream_directory`
    ProgramStreamDirectory,
    /// Encapsulates a stream_id value not specified in _ISO/IEC 13818-1_
    Unknown(u8),
}

/// Broad classification of a [`StreamId`](enum.StreamId.html), as returned by
/// [`StreamId::class()`](enum.StreamId.html#method.class).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StreamClass {
    /// one of the 32 audio stream ids, `0xC0` to `0xDF`
    ElementaryAudio,
    /// one of the 16 video stream ids, `0xE0` to `0xEF`
    ElementaryVideo,
    /// any other stream id
    NonElementary,
}

impl StreamId {
    /// Classify this stream id as audio, video or neither.
    pub fn class(self) -> StreamClass {
        match self {
            StreamId::Audio(_) => StreamClass::ElementaryAudio,
            StreamId::Video(_) => StreamClass::ElementaryVideo,
            _ => StreamClass::NonElementary,
        }
    }

    /// True if PES packets with this stream id carry the optional PES header (flags, header
    /// data length, timestamps).
    ///
    /// Only elementary audio and video streams qualify.  In particular `program_stream_map`,
    /// `padding_stream`, `private_stream_2`, `ECM`, `EMM`, `program_stream_directory`,
    /// `DSMCC_stream` and `H.222.1 type E` never do.  `private_stream_1` is also treated as
    /// lacking the optional header.
    pub fn has_optional_header(self) -> bool {
        self.class() != StreamClass::NonElementary
    }
}
impl From<u8> for StreamId {
    fn from(v: u8) -> Self {
        match v {
            0b1011_1100 => StreamId::ProgramStreamMap,
            0b1011_1101 => StreamId::PrivateStream1,
            0b1011_1110 => StreamId::PaddingStream,
            0b1011_1111 => StreamId::PrivateStream2,
            0b1100_0000..=0b1101_1111 => StreamId::Audio(v & 0b0001_1111),
            0b1110_0000..=0b1110_1111 => StreamId::Video(v & 0b0000_1111),
            0b1111_0000 => StreamId::EcmStream,
            0b1111_0001 => StreamId::EmmStream,
            0b1111_0010 => StreamId::DsmCc,
            0b1111_0011 => StreamId::Iso13522Stream,
            0b1111_0100 => StreamId::H2221TypeA,
            0b1111_0101 => StreamId::H2221TypeB,
            0b1111_0110 => StreamId::H2221TypeC,
            0b1111_0111 => StreamId::H2221TypeD,
            0b1111_1000 => StreamId::H2221TypeE,
            0b1111_1001 => StreamId::AncillaryStream,
            0b1111_1010 => StreamId::SlPacketizedStream,
            0b1111_1011 => StreamId::FlexMuxStream,
            0b1111_1100 => StreamId::MetadataStream,
            0b1111_1101 => StreamId::ExtendedStreamId,
            0b1111_1110 => StreamId::ReservedDataStream,
            0b1111_1111 => StreamId::ProgramStreamDirectory,
            _ => StreamId::Unknown(v),
        }
    }
}
impl From<StreamId> for u8 {
    fn from(id: StreamId) -> Self {
        match id {
            StreamId::ProgramStreamMap => 0b1011_1100,
            StreamId::PrivateStream1 => 0b1011_1101,
            StreamId::PaddingStream => 0b1011_1110,
            StreamId::PrivateStream2 => 0b1011_1111,
            StreamId::Audio(n) => 0b1100_0000 | (n & 0b0001_1111),
            StreamId::Video(n) => 0b1110_0000 | (n & 0b0000_1111),
            StreamId::EcmStream => 0b1111_0000,
            StreamId::EmmStream => 0b1111_0001,
            StreamId::DsmCc => 0b1111_0010,
            StreamId::Iso13522Stream => 0b1111_0011,
            StreamId::H2221TypeA => 0b1111_0100,
            StreamId::H2221TypeB => 0b1111_0101,
            StreamId::H2221TypeC => 0b1111_0110,
            StreamId::H2221TypeD => 0b1111_0111,
            StreamId::H2221TypeE => 0b1111_1000,
            StreamId::AncillaryStream => 0b1111_1001,
            StreamId::SlPacketizedStream => 0b1111_1010,
            StreamId::FlexMuxStream => 0b1111_1011,
            StreamId::MetadataStream => 0b1111_1100,
            StreamId::ExtendedStreamId => 0b1111_1101,
            StreamId::ReservedDataStream => 0b1111_1110,
            StreamId::ProgramStreamDirectory => 0b1111_1111,
            StreamId::Unknown(v) => v,
        }
    }
}

/// Errors which prevent a [`PesHeader`](struct.PesHeader.html) being decoded.
#[derive(Debug, PartialEq, Eq)]
pub enum PesError {
    /// There is not enough data in the buffer to hold the fixed part of the header
    NotEnoughData {
        /// the number of bytes required to hold the requested syntax element
        requested: usize,
        /// the number of bytes actually remaining in the buffer
        available: usize,
    },
    /// The first three bytes did not hold the _packet_start_code_prefix_ value `0x000001`
    StartCodePrefixMismatch(u32),
}
impl fmt::Display for PesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PesError::NotEnoughData {
                requested,
                available,
            } => write!(
                f,
                "PES header needs {} bytes, only {} available",
                requested, available
            ),
            PesError::StartCodePrefixMismatch(v) => write!(
                f,
                "invalid packet_start_code_prefix {:#08x}, expected 0x000001",
                v
            ),
        }
    }
}
impl error::Error for PesError {}

/// A 33-bit Elementary Stream timestamp, used to represent PTS and DTS values which may appear in
/// an Elementary Stream header.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Timestamp {
    val: u64,
}
impl Timestamp {
    /// The largest representable timestamp value before the timestamp wraps back around to zero.
    pub const MAX: Timestamp = Timestamp { val: (1 << 33) - 1 };

    /// 90kHz timebase in which PTS and DTS values are measured.
    pub const TIMEBASE: u64 = 90_000;

    /// Number of bytes occupied by an encoded timestamp.
    pub const SIZE: usize = 5;

    /// Parse a Time Stamp value from the 5 bytes at the start of the given slice.
    ///
    /// The 4-bit prefix and the three marker bits interleaved with the value are not checked.
    ///
    /// Panics if fewer than 5 bytes given
    pub fn from_bytes(buf: &[u8]) -> Timestamp {
        Timestamp {
            val: (u64::from(buf[0] & 0b0000_1110) << 29)
                | u64::from(buf[1]) << 22
                | (u64::from(buf[2] & 0b1111_1110) << 14)
                | u64::from(buf[3]) << 7
                | u64::from(buf[4]) >> 1,
        }
    }
    /// Panics if the given val is greater than 2^33-1
    pub fn from_u64(val: u64) -> Timestamp {
        assert!(val <= Self::MAX.val);
        Timestamp { val }
    }
    /// produces the timestamp's value (only the low 33 bits are used)
    pub fn value(self) -> u64 {
        self.val
    }
}

/// Contains some combination of PTS and DTS timestamps (or maybe neither).
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum PtsDts {
    /// There are no timestamps present
    None,
    /// Only Presentation Time Stamp is present
    PtsOnly(Timestamp),
    /// the _PTS_DTS_flags_ field held `0b01` (DTS without PTS), which is not a permitted
    /// combination, so neither value is decoded
    Invalid,
    /// Both Presentation and Decode Time Stamps are present
    Both {
        /// Presentation Time Stamp
        pts: Timestamp,
        /// Decode Time Stamp
        dts: Timestamp,
    },
}
impl PtsDts {
    /// The Presentation Time Stamp, if decoded
    pub fn pts(&self) -> Option<Timestamp> {
        match *self {
            PtsDts::PtsOnly(pts) | PtsDts::Both { pts, .. } => Some(pts),
            PtsDts::None | PtsDts::Invalid => None,
        }
    }
    /// The Decode Time Stamp, if decoded
    pub fn dts(&self) -> Option<Timestamp> {
        match *self {
            PtsDts::Both { dts, .. } => Some(dts),
            _ => None,
        }
    }
}

/// Indication of an Elementary Stream's data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EsRate(u32);
impl EsRate {
    const RATE_BYTES_PER_SECOND: u32 = 50;
    /// panics if the given value is greater than _2^22 -1_.
    pub fn new(es_rate: u32) -> EsRate {
        assert!(es_rate < 1 << 22);
        EsRate(es_rate)
    }
    /// return the _es_rate_ value converted into a bytes-per-second quantity.
    pub fn bytes_per_second(&self) -> u32 {
        self.0 * Self::RATE_BYTES_PER_SECOND
    }
}
impl From<EsRate> for u32 {
    fn from(r: EsRate) -> Self {
        r.0
    }
}

/// Indicates if the start of some 'unit' of Elementary Stream content is immediately at the start
/// of the PES packet payload.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum DataAlignment {
    /// Access Units are aligned to the start of the PES packet payload
    Aligned,
    /// Access Units are might not be aligned to the start of the PES packet payload
    NotAligned,
}
/// Indicates the copyright status of the contents of the Elementary Stream packet.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Copyright {
    /// Content of this Elementry Stream is protected by copyright
    Protected,
    /// Copyright protection of the content of this Elementary Stream is not defined
    Undefined,
}
/// Indicates weather the contents of the Elementary Stream packet are original or a copy.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum OriginalOrCopy {
    /// The Elementary Stream is original content
    Original,
    /// The Elementary Stream is a copy
    Copy,
}

/// The optional fields following the fixed 6 bytes of the header in PES packets of audio and
/// video streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PesOptionalHeader {
    flags: [u8; 2],
    pes_header_data_length: u8,
    pts_dts: PtsDts,
    escr: Option<ClockRef>,
    es_rate: Option<EsRate>,
}
impl PesOptionalHeader {
    const FIXED_SIZE: usize = 3;
    const ESCR_SIZE: usize = 6;
    const ES_RATE_SIZE: usize = 3;

    fn parse(buf: &[u8]) -> PesOptionalHeader {
        let mut header = PesOptionalHeader {
            flags: [buf[0], buf[1]],
            pes_header_data_length: buf[2],
            pts_dts: PtsDts::None,
            escr: None,
            es_rate: None,
        };
        if header.check_bits() != 0b10 {
            warn!(
                "unexpected check-bits value {:#b}, expected 0b10",
                header.check_bits()
            );
        }
        // only the bytes counted by PES_header_data_length belong to the header
        let data = &buf[Self::FIXED_SIZE..];
        let data = &data[..data.len().min(usize::from(header.pes_header_data_length))];
        if let Err(field) = header.read_optional_fields(data) {
            warn!(
                "PES_header_data_length {} (with {} bytes available) too small to hold {}",
                header.pes_header_data_length,
                data.len(),
                field
            );
        }
        header
    }

    fn read_optional_fields(&mut self, data: &[u8]) -> Result<(), &'static str> {
        let mut r = FieldReader::new(data);
        match self.pts_dts_flags() {
            0b00 => {}
            0b01 => self.pts_dts = PtsDts::Invalid,
            0b10 => {
                let pts = r.take(Timestamp::SIZE).ok_or("PTS")?;
                self.pts_dts = PtsDts::PtsOnly(Timestamp::from_bytes(pts));
            }
            _ => {
                let pts = Timestamp::from_bytes(r.take(Timestamp::SIZE).ok_or("PTS")?);
                self.pts_dts = PtsDts::PtsOnly(pts);
                let dts = Timestamp::from_bytes(r.take(Timestamp::SIZE).ok_or("DTS")?);
                self.pts_dts = PtsDts::Both { pts, dts };
            }
        }
        if self.escr_flag() {
            let s = r.take(Self::ESCR_SIZE).ok_or("ESCR")?;
            let base = u64::from(s[0] & 0b0011_1000) << 27
                | u64::from(s[0] & 0b0000_0011) << 28
                | u64::from(s[1]) << 20
                | u64::from(s[2] & 0b1111_1000) << 12
                | u64::from(s[2] & 0b0000_0011) << 13
                | u64::from(s[3]) << 5
                | u64::from(s[4] & 0b1111_1000) >> 3;
            let extension = u16::from(s[4] & 0b0000_0011) << 7 | u16::from(s[5] & 0b1111_1110) >> 1;
            self.escr = Some(ClockRef::from_parts(base, extension));
        }
        if self.es_rate_flag() {
            let s = r.take(Self::ES_RATE_SIZE).ok_or("ES_rate")?;
            self.es_rate = Some(EsRate::new(
                u32::from(s[0] & 0b0111_1111) << 15
                    | u32::from(s[1]) << 7
                    | u32::from(s[2] & 0b1111_1110) >> 1,
            ));
        }
        Ok(())
    }

    /// the two bits preceding _PES_scrambling_control_, which should always be `0b10`
    pub fn check_bits(&self) -> u8 {
        self.flags[0] >> 6
    }
    /// _PES_scrambling_control_
    pub fn pes_scrambling_control(&self) -> u8 {
        self.flags[0] >> 4 & 0b11
    }
    /// value 1 indicates higher priority and 0 indicates lower priority
    pub fn pes_priority(&self) -> u8 {
        self.flags[0] >> 3 & 1
    }
    /// if the returned value is `DataAlignment::Aligned`, then video or audio access units within
    /// this PES data are aligned to the start of PES packets.
    pub fn data_alignment_indicator(&self) -> DataAlignment {
        if self.flags[0] & 0b100 != 0 {
            DataAlignment::Aligned
        } else {
            DataAlignment::NotAligned
        }
    }
    /// Indicates copyright status of the material in this PES data.
    pub fn copyright(&self) -> Copyright {
        if self.flags[0] & 0b10 != 0 {
            Copyright::Protected
        } else {
            Copyright::Undefined
        }
    }
    /// Indicates the originality of the data in this PES stream.
    pub fn original_or_copy(&self) -> OriginalOrCopy {
        if self.flags[0] & 0b1 != 0 {
            OriginalOrCopy::Original
        } else {
            OriginalOrCopy::Copy
        }
    }
    /// the 2-bit _PTS_DTS_flags_ value
    pub fn pts_dts_flags(&self) -> u8 {
        self.flags[1] >> 6
    }
    /// _ESCR_flag_
    pub fn escr_flag(&self) -> bool {
        self.flags[1] >> 5 & 1 != 0
    }
    /// _ES_rate_flag_
    pub fn es_rate_flag(&self) -> bool {
        self.flags[1] >> 4 & 1 != 0
    }
    /// _DSM_trick_mode_flag_
    pub fn dsm_trick_mode_flag(&self) -> bool {
        self.flags[1] >> 3 & 1 != 0
    }
    /// _additional_copy_info_flag_
    pub fn additional_copy_info_flag(&self) -> bool {
        self.flags[1] >> 2 & 1 != 0
    }
    /// _PES_CRC_flag_
    pub fn pes_crc_flag(&self) -> bool {
        self.flags[1] >> 1 & 1 != 0
    }
    /// _PES_extension_flag_
    pub fn pes_extension_flag(&self) -> bool {
        self.flags[1] & 1 != 0
    }
    /// _PES_header_data_length_; the number of optional header bytes following this field
    pub fn pes_header_data_length(&self) -> u8 {
        self.pes_header_data_length
    }
    /// The decoded timestamps
    pub fn pts_dts(&self) -> PtsDts {
        self.pts_dts
    }
    /// The 'Elementary Stream Clock Reference' value, if present
    pub fn escr(&self) -> Option<ClockRef> {
        self.escr
    }
    /// The 'Elementary Stream Rate' value, if present
    pub fn es_rate(&self) -> Option<EsRate> {
        self.es_rate
    }
}

/// Header at the start of every PES packet, per _ISO/IEC 13818-1, Section 2.4.3.6_.
///
/// Decoded eagerly by [`parse()`](#method.parse); the fields of the optional header are only
/// present for stream ids where
/// [`StreamId::has_optional_header()`](enum.StreamId.html#method.has_optional_header) is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PesHeader {
    stream_id: StreamId,
    pes_packet_length: u16,
    optional: Option<PesOptionalHeader>,
}
impl PesHeader {
    /// Size of the fixed part of the header: start code prefix, stream id and packet length.
    pub const FIXED_HEADER_SIZE: usize = 6;

    /// The required value of the 24-bit _packet_start_code_prefix_.
    pub const START_CODE_PREFIX: u32 = 0x000001;

    /// Decode the PES header at the start of `buf`.
    ///
    /// Fails if the buffer is too small to hold the fixed header, or if the PES 'start code
    /// prefix' is missing.  Problems with the optional header are not failures: they are
    /// logged, and the affected fields are reported absent.
    pub fn parse(buf: &[u8]) -> Result<PesHeader, PesError> {
        if buf.len() < Self::FIXED_HEADER_SIZE {
            return Err(PesError::NotEnoughData {
                requested: Self::FIXED_HEADER_SIZE,
                available: buf.len(),
            });
        }
        let packet_start_code_prefix =
            u32::from(buf[0]) << 16 | u32::from(buf[1]) << 8 | u32::from(buf[2]);
        if packet_start_code_prefix != Self::START_CODE_PREFIX {
            return Err(PesError::StartCodePrefixMismatch(packet_start_code_prefix));
        }
        let stream_id = StreamId::from(buf[3]);
        let pes_packet_length = u16::from(buf[4]) << 8 | u16::from(buf[5]);
        let mut header = PesHeader {
            stream_id,
            pes_packet_length,
            optional: None,
        };
        if stream_id.has_optional_header() {
            let required = Self::FIXED_HEADER_SIZE + PesOptionalHeader::FIXED_SIZE;
            if pes_packet_length != 0
                && usize::from(pes_packet_length) < PesOptionalHeader::FIXED_SIZE
            {
                warn!(
                    "PES_packet_length {} too small for the optional header of {:?}",
                    pes_packet_length, stream_id
                );
            } else if buf.len() < required {
                warn!(
                    "buffer of {} bytes too small to hold the optional header of {:?}",
                    buf.len(),
                    stream_id
                );
            } else {
                header.optional = Some(PesOptionalHeader::parse(
                    &buf[Self::FIXED_HEADER_SIZE..],
                ));
            }
        }
        Ok(header)
    }

    /// Indicator of the type of stream
    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// The raw 16-bit _PES_packet_length_ field; `0` means the length is unbounded.
    pub fn packet_length(&self) -> u16 {
        self.pes_packet_length
    }

    /// The overall length of the PES packet following the fixed 6-byte header, once all pieces
    /// from the transport stream have been collected.
    pub fn pes_packet_length(&self) -> PesLength {
        match num::NonZeroU16::new(self.pes_packet_length) {
            None => PesLength::Unbounded,
            Some(l) => PesLength::Bounded(l),
        }
    }

    /// Total size of the PES packet including the fixed header, or `None` if unbounded.
    pub fn total_len(&self) -> Option<usize> {
        match self.pes_packet_length() {
            PesLength::Unbounded => None,
            PesLength::Bounded(l) => Some(Self::FIXED_HEADER_SIZE + usize::from(l.get())),
        }
    }

    /// Number of header bytes preceding the PES packet payload: `6`, or `9 +
    /// PES_header_data_length` if the optional header is present.
    pub fn header_len(&self) -> usize {
        Self::FIXED_HEADER_SIZE
            + self.optional.map_or(0, |o| {
                PesOptionalHeader::FIXED_SIZE + usize::from(o.pes_header_data_length)
            })
    }

    /// The optional header fields, if present
    pub fn optional_header(&self) -> Option<&PesOptionalHeader> {
        self.optional.as_ref()
    }

    /// The decoded timestamps (`PtsDts::None` if there is no optional header)
    pub fn pts_dts(&self) -> PtsDts {
        self.optional.map_or(PtsDts::None, |o| o.pts_dts)
    }

    /// The Presentation Time Stamp, if present
    pub fn pts(&self) -> Option<Timestamp> {
        self.pts_dts().pts()
    }

    /// The Decode Time Stamp, if present
    pub fn dts(&self) -> Option<Timestamp> {
        self.pts_dts().dts()
    }
}
