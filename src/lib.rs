//! Structures for parsing MPEG2 Transport Stream packets, per the _ISO/IEC 13818-1_ standard, and
//! for reassembling the Packetised Elementary Stream packets they carry.
//!
//! # Design principals
//!
//!  * *Decode eagerly, borrow where possible*.  Packet headers, adaptation fields and PES headers
//!    are fully decoded by their `parse()` functions into small `Copy` values.  Variable length
//!    blocks, such as transport private data, are borrowed from the caller's buffer.
//!  * *Non-blocking*.  The caller 'pushes' one packet at a time, and no I/O is performed by the
//!    library itself.
//!  * *Malformed input is not fatal*.  Syntax which can't be decoded at all produces an `Err`.
//!    Problems with optional parts of the syntax are logged via the `log` crate, and the
//!    affected fields are reported absent.
//!  * *Transport Neutral*.  There is no code here supporting consuming from files or the
//!    network.  The APIs accept `&[u8]`, and the caller handles providing the data from wherever.
//!
//! # Example
//!
//! ```rust
//! use mpeg2ts_assembler::packet::{AdaptationField, PacketHeader, Pid};
//! use mpeg2ts_assembler::{AbsorbOutcome, PesAssembler};
//!
//! // a packet on PID 0x100 with an adaptation field (all stuffing), followed by a complete
//! // 10 byte padding-stream PES packet
//! let mut packet = vec![0x47, 0x41, 0x00, 0x30, 173, 0x00];
//! packet.resize(4 + 1 + 173, 0xff);
//! packet.extend_from_slice(&[0x00, 0x00, 0x01, 0xbe, 0x00, 0x04, 0xff, 0xff, 0xff, 0xff]);
//!
//! let mut assembler = PesAssembler::new(Pid::new(0x100));
//! let header = PacketHeader::parse(&packet)?;
//! let af = AdaptationField::parse(&packet[PacketHeader::SIZE..], header.adaptation_control())?;
//! assert_eq!(
//!     assembler.absorb(&packet, &header, af.as_ref()),
//!     AbsorbOutcome::Finished { len: 10 }
//! );
//! assert_eq!(assembler.packet()[3], 0xbe);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, future_incompatible, missing_docs)]

pub mod assembler;
pub mod packet;
pub mod pes;

pub use crate::assembler::{AbsorbOutcome, PesAssembler};

/// The PID of the null packets used to pad a transport stream to a constant bitrate.
pub const STUFFING_PID: packet::Pid = packet::Pid::NULL;
