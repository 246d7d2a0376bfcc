//! Just enough NITF awareness to find the RPF header inside a frame file.
//!
//! Frame files are NITF 2.0 containers whose user-defined header region carries a
//! registered `RPFHDR` tag; the RPF sections start right after the tag's 5-digit
//! length field. A handful of producers also shipped bare frames with no NITF
//! wrapper at all, so absence of the signature is probed for rather than rejected
//! outright.

use crate::Error;
use std::io::{Read, Seek, SeekFrom};
use tracing::debug;

const NITF_SIGNATURE: &[u8] = b"NITF";
const RPF_HEADER_TAG: &[u8] = b"RPFHDR";
// Registered tags live near the start of the container; the probe never needs to
// reach pixel data.
const PROBE_SPAN: usize = 16 * 1024;

// Fixed-width field sizes of the bare RPF header, used for sniffing.
const NAME_FIELD_START: usize = 3;
const NAME_FIELD_WIDTH: usize = 12;

/// Returns the absolute offset at which the RPF header starts.
pub(crate) fn locate_rpf_header<R>(reader: &mut R) -> Result<u64, Error>
where
    R: Read + Seek,
{
    reader.seek(SeekFrom::Start(0))?;
    let mut probe = vec![0u8; PROBE_SPAN];
    let filled = read_up_to(reader, &mut probe)?;
    let probe = &probe[..filled];

    if probe.len() >= NITF_SIGNATURE.len() && &probe[..NITF_SIGNATURE.len()] == NITF_SIGNATURE {
        let Some(tag_at) = find(probe, RPF_HEADER_TAG) else {
            return Err(Error::NotRpf);
        };
        let length_field = tag_at + RPF_HEADER_TAG.len();
        let data_at = length_field + 5;
        if data_at > probe.len() {
            return Err(Error::Format("truncated RPFHDR tag".to_owned()));
        }
        if !probe[length_field..data_at].iter().all(u8::is_ascii_digit) {
            return Err(Error::Format("RPFHDR length field is not numeric".to_owned()));
        }
        debug!("RPFHDR tag at offset {tag_at}, header data at {data_at}");
        Ok(data_at as u64)
    } else if looks_like_bare_rpf(probe) {
        debug!("no NITF signature, reading as a bare RPF frame");
        Ok(0)
    } else {
        Err(Error::NotRpf)
    }
}

fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, Error> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// A bare frame starts with the endian indicator octet followed by a 2-byte
/// header length and 12 bytes of printable filename.
fn looks_like_bare_rpf(probe: &[u8]) -> bool {
    if probe.len() < NAME_FIELD_START + NAME_FIELD_WIDTH {
        return false;
    }
    if !matches!(probe[0], 0x00 | 0xFF) {
        return false;
    }
    probe[NAME_FIELD_START..NAME_FIELD_START + NAME_FIELD_WIDTH]
        .iter()
        .all(|b| b.is_ascii_graphic() || *b == b' ')
}
