use crate::Error;
use std::io::{Read, Seek, SeekFrom};

/// Byte order declared by the indicator octet at the start of the RPF header.
///
/// Every multi-byte integer and real in the sections that follow is read in this
/// order; the indicator itself is `0xFF` for little-endian and `0x00` for
/// big-endian files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first (`0xFF` indicator)
    Little,
    /// Most significant byte first (`0x00` indicator)
    Big,
}

impl Endian {
    pub(crate) const fn from_indicator(octet: u8) -> Option<Self> {
        match octet {
            0xFF => Some(Self::Little),
            0x00 => Some(Self::Big),
            _ => None,
        }
    }
}

/// Positioned, byte-order-aware reader shared by every section parser.
pub(crate) struct SectionReader<R> {
    inner: R,
    endian: Endian,
}

impl<R> SectionReader<R>
where
    R: Read + Seek,
{
    pub fn new(inner: R, endian: Endian) -> Self {
        Self { inner, endian }
    }

    pub const fn endian(&self) -> Endian {
        self.endian
    }

    pub fn seek_to(&mut self, pos: u64) -> Result<(), Error> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf)?;
        Ok(match self.endian {
            Endian::Little => u16::from_le_bytes(buf),
            Endian::Big => u16::from_be_bytes(buf),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(buf),
            Endian::Big => u32::from_be_bytes(buf),
        })
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf)?;
        Ok(match self.endian {
            Endian::Little => f64::from_le_bytes(buf),
            Endian::Big => f64::from_be_bytes(buf),
        })
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.inner.read_exact(buf)?;
        Ok(())
    }

    /// Reads a fixed-width ASCII field, dropping trailing padding.
    pub fn read_fixed_string(&mut self, width: usize) -> Result<String, Error> {
        let mut buf = vec![0u8; width];
        self.inner.read_exact(&mut buf)?;
        let text = String::from_utf8_lossy(&buf);
        Ok(text.trim_end_matches(['\0', ' ']).to_owned())
    }
}
