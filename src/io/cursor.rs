use crate::error::DecodeError;

// =============================================================================
// Little-Endian Helper Functions
// =============================================================================
//
// CBF payloads are always little-endian, whatever the host. These helpers
// expect the caller to have checked the slice length; `ByteCursor` does.

/// Read a little-endian u16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_u16_le(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

/// Read a little-endian i16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_i16_le(bytes: &[u8]) -> i16 {
    i16::from_le_bytes([bytes[0], bytes[1]])
}

/// Read a little-endian i32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_i32_le(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

// =============================================================================
// ByteCursor
// =============================================================================

/// Forward-only reader over an immutable byte slice.
///
/// Every read checks that enough bytes remain and returns
/// [`DecodeError::Truncated`] otherwise. `peek_*` methods leave the
/// position unchanged; `read_*` methods advance past the value.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the slice.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Move forward by `n` bytes.
    pub fn advance(&mut self, n: usize) -> Result<(), DecodeError> {
        self.window(n)?;
        self.pos += n;
        Ok(())
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, DecodeError> {
        Ok(self.window(1)?[0])
    }

    /// Look at the next two bytes as a little-endian u16 without consuming them.
    pub fn peek_u16_le(&self) -> Result<u16, DecodeError> {
        Ok(read_u16_le(self.window(2)?))
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        let value = self.window(1)?[0] as i8;
        self.pos += 1;
        Ok(value)
    }

    pub fn read_i16_le(&mut self) -> Result<i16, DecodeError> {
        let value = read_i16_le(self.window(2)?);
        self.pos += 2;
        Ok(value)
    }

    pub fn read_i32_le(&mut self) -> Result<i32, DecodeError> {
        let value = read_i32_le(self.window(4)?);
        self.pos += 4;
        Ok(value)
    }

    /// Borrow the next `len` bytes, failing if fewer remain.
    fn window(&self, len: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if available < len {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed: len,
                available,
            });
        }
        Ok(&self.data[self.pos..self.pos + len])
    }
}
