//! Primitive wire codecs
//!
//! Provides the `Writer`/`Reader` byte cursors and the `Wire` trait for
//! fixed-width and length-prefixed encodings. All multi-byte integers are
//! big-endian.
//!
//! # Wire format
//!
//! | Value        | Encoding                          |
//! |--------------|-----------------------------------|
//! | u8..u64, i64 | fixed width, big-endian           |
//! | bool         | 1 byte, 0 or 1                    |
//! | `[u8; N]`    | N raw bytes                       |
//! | byte string  | 4-byte BE length + raw bytes      |
//! | string       | 2-byte BE length + UTF-8 bytes    |
//! | list of T    | 4-byte BE count + T encodings     |

use crate::{CodecError, Result};

/// Append-only byte buffer for encoding.
///
/// Appends are infallible except for length-prefixed strings, whose 2-byte
/// prefix caps them at [`u16::MAX`] bytes.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the produced bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// View the bytes produced so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a single byte
    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    /// Append a 16-bit big-endian integer
    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Append a 32-bit big-endian integer
    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Append a 64-bit big-endian integer
    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Append a 64-bit big-endian signed integer
    pub fn put_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Append a boolean as a single 0/1 byte
    pub fn put_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    /// Append raw bytes with no prefix (fixed-width fields)
    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a 4-byte length prefix followed by the bytes
    pub fn put_byte_string(&mut self, bytes: &[u8]) {
        self.put_u32(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
    }

    /// Append a 2-byte length prefix followed by UTF-8 bytes.
    ///
    /// Strings longer than the prefix can describe fail with
    /// [`CodecError::StringTooLong`]; nothing is written on failure.
    pub fn put_str(&mut self, s: &str) -> Result<()> {
        if s.len() > u16::MAX as usize {
            return Err(CodecError::StringTooLong {
                len: s.len(),
                max: u16::MAX as usize,
            });
        }
        self.put_u16(s.len() as u16);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Borrowing cursor for decoding.
///
/// Every read either consumes exactly the encoded width or fails with
/// [`CodecError::UnexpectedEof`] carrying the attempted offset. The cursor
/// never silently truncates.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader over a byte buffer
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte offset from the start of the buffer
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Unconsumed suffix of the input
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Number of unconsumed bytes
    pub fn remaining_len(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the entire input has been consumed
    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Consume and return the next `n` bytes
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.remaining_len();
        if available < n {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read a single byte
    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a 16-bit big-endian integer
    pub fn get_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a 32-bit big-endian integer
    pub fn get_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a 64-bit big-endian integer
    pub fn get_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(raw))
    }

    /// Read a 64-bit big-endian signed integer
    pub fn get_i64(&mut self) -> Result<i64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_be_bytes(raw))
    }

    /// Read a boolean; any byte other than 0 or 1 is a decode error
    pub fn get_bool(&mut self) -> Result<bool> {
        let offset = self.pos;
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(CodecError::InvalidBool { offset, value }),
        }
    }

    /// Read a fixed-width byte array
    pub fn get_fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.take(N)?;
        let mut raw = [0u8; N];
        raw.copy_from_slice(bytes);
        Ok(raw)
    }

    /// Read a 4-byte length prefix followed by that many bytes
    pub fn get_byte_string(&mut self) -> Result<Vec<u8>> {
        let len = self.get_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    /// Read a 2-byte length prefix followed by UTF-8 bytes
    pub fn get_str(&mut self) -> Result<String> {
        let len = self.get_u16()? as usize;
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8 { offset })
    }
}

/// A value with a fixed or self-delimiting wire encoding.
///
/// Invariant: `read(write(v)) == v`, and `read` consumes exactly the bytes
/// `write` produced, leaving the remainder in the cursor.
pub trait Wire: Sized {
    /// Append this value's encoding to the writer
    fn write(&self, w: &mut Writer) -> Result<()>;

    /// Decode a value from the cursor, consuming exactly its encoded width
    fn read(r: &mut Reader<'_>) -> Result<Self>;
}

impl Wire for u8 {
    fn write(&self, w: &mut Writer) -> Result<()> {
        w.put_u8(*self);
        Ok(())
    }
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.get_u8()
    }
}

impl Wire for u16 {
    fn write(&self, w: &mut Writer) -> Result<()> {
        w.put_u16(*self);
        Ok(())
    }
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.get_u16()
    }
}

impl Wire for u32 {
    fn write(&self, w: &mut Writer) -> Result<()> {
        w.put_u32(*self);
        Ok(())
    }
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.get_u32()
    }
}

impl Wire for u64 {
    fn write(&self, w: &mut Writer) -> Result<()> {
        w.put_u64(*self);
        Ok(())
    }
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.get_u64()
    }
}

impl Wire for i64 {
    fn write(&self, w: &mut Writer) -> Result<()> {
        w.put_i64(*self);
        Ok(())
    }
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.get_i64()
    }
}

impl Wire for bool {
    fn write(&self, w: &mut Writer) -> Result<()> {
        w.put_bool(*self);
        Ok(())
    }
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.get_bool()
    }
}

impl<const N: usize> Wire for [u8; N] {
    fn write(&self, w: &mut Writer) -> Result<()> {
        w.put_raw(self);
        Ok(())
    }
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.get_fixed::<N>()
    }
}

impl Wire for String {
    fn write(&self, w: &mut Writer) -> Result<()> {
        w.put_str(self)
    }
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.get_str()
    }
}

impl<T: Wire> Wire for Vec<T> {
    fn write(&self, w: &mut Writer) -> Result<()> {
        w.put_u32(self.len() as u32);
        for item in self {
            item.write(w)?;
        }
        Ok(())
    }
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        read_list(r, T::read)
    }
}

/// Encode a count-prefixed sequence using `f` as the element encoder
pub fn write_list<T>(w: &mut Writer, items: &[T], mut f: impl FnMut(&mut Writer, &T)) {
    w.put_u32(items.len() as u32);
    for item in items {
        f(w, item);
    }
}

/// Decode a count-prefixed sequence using `f` as the element decoder.
///
/// A declared count that the remaining input cannot satisfy fails with
/// `UnexpectedEof` once the elements run dry.
pub fn read_list<T>(
    r: &mut Reader<'_>,
    mut f: impl FnMut(&mut Reader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = r.get_u32()? as usize;
    // Cap the initial allocation by what the buffer could possibly hold.
    let mut out = Vec::with_capacity(count.min(r.remaining_len()));
    for _ in 0..count {
        out.push(f(r)?);
    }
    Ok(out)
}
