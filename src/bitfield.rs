use std::{fmt, iter::FusedIterator};

use bytes::{BufMut, Bytes, BytesMut};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
};

use crate::{
    error::{Error, Result},
    growth::{Growth, Options},
};

/// A `Bitfield` is a packed set of boolean flags, e.g. which pieces of a
/// torrent have been downloaded.
///
/// Each flag is a single bit. Bits are stored **most-significant-bit first**
/// within each byte: bit `i` lives in byte `i >> 3` under the mask
/// `0x80 >> (i & 7)`, which is also the layout of the BitTorrent wire
/// protocol's `bitfield` message.
///
/// Indices past the end of the buffer read as `false`. Setting such an index
/// either grows the buffer or is silently ignored, depending on the
/// [`Growth`] policy the field was built with.
///
/// The field owns its buffer; mutation needs `&mut self`, so callers sharing
/// one between threads have to bring their own lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitfield {
    bits: BytesMut,
    growth: Growth,
}

#[inline]
fn mask(index: usize) -> u8 {
    0x80 >> (index & 7)
}

impl Bitfield {
    /// Creates a fixed-capacity `Bitfield` able to hold at least `size` bits,
    /// all initialized to `false`.
    ///
    /// The buffer is `ceil(size / 8)` bytes long, so [`len`](Self::len) is
    /// `size` rounded up to a multiple of 8.
    pub fn new(size: usize) -> Self {
        Self::with_options(size, Options::default())
    }

    /// Creates a `Bitfield` of `size` bits with the given growth options.
    ///
    /// # Arguments
    ///
    /// * `size` - Initial number of bits; rounded up to a whole byte.
    /// * `options` - Construction options, or just a [`Growth`] policy.
    pub fn with_options(size: usize, options: impl Into<Options>) -> Self {
        Bitfield {
            bits: BytesMut::zeroed(size.div_ceil(8)),
            growth: options.into().grow,
        }
    }

    /// Like [`with_options`](Self::with_options), but takes a signed size as
    /// handed over by loosely-typed callers and rejects negative values.
    pub fn try_from_signed(size: i64, options: impl Into<Options>) -> Result<Self> {
        if size < 0 {
            return Err(Error::NegativeSize(size));
        }
        let size = usize::try_from(size).unwrap_or(usize::MAX);
        Ok(Self::with_options(size, options))
    }

    /// Constructs a `Bitfield` from previously packed bytes.
    ///
    /// The bytes are copied; later changes to the source are not visible
    /// through the field. The resulting length is `bytes.len() * 8`.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Packed bits, most-significant-bit first.
    /// * `options` - Growth policy applied to the new field.
    pub fn from_bytes(bytes: impl AsRef<[u8]>, options: impl Into<Options>) -> Self {
        Bitfield {
            bits: BytesMut::from(bytes.as_ref()),
            growth: options.into().grow,
        }
    }

    /// Returns `true` if the bit at `index` is set.
    ///
    /// Indices at or past [`len`](Self::len) are reported as unset; reading
    /// never grows the buffer.
    pub fn get(&self, index: usize) -> bool {
        match self.bits.get(index >> 3) {
            Some(byte) => byte & mask(index) != 0,
            None => false,
        }
    }

    /// Sets or clears the bit at `index`.
    ///
    /// Setting a bit past the end grows the buffer just enough to hold it if
    /// the growth policy allows; otherwise the call does nothing. Clearing a
    /// bit past the end is always a no-op.
    ///
    /// # Arguments
    ///
    /// * `index` - Bit index to write.
    /// * `value` - `true` to set the bit, `false` to clear it.
    pub fn set(&mut self, index: usize, value: bool) {
        let byte_index = index >> 3;
        if value {
            if byte_index >= self.bits.len() && !self.grow_to(index, byte_index + 1) {
                return;
            }
            self.bits[byte_index] |= mask(index);
        } else if let Some(byte) = self.bits.get_mut(byte_index) {
            *byte &= !mask(index);
        }
    }

    /// Shorthand for `set(index, true)`.
    pub fn insert(&mut self, index: usize) {
        self.set(index, true);
    }

    /// Shorthand for `set(index, false)`.
    pub fn clear(&mut self, index: usize) {
        self.set(index, false);
    }

    /// Writes `values[i]` to bit `offset + i`, in order.
    ///
    /// Each write goes through [`set`](Self::set), so growth and
    /// out-of-range handling are exactly those of individual calls.
    pub fn set_all(&mut self, values: &[bool], offset: usize) {
        for (i, &value) in values.iter().enumerate() {
            let Some(index) = offset.checked_add(i) else {
                break;
            };
            self.set(index, value);
        }
    }

    /// Calls `visitor(bit, index)` for every index in `0..len()`.
    pub fn for_each<F>(&self, visitor: F)
    where
        F: FnMut(bool, usize),
    {
        self.for_each_in(visitor, 0, self.len());
    }

    /// Calls `visitor(bit, index)` for every index in `start..end`, in
    /// ascending order. Indices past the end are visited as `false`.
    pub fn for_each_in<F>(&self, mut visitor: F, start: usize, end: usize)
    where
        F: FnMut(bool, usize),
    {
        for index in start..end {
            visitor(self.get(index), index);
        }
    }

    /// Iterates over every bit in `0..len()`.
    pub fn iter(&self) -> Iter<'_> {
        self.iter_range(0, self.len())
    }

    /// Iterates over the bits in `start..end`. The bounds are fixed when the
    /// iterator is created.
    pub fn iter_range(&self, start: usize, end: usize) -> Iter<'_> {
        Iter {
            bitfield: self,
            index: start,
            end: end.max(start),
        }
    }

    /// Returns `true` if no bit in the buffer is set.
    ///
    /// Unlike most collections this says nothing about [`len`](Self::len): a
    /// freshly built field of any size is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&byte| byte == 0)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    /// Bit capacity of the buffer, always a multiple of 8.
    pub fn len(&self) -> usize {
        self.bits.len().saturating_mul(8)
    }

    pub fn byte_len(&self) -> usize {
        self.bits.len()
    }

    pub fn growth(&self) -> Growth {
        self.growth
    }

    /// Returns the underlying packed bytes.
    ///
    /// Useful for sending the bitfield over the wire in BitTorrent messages.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Copies the packed bytes into an immutable [`Bytes`] snapshot.
    pub fn freeze(&self) -> Bytes {
        Bytes::copy_from_slice(&self.bits)
    }

    pub fn into_bytes(self) -> Bytes {
        self.bits.freeze()
    }

    fn grow_to(&mut self, index: usize, byte_len: usize) -> bool {
        if !self.growth.permits(byte_len) {
            log::debug!(
                "ignoring set of bit {}: growth {} does not allow {} bytes",
                index,
                self.growth,
                byte_len
            );
            return false;
        }
        log::trace!("growing bitfield from {} to {} bytes", self.bits.len(), byte_len);
        self.bits.resize(byte_len, 0);
        true
    }
}

impl AsRef<[u8]> for Bitfield {
    fn as_ref(&self) -> &[u8] {
        &self.bits
    }
}

impl From<Bitfield> for Bytes {
    fn from(bitfield: Bitfield) -> Self {
        bitfield.into_bytes()
    }
}

impl<'a> IntoIterator for &'a Bitfield {
    type Item = bool;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward iterator over a range of a [`Bitfield`], created by
/// [`Bitfield::iter`] and [`Bitfield::iter_range`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    bitfield: &'a Bitfield,
    index: usize,
    end: usize,
}

impl Iterator for Iter<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.index >= self.end {
            return None;
        }
        let bit = self.bitfield.get(self.index);
        self.index += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

// Only the packed bytes are persisted; a deserialized field cannot grow.
impl Serialize for Bitfield {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.bits)
    }
}

impl<'de> Deserialize<'de> for Bitfield {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_byte_buf(BitfieldVisitor)
    }
}

struct BitfieldVisitor;

impl<'de> Visitor<'de> for BitfieldVisitor {
    type Value = Bitfield;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a packed byte string")
    }

    fn visit_bytes<E>(self, v: &[u8]) -> std::result::Result<Bitfield, E>
    where
        E: de::Error,
    {
        Ok(Bitfield::from_bytes(v, Options::default()))
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Bitfield, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut bits = BytesMut::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(byte) = seq.next_element::<u8>()? {
            bits.put_u8(byte);
        }
        Ok(Bitfield {
            bits,
            growth: Growth::Disabled,
        })
    }
}
