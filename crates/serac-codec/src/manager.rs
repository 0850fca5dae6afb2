//! Versioned codec manager
//!
//! The wire format evolves by codec version. Every encoded message leads
//! with a 2-byte version tag; the manager resolves the tag to the codec
//! collection registered for that version and delegates the rest of the
//! buffer to it.

use std::collections::BTreeMap;

use crate::{CodecError, Reader, Result, Writer};

/// Collection of codecs keyed by wire version.
///
/// `C` is whatever one version's worth of registries looks like to the
/// caller; the manager only owns the version prefix.
#[derive(Default)]
pub struct Manager<C> {
    codecs: BTreeMap<u16, C>,
}

impl<C> Manager<C> {
    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            codecs: BTreeMap::new(),
        }
    }

    /// Register a codec for `version`.
    ///
    /// Registering a version twice is a programming bug and fails with
    /// [`CodecError::DuplicateVersion`].
    pub fn register(&mut self, version: u16, codec: C) -> Result<()> {
        if self.codecs.contains_key(&version) {
            return Err(CodecError::DuplicateVersion { version });
        }
        self.codecs.insert(version, codec);
        Ok(())
    }

    /// Look up the codec for `version`
    pub fn get(&self, version: u16) -> Result<&C> {
        self.codecs
            .get(&version)
            .ok_or(CodecError::UnknownVersion { version })
    }

    /// Highest registered version, if any
    pub fn latest_version(&self) -> Option<u16> {
        self.codecs.keys().next_back().copied()
    }

    /// Encode: write the 2-byte version, then run `f` with that version's
    /// codec. Returns the produced bytes.
    pub fn pack<F>(&self, version: u16, f: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&C, &mut Writer) -> Result<()>,
    {
        let codec = self.get(version)?;
        let mut w = Writer::new();
        w.put_u16(version);
        f(codec, &mut w)?;
        Ok(w.into_bytes())
    }

    /// Decode: read the leading 2-byte version, resolve its codec, and run
    /// `f` over the remainder. Returns the version alongside the value; the
    /// closure decides whether the outer type is statically known or goes
    /// through a registry's polymorphic dispatch.
    pub fn unpack<T, F>(&self, bytes: &[u8], f: F) -> Result<(u16, T)>
    where
        F: FnOnce(&C, &mut Reader<'_>) -> Result<T>,
    {
        let mut r = Reader::new(bytes);
        let version = r.get_u16()?;
        let codec = self.get(version)?;
        let value = f(codec, &mut r)?;
        Ok((version, value))
    }

    /// Like [`Manager::unpack`], but requires the whole buffer to be
    /// consumed. Messages from a node arrive as exact byte strings, so
    /// trailing bytes mean a framing bug.
    pub fn unpack_all<T, F>(&self, bytes: &[u8], f: F) -> Result<(u16, T)>
    where
        F: FnOnce(&C, &mut Reader<'_>) -> Result<T>,
    {
        let mut r = Reader::new(bytes);
        let version = r.get_u16()?;
        let codec = self.get(version)?;
        let value = f(codec, &mut r)?;
        if !r.is_empty() {
            return Err(CodecError::TrailingBytes {
                remaining: r.remaining_len(),
            });
        }
        Ok((version, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_version_rejected() {
        let mut manager: Manager<u8> = Manager::new();
        manager.register(0, 1).unwrap();
        assert_eq!(
            manager.register(0, 2).unwrap_err(),
            CodecError::DuplicateVersion { version: 0 }
        );
        manager.register(1, 2).unwrap();
        assert_eq!(manager.latest_version(), Some(1));
    }

    #[test]
    fn test_unknown_version_fails() {
        let manager: Manager<u8> = Manager::new();
        assert_eq!(
            manager.get(3).unwrap_err(),
            CodecError::UnknownVersion { version: 3 }
        );

        let bytes = [0u8, 3, 0xff];
        assert_eq!(
            manager
                .unpack(&bytes, |_, r| r.get_u8())
                .unwrap_err(),
            CodecError::UnknownVersion { version: 3 }
        );
    }

    #[test]
    fn test_pack_prefixes_version() {
        let mut manager: Manager<()> = Manager::new();
        manager.register(7, ()).unwrap();

        let bytes = manager
            .pack(7, |_, w| {
                w.put_u32(42);
                Ok(())
            })
            .unwrap();
        assert_eq!(bytes, vec![0, 7, 0, 0, 0, 42]);

        let (version, value) = manager.unpack_all(&bytes, |_, r| r.get_u32()).unwrap();
        assert_eq!(version, 7);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut manager: Manager<()> = Manager::new();
        manager.register(0, ()).unwrap();

        let bytes = [0u8, 0, 1, 2];
        let err = manager.unpack_all(&bytes, |_, r| r.get_u8()).unwrap_err();
        assert_eq!(err, CodecError::TrailingBytes { remaining: 1 });

        // Non-strict unpack tolerates the remainder.
        let (_, value) = manager.unpack(&bytes, |_, r| r.get_u8()).unwrap();
        assert_eq!(value, 1);
    }
}
