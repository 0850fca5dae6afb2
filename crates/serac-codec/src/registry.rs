//! Wire-type-id registry
//!
//! Polymorphic values are encoded self-describingly as a 4-byte type id
//! followed by the value's own fields. Each codec version owns one registry
//! per polymorphic family; the registry maps a value's stable tag to its
//! wire id on encode and resolves the id back to a decode function on
//! decode. Indices may be reserved (holes) so wire ids stay aligned across
//! versions when a kind is retired.
//!
//! Dispatch is a closed table over known kinds rather than reflection: the
//! wallet side models each family as an enum and registers one read function
//! per variant.

use std::collections::HashMap;

use crate::{CodecError, Reader, Result, Writer};

/// A value that participates in registry-dispatched encoding.
///
/// The context parameter `C` is the codec collection for one wire version;
/// it is threaded through encoding so nested polymorphic fields can recurse
/// into their own registries.
pub trait Tagged<C> {
    /// Stable tag identifying the concrete kind, independent of wire id
    fn wire_tag(&self) -> &'static str;

    /// Append the value's fields (without the type-id prefix)
    fn write_fields(&self, w: &mut Writer, ctx: &C) -> Result<()>;
}

/// Decode function registered for one wire id
pub type ReadFn<T, C> = fn(&mut Reader<'_>, &C) -> Result<T>;

struct Slot<T, C> {
    tag: &'static str,
    read: ReadFn<T, C>,
}

/// Ordered table mapping wire ids to decode functions for one family `T`.
pub struct Registry<T, C> {
    slots: Vec<Option<Slot<T, C>>>,
    by_tag: HashMap<&'static str, u32>,
}

/// Builder declaring registry slots in wire-id order.
pub struct RegistryBuilder<T, C> {
    slots: Vec<Option<Slot<T, C>>>,
}

impl<T, C> RegistryBuilder<T, C> {
    /// Register the next wire id for `tag`, decoded by `read`
    pub fn slot(mut self, tag: &'static str, read: ReadFn<T, C>) -> Self {
        self.slots.push(Some(Slot { tag, read }));
        self
    }

    /// Reserve the next wire id without a constructor (a hole)
    pub fn skip(mut self) -> Self {
        self.slots.push(None);
        self
    }

    /// Finish the table; duplicate tags are a registration error
    pub fn build(self) -> Result<Registry<T, C>> {
        let mut by_tag = HashMap::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = slot {
                if by_tag.insert(slot.tag, index as u32).is_some() {
                    return Err(CodecError::DuplicateTag { tag: slot.tag });
                }
            }
        }
        Ok(Registry {
            slots: self.slots,
            by_tag,
        })
    }
}

impl<T, C> Registry<T, C> {
    /// Start declaring a registry
    pub fn builder() -> RegistryBuilder<T, C> {
        RegistryBuilder { slots: Vec::new() }
    }

    /// Wire id registered for `tag`, if any
    pub fn wire_id(&self, tag: &'static str) -> Option<u32> {
        self.by_tag.get(tag).copied()
    }

    /// Encode `value` as its 4-byte wire id followed by its fields.
    ///
    /// Fails with [`CodecError::UnregisteredType`] when the value's kind was
    /// never registered with this codec version.
    pub fn pack_prefix(&self, w: &mut Writer, value: &T, ctx: &C) -> Result<()>
    where
        T: Tagged<C>,
    {
        let tag = value.wire_tag();
        let id = self
            .by_tag
            .get(tag)
            .copied()
            .ok_or(CodecError::UnregisteredType { tag })?;
        w.put_u32(id);
        value.write_fields(w, ctx)
    }

    /// Decode a 4-byte wire id and delegate to the registered constructor.
    ///
    /// An out-of-range id or a reserved hole fails with
    /// [`CodecError::UnknownTypeId`].
    pub fn unpack_prefix(&self, r: &mut Reader<'_>, ctx: &C) -> Result<T> {
        let id = r.get_u32()?;
        let slot = self
            .slots
            .get(id as usize)
            .and_then(|s| s.as_ref())
            .ok_or(CodecError::UnknownTypeId { id })?;
        (slot.read)(r, ctx)
    }

    /// Encode a count-prefixed list with [`Registry::pack_prefix`] as the
    /// element encoder
    pub fn pack_prefix_list(&self, w: &mut Writer, values: &[T], ctx: &C) -> Result<()>
    where
        T: Tagged<C>,
    {
        w.put_u32(values.len() as u32);
        for value in values {
            self.pack_prefix(w, value, ctx)?;
        }
        Ok(())
    }

    /// Decode a count-prefixed list with [`Registry::unpack_prefix`] as the
    /// element decoder
    pub fn unpack_prefix_list(&self, r: &mut Reader<'_>, ctx: &C) -> Result<Vec<T>> {
        let count = r.get_u32()? as usize;
        let mut out = Vec::with_capacity(count.min(r.remaining_len()));
        for _ in 0..count {
            out.push(self.unpack_prefix(r, ctx)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Shape {
        Point { x: u32 },
        Line { len: u64 },
    }

    impl Tagged<()> for Shape {
        fn wire_tag(&self) -> &'static str {
            match self {
                Shape::Point { .. } => "point",
                Shape::Line { .. } => "line",
            }
        }

        fn write_fields(&self, w: &mut Writer, _ctx: &()) -> Result<()> {
            match self {
                Shape::Point { x } => w.put_u32(*x),
                Shape::Line { len } => w.put_u64(*len),
            }
            Ok(())
        }
    }

    fn read_point(r: &mut Reader<'_>, _ctx: &()) -> Result<Shape> {
        Ok(Shape::Point { x: r.get_u32()? })
    }

    fn read_line(r: &mut Reader<'_>, _ctx: &()) -> Result<Shape> {
        Ok(Shape::Line { len: r.get_u64()? })
    }

    fn registry() -> Registry<Shape, ()> {
        Registry::builder()
            .slot("point", read_point)
            .slot("line", read_line)
            .build()
            .unwrap()
    }

    #[test]
    fn test_second_slot_encodes_as_id_one() {
        let reg = registry();
        let line = Shape::Line { len: 9 };

        let mut w = Writer::new();
        reg.pack_prefix(&mut w, &line, &()).unwrap();
        let bytes = w.into_bytes();

        // 4-byte id 1, then the value's own fields.
        assert_eq!(&bytes[..4], &[0, 0, 0, 1]);

        let mut r = Reader::new(&bytes);
        let decoded = reg.unpack_prefix(&mut r, &()).unwrap();
        assert_eq!(decoded, line);
        assert!(r.is_empty());
    }

    #[test]
    fn test_unknown_type_id_fails() {
        let reg = registry();
        let mut w = Writer::new();
        w.put_u32(7);
        w.put_u32(0);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(
            reg.unpack_prefix(&mut r, &()).unwrap_err(),
            CodecError::UnknownTypeId { id: 7 }
        );
    }

    #[test]
    fn test_hole_is_unknown_type_id() {
        let reg: Registry<Shape, ()> = Registry::builder()
            .skip()
            .slot("point", read_point)
            .build()
            .unwrap();

        let mut w = Writer::new();
        w.put_u32(0);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(
            reg.unpack_prefix(&mut r, &()).unwrap_err(),
            CodecError::UnknownTypeId { id: 0 }
        );

        // The slot after the hole got id 1.
        assert_eq!(reg.wire_id("point"), Some(1));
    }

    #[test]
    fn test_unregistered_type_fails_encode() {
        let reg: Registry<Shape, ()> = Registry::builder()
            .slot("point", read_point)
            .build()
            .unwrap();

        let mut w = Writer::new();
        assert_eq!(
            reg.pack_prefix(&mut w, &Shape::Line { len: 1 }, &())
                .unwrap_err(),
            CodecError::UnregisteredType { tag: "line" }
        );
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let result: Result<Registry<Shape, ()>> = Registry::builder()
            .slot("point", read_point)
            .slot("point", read_point)
            .build();
        assert!(matches!(
            result,
            Err(CodecError::DuplicateTag { tag: "point" })
        ));
    }

    #[test]
    fn test_prefix_list_round_trip() {
        let reg = registry();
        let values = vec![
            Shape::Point { x: 1 },
            Shape::Line { len: 2 },
            Shape::Point { x: 3 },
        ];

        let mut w = Writer::new();
        reg.pack_prefix_list(&mut w, &values, &()).unwrap();
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(reg.unpack_prefix_list(&mut r, &()).unwrap(), values);
        assert!(r.is_empty());
    }
}
