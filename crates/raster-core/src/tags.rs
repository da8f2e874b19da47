//! Tag list: ordered image metadata.
//!
//! A [`TagList`] holds [`Tag`] entries in insertion order. Entries are found
//! either by name or by numeric code, and duplicates are allowed: codecs store
//! repeated comments or per-frame values under the same key. Searches take a
//! start index so every match can be enumerated.
//!
//! ```rust
//! use raster_core::TagList;
//!
//! let mut tags = TagList::new();
//! tags.add_int(Some("comment"), -1, 0).unwrap();
//! tags.add(Some("comment"), -1, Some(b"second"), 0).unwrap();
//!
//! let first = tags.find_by_name("comment", 0).unwrap();
//! let second = tags.find_by_name("comment", first + 1).unwrap();
//! assert_eq!(tags.get(second).unwrap().payload(), Some(&b"second"[..]));
//! assert_eq!(tags.delete_all_by_name("comment"), 2);
//! ```

use crate::error::{alloc_error, Result};

/// Code used by tags that have no numeric identity.
pub const NO_CODE: i32 = -1;

/// One metadata entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: Option<String>,
    code: i32,
    payload: Option<Vec<u8>>,
    int_value: i32,
}

impl Tag {
    /// Tag name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Numeric code, [`NO_CODE`] when unused.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Byte payload, if present.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Integer value. Only meaningful when there is no payload.
    pub fn int_value(&self) -> i32 {
        self.int_value
    }

    /// The payload decoded as UTF-8, if present and valid.
    pub fn as_str(&self) -> Option<&str> {
        self.payload().and_then(|p| std::str::from_utf8(p).ok())
    }
}

/// Ordered, duplicate-permitting list of [`Tag`]s.
#[derive(Debug, Clone, Default)]
pub struct TagList {
    entries: Vec<Tag>,
}

impl TagList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tag.
    ///
    /// The name and payload are copied. Fails only if memory for the entry or
    /// its copies cannot be reserved; nothing is added in that case.
    pub fn add(
        &mut self,
        name: Option<&str>,
        code: i32,
        payload: Option<&[u8]>,
        int_value: i32,
    ) -> Result<()> {
        self.entries
            .try_reserve(1)
            .map_err(|e| alloc_error(std::mem::size_of::<Tag>(), e))?;

        let name = match name {
            Some(n) => {
                let mut owned = String::new();
                owned.try_reserve_exact(n.len()).map_err(|e| alloc_error(n.len(), e))?;
                owned.push_str(n);
                Some(owned)
            }
            None => None,
        };
        let payload = match payload {
            Some(p) => {
                let mut owned = Vec::new();
                // `name` is released on this path when it goes out of scope
                owned.try_reserve_exact(p.len()).map_err(|e| alloc_error(p.len(), e))?;
                owned.extend_from_slice(p);
                Some(owned)
            }
            None => None,
        };

        tracing::trace!(?name, code, int_value, "tags::add");
        self.entries.push(Tag {
            name,
            code,
            payload,
            int_value,
        });
        Ok(())
    }

    /// Appends a tag carrying only an integer value.
    pub fn add_int(&mut self, name: Option<&str>, code: i32, int_value: i32) -> Result<()> {
        self.add(name, code, None, int_value)
    }

    /// Index of the first tag at or after `start` named `name`.
    pub fn find_by_name(&self, name: &str, start: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, t)| t.name.as_deref() == Some(name))
            .map(|(i, _)| i)
    }

    /// Index of the first tag at or after `start` with code `code`.
    pub fn find_by_code(&self, code: i32, start: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, t)| t.code == code)
            .map(|(i, _)| i)
    }

    /// Removes the entry at `index`, keeping the order of the others.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn delete(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.entries.remove(index);
            true
        } else {
            false
        }
    }

    /// Removes every tag named `name`, returning how many were removed.
    pub fn delete_all_by_name(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|t| t.name.as_deref() != Some(name));
        before - self.entries.len()
    }

    /// Removes every tag with code `code`, returning how many were removed.
    pub fn delete_all_by_code(&mut self, code: i32) -> usize {
        let before = self.entries.len();
        self.entries.retain(|t| t.code != code);
        before - self.entries.len()
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.entries.get(index)
    }

    /// Integer value of the first tag named `name`.
    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.find_by_name(name, 0)
            .and_then(|i| self.entries.get(i))
            .map(|t| t.int_value)
    }

    /// Payload of the first tag named `name`, as UTF-8.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.find_by_name(name, 0)
            .and_then(|i| self.entries.get(i))
            .and_then(Tag::as_str)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a TagList {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
