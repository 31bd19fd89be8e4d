use alloc::{borrow::Cow, string::String, vec::Vec};
use core::{fmt, iter, ops::Index, slice};

use bstr::{BStr, BString, ByteSlice};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// One parsed row: the ordered field values between two record delimiters.
///
/// Fields are kept as raw bytes. When the session decodes its input the bytes
/// are valid UTF-8; in pass-through mode they are whatever the input held.
/// Text views ([`Record::to_strings_lossy`], the `Serialize` impl) replace
/// invalid UTF-8 with U+FFFD.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Record {
    fields: Vec<BString>,
}

impl Record {
    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    ///
    /// The tokenizer never emits such a record; the smallest emitted record
    /// holds one (possibly empty) field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BStr> {
        self.fields.get(index).map(as_field)
    }

    /// Iterates over the fields in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &BStr> + '_ {
        self.into_iter()
    }

    /// Field values as text, replacing invalid UTF-8.
    #[must_use]
    pub fn to_strings_lossy(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.to_str_lossy().into_owned())
            .collect()
    }

    /// Total number of field bytes held by the record.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.fields.iter().map(|f| f.len()).sum()
    }

    /// Consumes the record, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> Vec<BString> {
        self.fields
    }
}

impl From<Vec<BString>> for Record {
    fn from(fields: Vec<BString>) -> Self {
        Self { fields }
    }
}

impl Index<usize> for Record {
    type Output = BStr;

    fn index(&self, index: usize) -> &BStr {
        self.fields[index].as_bstr()
    }
}

fn as_field(field: &BString) -> &BStr {
    field.as_bstr()
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a BStr;
    type IntoIter = iter::Map<slice::Iter<'a, BString>, fn(&'a BString) -> &'a BStr>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields
            .iter()
            .map(as_field as fn(&'a BString) -> &'a BStr)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.iter()).finish()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.fields.len()))?;
        for field in &self.fields {
            let text: Cow<'_, str> = field.to_str_lossy();
            seq.serialize_element(&*text)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec};

    use bstr::{BStr, ByteSlice};

    use crate::record;

    #[test]
    fn lossy_views_replace_invalid_utf8() {
        let r = record!["Gr", b"\xf6ger".as_slice()];
        assert_eq!(r.to_strings_lossy(), vec!["Gr", "\u{FFFD}ger"]);
        assert_eq!(r.byte_len(), 6);
        assert_eq!(&r[1], b"\xf6ger".as_slice());
    }

    #[test]
    fn serializes_as_json_array() {
        let r = record!["a", "say \"hi\"", ""];
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"["a","say \"hi\"",""]"#.to_string()
        );
    }

    #[test]
    fn iter_and_into_iter_agree() {
        let r = record!["a", b"\xff".as_slice()];
        let by_ref: alloc::vec::Vec<&BStr> = (&r).into_iter().collect();
        let by_iter: alloc::vec::Vec<&BStr> = r.iter().collect();
        assert_eq!(by_ref, by_iter);
        assert_eq!(r.iter().len(), 2);
        assert_eq!(r.get(1), Some(b"\xff".as_bstr()));
        for (i, field) in (&r).into_iter().enumerate() {
            assert_eq!(field, &r[i]);
        }
    }

    #[test]
    fn debug_shows_fields() {
        let r = record!["x", "y"];
        assert_eq!(alloc::format!("{r:?}"), r#"["x", "y"]"#);
    }
}
