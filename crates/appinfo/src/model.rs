//! In-memory representation of a decoded appinfo document.
//!
//! All containers preserve insertion order, which is the on-disk order for
//! decoded documents. Equality is order-sensitive: two trees holding the same
//! entries in a different order encode to different bytes and compare unequal.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::{CodecError, Result};
use crate::format::{
    FormatVersion, APP_LIST_END, CHECKSUM_LEN, TAG_INT32, TAG_INT64, TAG_SECTION, TAG_STRING,
    UNIVERSE,
};

/// A single value stored under a key in a [`SectionTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Nested tree.
    Section(SectionTree),
    /// NUL-free byte string.
    Bytes(Vec<u8>),
    Int32(u32),
    Int64(u64),
}

impl Value {
    /// The tag byte that precedes this value on disk.
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            Value::Section(_) => TAG_SECTION,
            Value::Bytes(_) => TAG_STRING,
            Value::Int32(_) => TAG_INT32,
            Value::Int64(_) => TAG_INT64,
        }
    }

    #[must_use]
    pub fn as_section(&self) -> Option<&SectionTree> {
        match self {
            Value::Section(tree) => Some(tree),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_section_mut(&mut self) -> Option<&mut SectionTree> {
        match self {
            Value::Section(tree) => Some(tree),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// UTF-8 view of a `Bytes` value. `None` for other variants or invalid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Int32(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int64(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<SectionTree> for Value {
    fn from(tree: SectionTree) -> Self {
        Value::Section(tree)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Bytes(s.as_bytes().to_vec())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int32(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Int64(n)
    }
}

/// Ordered key -> [`Value`] mapping; the format's only aggregate type.
#[derive(Debug, Clone, Default)]
pub struct SectionTree {
    entries: IndexMap<Vec<u8>, Value>,
}

impl SectionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts `value` under `key`, returning the previous value.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes `key`, shifting later entries so the order of the rest is kept.
    pub fn remove(&mut self, key: &[u8]) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.keys().map(|k| k.as_slice())
    }

    /// Follows `path` through nested sections.
    ///
    /// An empty path returns `None`; there is no value for the tree itself.
    pub fn get_path(&self, path: &[&[u8]]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut tree = self;
        for key in parents {
            tree = tree.get(key)?.as_section()?;
        }
        tree.get(last)
    }

    pub fn get_path_mut(&mut self, path: &[&[u8]]) -> Option<&mut Value> {
        let (last, parents) = path.split_last()?;
        let mut tree = self;
        for key in parents {
            tree = tree.get_mut(key)?.as_section_mut()?;
        }
        tree.get_mut(last)
    }

    /// Stores `value` at `path`, creating missing intermediate sections.
    ///
    /// Fails with [`CodecError::InvalidValue`] if `path` is empty or an
    /// intermediate key holds a non-section value.
    pub fn insert_path(&mut self, path: &[&[u8]], value: impl Into<Value>) -> Result<Option<Value>> {
        let (last, parents) = path
            .split_last()
            .ok_or_else(|| CodecError::InvalidValue("empty key path".to_string()))?;
        let mut tree = self;
        for key in parents {
            let slot = tree
                .entries
                .entry(key.to_vec())
                .or_insert_with(|| Value::Section(SectionTree::new()));
            tree = slot.as_section_mut().ok_or_else(|| {
                CodecError::InvalidValue(format!(
                    "{:?} is not a section",
                    String::from_utf8_lossy(key)
                ))
            })?;
        }
        Ok(tree.insert(last.to_vec(), value))
    }

    /// Removes the value at `path`, returning it.
    pub fn remove_path(&mut self, path: &[&[u8]]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut tree = self;
        for key in parents {
            tree = tree.get_mut(key)?.as_section_mut()?;
        }
        tree.remove(last)
    }

    /// Inserts only if `key` is absent; hands the key back otherwise.
    pub(crate) fn try_insert_new(&mut self, key: Vec<u8>, value: Value) -> std::result::Result<(), Vec<u8>> {
        match self.entries.entry(key) {
            Entry::Occupied(e) => Err(e.key().clone()),
            Entry::Vacant(e) => {
                e.insert(value);
                Ok(())
            }
        }
    }
}

impl PartialEq for SectionTree {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for SectionTree {}

impl<K: Into<Vec<u8>>> FromIterator<(K, Value)> for SectionTree {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A dialect-B section: its opaque on-disk id and its tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSection {
    /// Re-emitted unchanged by the encoder. Never `0`, which ends the list.
    pub id: u8,
    pub tree: SectionTree,
}

impl NamedSection {
    pub fn new(id: u8, tree: SectionTree) -> Self {
        Self { id, tree }
    }
}

/// Dialect-B per-app section list, keyed by section name.
pub type NamedSections = IndexMap<Vec<u8>, NamedSection>;

/// An app's section payload; its shape is fixed by the document's dialect.
#[derive(Debug, Clone)]
pub enum Sections {
    /// Dialect A.
    Single(SectionTree),
    /// Dialect B.
    Named(NamedSections),
}

impl Sections {
    /// Returns `true` if this payload shape belongs to `version`.
    #[must_use]
    pub fn matches_version(&self, version: FormatVersion) -> bool {
        match self {
            Sections::Single(_) => !version.has_named_sections(),
            Sections::Named(_) => version.has_named_sections(),
        }
    }

    /// An empty payload of the shape `version` expects.
    #[must_use]
    pub fn empty_for(version: FormatVersion) -> Self {
        if version.has_named_sections() {
            Sections::Named(NamedSections::new())
        } else {
            Sections::Single(SectionTree::new())
        }
    }
}

impl PartialEq for Sections {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Sections::Single(a), Sections::Single(b)) => a == b,
            (Sections::Named(a), Sections::Named(b)) => a.len() == b.len() && a.iter().eq(b.iter()),
            _ => false,
        }
    }
}

impl Eq for Sections {}

/// One application entry: the fixed header fields and its sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRecord {
    /// Encoded record length as stored by the producer. Informational only.
    pub size: u32,
    pub state: u32,
    /// Unix timestamp.
    pub last_update: u32,
    pub access_token: u64,
    /// Opaque 20-byte blob.
    pub checksum: [u8; CHECKSUM_LEN],
    pub change_number: u32,
    pub sections: Sections,
}

impl AppRecord {
    /// A record with zeroed header fields.
    pub fn new(sections: Sections) -> Self {
        Self {
            size: 0,
            state: 0,
            last_update: 0,
            access_token: 0,
            checksum: [0u8; CHECKSUM_LEN],
            change_number: 0,
            sections,
        }
    }
}

/// A whole appinfo file: header scalars plus app records in file order.
#[derive(Debug, Clone)]
pub struct Document {
    version: FormatVersion,
    universe: u32,
    apps: IndexMap<u32, AppRecord>,
}

impl Document {
    /// An empty document in the given dialect.
    pub fn new(version: FormatVersion) -> Self {
        Self {
            version,
            universe: UNIVERSE,
            apps: IndexMap::new(),
        }
    }

    pub(crate) fn with_apps(version: FormatVersion, universe: u32, apps: IndexMap<u32, AppRecord>) -> Self {
        Self {
            version,
            universe,
            apps,
        }
    }

    #[must_use]
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    #[must_use]
    pub fn universe(&self) -> u32 {
        self.universe
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn get(&self, app_id: u32) -> Option<&AppRecord> {
        self.apps.get(&app_id)
    }

    pub fn get_mut(&mut self, app_id: u32) -> Option<&mut AppRecord> {
        self.apps.get_mut(&app_id)
    }

    pub fn contains(&self, app_id: u32) -> bool {
        self.apps.contains_key(&app_id)
    }

    /// Inserts or replaces the record for `app_id`, returning the old one.
    ///
    /// New ids are appended; a replaced id keeps its position. App id `0`
    /// is reserved as the document terminator and a record whose sections
    /// do not match this document's dialect cannot be encoded; both fail
    /// with [`CodecError::InvalidValue`].
    pub fn insert(&mut self, app_id: u32, record: AppRecord) -> Result<Option<AppRecord>> {
        if app_id == APP_LIST_END {
            return Err(CodecError::InvalidValue(
                "app id 0 is reserved for the document terminator".to_string(),
            ));
        }
        if !record.sections.matches_version(self.version) {
            return Err(CodecError::InvalidValue(format!(
                "app {} sections do not match {:?}",
                app_id, self.version
            )));
        }
        Ok(self.apps.insert(app_id, record))
    }

    /// Removes `app_id`, keeping the order of the remaining records.
    pub fn remove(&mut self, app_id: u32) -> Option<AppRecord> {
        self.apps.shift_remove(&app_id)
    }

    /// Records in file order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &AppRecord)> {
        self.apps.iter().map(|(id, app)| (*id, app))
    }

    pub fn app_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.apps.keys().copied()
    }

    /// Decodes `data`. See [`decode`](crate::decode).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        crate::decoder::decode(data)
    }

    /// Encodes this document. See [`encode`](crate::encode).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        crate::encoder::encode(self)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.universe == other.universe
            && self.apps.len() == other.apps.len()
            && self.apps.iter().eq(other.apps.iter())
    }
}

impl Eq for Document {}
