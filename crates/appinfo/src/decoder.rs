use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::cursor::Cursor;
use crate::error::{CodecError, KeyRef, Result};
use crate::format::{
    FormatVersion, APP_LIST_END, CHECKSUM_LEN, HEADER_BYTES, MAX_DEPTH, SECTION_LIST_END,
    TAG_END, TAG_INT32, TAG_INT64, TAG_SECTION, TAG_STRING, UNIVERSE,
};
use crate::model::{AppRecord, Document, NamedSection, NamedSections, SectionTree, Sections, Value};

/// Decodes a complete appinfo buffer into a [`Document`].
///
/// # Layout
///
/// ```text
/// [version: u32][universe: u32]
/// repeated: [app_id: u32][app header: 44 B][sections]
/// [0u32]
/// ```
///
/// Bytes after the terminating zero app id are ignored.
///
/// # Errors
///
/// Any structural violation aborts the whole decode; no partial document is
/// returned.
pub fn decode(data: &[u8]) -> Result<Document> {
    let mut cur = Cursor::new(data);

    if data.len() < HEADER_BYTES {
        return Err(CodecError::InvalidHeader { len: data.len() });
    }
    let magic = cur.read_u32_le()?;
    let universe = cur.read_u32_le()?;

    let version = FormatVersion::from_magic(magic).ok_or(CodecError::UnsupportedVersion(magic))?;
    if universe != UNIVERSE {
        return Err(CodecError::UnsupportedUniverse(universe));
    }

    let mut apps: IndexMap<u32, AppRecord> = IndexMap::new();
    loop {
        let app_offset = cur.position();
        let app_id = cur.read_u32_le()?;
        if app_id == APP_LIST_END {
            break;
        }

        let record = read_app(&mut cur, version)?;
        match apps.entry(app_id) {
            Entry::Occupied(_) => {
                return Err(CodecError::DuplicateKey {
                    key: KeyRef::AppId(app_id),
                    offset: app_offset,
                })
            }
            Entry::Vacant(e) => {
                e.insert(record);
            }
        }
    }

    Ok(Document::with_apps(version, universe, apps))
}

/// Reads the fixed app header and the dialect-specific section payload.
fn read_app(cur: &mut Cursor<'_>, version: FormatVersion) -> Result<AppRecord> {
    let size = cur.read_u32_le()?;
    let state = cur.read_u32_le()?;
    let last_update = cur.read_u32_le()?;
    let access_token = cur.read_u64_le()?;
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(cur.read_fixed(CHECKSUM_LEN)?);
    let change_number = cur.read_u32_le()?;

    let sections = match version {
        FormatVersion::DialectA => Sections::Single(parse_section_tree(cur, true, 0)?),
        FormatVersion::DialectB => Sections::Named(read_named_sections(cur)?),
    };

    Ok(AppRecord {
        size,
        state,
        last_update,
        access_token,
        checksum,
        change_number,
        sections,
    })
}

/// Dialect B: `[id: u8][reserved: u8][name\0][tree]` repeated, then `0x00`.
///
/// A buffer that ends before the closing `0x00` is truncated, not an empty list.
fn read_named_sections(cur: &mut Cursor<'_>) -> Result<NamedSections> {
    let mut sections = NamedSections::new();
    loop {
        let id = cur.read_u8()?;
        if id == SECTION_LIST_END {
            return Ok(sections);
        }

        // Reserved byte; the producer always writes 0x00.
        cur.read_u8()?;

        let name_offset = cur.position();
        let name = cur.read_cstring()?.to_vec();
        let tree = parse_section_tree(cur, true, 0)?;

        match sections.entry(name) {
            Entry::Occupied(e) => {
                return Err(CodecError::DuplicateKey {
                    key: KeyRef::Name(e.key().clone()),
                    offset: name_offset,
                })
            }
            Entry::Vacant(e) => {
                e.insert(NamedSection::new(id, tree));
            }
        }
    }
}

/// Parses tagged entries until `0x08`.
///
/// A root tree is followed by one extra `0x08` that belongs to the format,
/// not to the tree; it is consumed here so callers never see it.
fn parse_section_tree(cur: &mut Cursor<'_>, root: bool, depth: usize) -> Result<SectionTree> {
    let mut tree = SectionTree::new();

    loop {
        let tag_offset = cur.position();
        let tag = cur.read_u8()?;

        if tag == TAG_END {
            if root {
                let extra_offset = cur.position();
                if cur.read_u8()? != TAG_END {
                    return Err(CodecError::TruncatedInput {
                        offset: extra_offset,
                    });
                }
            }
            return Ok(tree);
        }

        if !matches!(tag, TAG_SECTION | TAG_STRING | TAG_INT32 | TAG_INT64) {
            return Err(CodecError::UnknownValueType {
                tag,
                offset: tag_offset,
            });
        }

        let key_offset = cur.position();
        let key = cur.read_cstring()?.to_vec();

        let value = match tag {
            TAG_SECTION => {
                if depth + 1 >= MAX_DEPTH {
                    return Err(CodecError::NestingTooDeep { offset: tag_offset });
                }
                Value::Section(parse_section_tree(cur, false, depth + 1)?)
            }
            TAG_STRING => Value::Bytes(cur.read_cstring()?.to_vec()),
            TAG_INT32 => Value::Int32(cur.read_u32_le()?),
            _ => Value::Int64(cur.read_u64_le()?),
        };

        if let Err(key) = tree.try_insert_new(key, value) {
            return Err(CodecError::DuplicateKey {
                key: KeyRef::Name(key),
                offset: key_offset,
            });
        }
    }
}
