use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{CodecError, Result};
use crate::format::{
    FormatVersion, APP_LIST_END, MAX_DEPTH, SECTION_LIST_END, TAG_END,
};
use crate::model::{AppRecord, Document, NamedSections, SectionTree, Sections, Value};

/// Encodes `doc` into a fresh buffer.
///
/// For a document produced by [`decode`](crate::decode) and left unchanged,
/// the output is byte-identical to the decoded input (up to the terminating
/// zero app id).
///
/// # Errors
///
/// [`CodecError::InvalidValue`] if the document holds content the format
/// cannot represent: an embedded NUL in a key, section name or string value,
/// a dialect-B section id of `0`, or sections whose shape does not match the
/// document's dialect.
pub fn encode(doc: &Document) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(4096);
    encode_into(doc, &mut out)?;
    Ok(out)
}

/// Appends the encoding of `doc` to `out`.
///
/// On error `out` may hold a partial encoding and should be discarded.
pub fn encode_into(doc: &Document, out: &mut Vec<u8>) -> Result<()> {
    out.write_u32::<LittleEndian>(doc.version().magic())?;
    out.write_u32::<LittleEndian>(doc.universe())?;

    for (app_id, app) in doc.iter() {
        if app_id == APP_LIST_END {
            return Err(CodecError::InvalidValue(
                "app id 0 is reserved for the document terminator".to_string(),
            ));
        }
        out.write_u32::<LittleEndian>(app_id)?;
        write_app(out, app_id, app, doc.version())?;
    }

    out.write_u32::<LittleEndian>(APP_LIST_END)?;
    Ok(())
}

fn write_app(out: &mut Vec<u8>, app_id: u32, app: &AppRecord, version: FormatVersion) -> Result<()> {
    out.write_u32::<LittleEndian>(app.size)?;
    out.write_u32::<LittleEndian>(app.state)?;
    out.write_u32::<LittleEndian>(app.last_update)?;
    out.write_u64::<LittleEndian>(app.access_token)?;
    out.extend_from_slice(&app.checksum);
    out.write_u32::<LittleEndian>(app.change_number)?;

    match (&app.sections, version) {
        (Sections::Single(tree), FormatVersion::DialectA) => encode_section_tree(out, tree, true, 0),
        (Sections::Named(sections), FormatVersion::DialectB) => write_named_sections(out, sections),
        _ => Err(CodecError::InvalidValue(format!(
            "app {} sections do not match {:?}",
            app_id, version
        ))),
    }
}

fn write_named_sections(out: &mut Vec<u8>, sections: &NamedSections) -> Result<()> {
    for (name, section) in sections {
        if section.id == SECTION_LIST_END {
            return Err(CodecError::InvalidValue(format!(
                "section {:?} has id 0, which terminates the section list",
                String::from_utf8_lossy(name)
            )));
        }
        out.write_u8(section.id)?;
        out.write_u8(0)?;
        write_cstring(out, name)?;
        encode_section_tree(out, &section.tree, true, 0)?;
    }
    out.write_u8(SECTION_LIST_END)?;
    Ok(())
}

/// Writes `[tag][key\0][payload]` per entry, then `0x08` (twice for a root).
fn encode_section_tree(out: &mut Vec<u8>, tree: &SectionTree, root: bool, depth: usize) -> Result<()> {
    for (key, value) in tree.iter() {
        out.write_u8(value.tag())?;
        write_cstring(out, key)?;
        match value {
            Value::Section(child) => {
                if depth + 1 >= MAX_DEPTH {
                    return Err(CodecError::InvalidValue(format!(
                        "sections nested deeper than {}",
                        MAX_DEPTH
                    )));
                }
                encode_section_tree(out, child, false, depth + 1)?;
            }
            Value::Bytes(bytes) => write_cstring(out, bytes)?,
            Value::Int32(n) => out.write_u32::<LittleEndian>(*n)?,
            Value::Int64(n) => out.write_u64::<LittleEndian>(*n)?,
        }
    }

    out.write_u8(TAG_END)?;
    if root {
        out.write_u8(TAG_END)?;
    }
    Ok(())
}

fn write_cstring(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    if bytes.contains(&0) {
        return Err(CodecError::InvalidValue(format!(
            "embedded NUL in {:?}",
            String::from_utf8_lossy(bytes)
        )));
    }
    out.extend_from_slice(bytes);
    out.write_u8(0)?;
    Ok(())
}
