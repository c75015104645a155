use byteorder::{LittleEndian, WriteBytesExt};

use crate::*;

// -------------------- Raw byte builders --------------------

pub fn header(magic: u32, universe: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<LittleEndian>(magic).unwrap();
    buf.write_u32::<LittleEndian>(universe).unwrap();
    buf
}

/// Writes `app_id` followed by a 44-byte app header with recognisable values.
pub fn app_header(buf: &mut Vec<u8>, app_id: u32) {
    buf.write_u32::<LittleEndian>(app_id).unwrap();
    buf.write_u32::<LittleEndian>(0x100 + app_id).unwrap(); // size
    buf.write_u32::<LittleEndian>(2).unwrap(); // state
    buf.write_u32::<LittleEndian>(1_700_000_000).unwrap(); // last_update
    buf.write_u64::<LittleEndian>(0xDEAD_BEEF_0000_0001).unwrap(); // access_token
    buf.extend_from_slice(&[0xAB; CHECKSUM_LEN]);
    buf.write_u32::<LittleEndian>(9_000 + app_id).unwrap(); // change_number
}

pub fn cstr(buf: &mut Vec<u8>, s: &[u8]) {
    buf.extend_from_slice(s);
    buf.push(0);
}

pub fn string_entry(buf: &mut Vec<u8>, key: &[u8], value: &[u8]) {
    buf.push(TAG_STRING);
    cstr(buf, key);
    cstr(buf, value);
}

pub fn int32_entry(buf: &mut Vec<u8>, key: &[u8], value: u32) {
    buf.push(TAG_INT32);
    cstr(buf, key);
    buf.write_u32::<LittleEndian>(value).unwrap();
}

pub fn int64_entry(buf: &mut Vec<u8>, key: &[u8], value: u64) {
    buf.push(TAG_INT64);
    cstr(buf, key);
    buf.write_u64::<LittleEndian>(value).unwrap();
}

pub fn end_document(buf: &mut Vec<u8>) {
    buf.write_u32::<LittleEndian>(APP_LIST_END).unwrap();
}

/// A dialect-A file with two apps, nested sections and all value types.
pub fn sample_dialect_a() -> Vec<u8> {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);

    app_header(&mut buf, 10);
    string_entry(&mut buf, b"name", b"Counter-Strike");
    int32_entry(&mut buf, b"type", 1);
    buf.push(TAG_SECTION);
    cstr(&mut buf, b"common");
    string_entry(&mut buf, b"clienticon", b"6b0312cda02f5f777efa2f3318c307ff9acafbb5");
    int64_entry(&mut buf, b"gameid", 10);
    buf.push(TAG_SECTION);
    cstr(&mut buf, b"languages");
    int32_entry(&mut buf, b"english", 1);
    buf.push(TAG_END);
    buf.push(TAG_END);
    buf.extend_from_slice(&[TAG_END, TAG_END]);

    app_header(&mut buf, 440);
    string_entry(&mut buf, b"name", b"Team Fortress 2");
    string_entry(&mut buf, b"empty", b"");
    buf.extend_from_slice(&[TAG_END, TAG_END]);

    end_document(&mut buf);
    buf
}

/// A dialect-B file with one app holding sections `common` (id 2) and
/// `extended` (id 5).
pub fn sample_dialect_b() -> Vec<u8> {
    let mut buf = header(VERSION_DIALECT_B, UNIVERSE);

    app_header(&mut buf, 220);
    buf.extend_from_slice(&[0x02, 0x00]);
    cstr(&mut buf, b"common");
    string_entry(&mut buf, b"name", b"Half-Life 2");
    buf.extend_from_slice(&[TAG_END, TAG_END]);

    buf.extend_from_slice(&[0x05, 0x00]);
    cstr(&mut buf, b"extended");
    int64_entry(&mut buf, b"size", 0x0000_0004_0000_0000);
    buf.extend_from_slice(&[TAG_END, TAG_END]);

    buf.push(SECTION_LIST_END);
    end_document(&mut buf);
    buf
}

// -------------------- Model builders --------------------

pub fn tree(entries: Vec<(&str, Value)>) -> SectionTree {
    entries.into_iter().collect()
}
