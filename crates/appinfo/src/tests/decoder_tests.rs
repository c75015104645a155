use super::helpers::*;
use crate::*;

// -------------------- Header --------------------

#[test]
fn header_and_terminator_only_is_empty_document() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    end_document(&mut buf);

    let doc = decode(&buf).unwrap();
    assert_eq!(doc.version(), FormatVersion::DialectA);
    assert_eq!(doc.universe(), UNIVERSE);
    assert!(doc.is_empty());
}

#[test]
fn empty_dialect_b_document() {
    let mut buf = header(VERSION_DIALECT_B, UNIVERSE);
    end_document(&mut buf);

    let doc = decode(&buf).unwrap();
    assert_eq!(doc.version(), FormatVersion::DialectB);
    assert_eq!(doc.len(), 0);
}

#[test]
fn short_header_is_invalid() {
    for len in 0..HEADER_BYTES {
        let buf = header(VERSION_DIALECT_A, UNIVERSE);
        let err = decode(&buf[..len]).unwrap_err();
        assert!(
            matches!(err, CodecError::InvalidHeader { len: l } if l == len),
            "len {} gave {:?}",
            len,
            err
        );
    }
}

#[test]
fn unknown_version_is_rejected() {
    let mut buf = header(0x0756_4428, UNIVERSE);
    end_document(&mut buf);

    assert!(matches!(
        decode(&buf),
        Err(CodecError::UnsupportedVersion(0x0756_4428))
    ));
}

#[test]
fn unknown_universe_is_rejected() {
    let mut buf = header(VERSION_DIALECT_A, 0x0000_0002);
    end_document(&mut buf);

    assert!(matches!(
        decode(&buf),
        Err(CodecError::UnsupportedUniverse(2))
    ));
}

#[test]
fn missing_document_terminator_is_truncated() {
    let buf = header(VERSION_DIALECT_A, UNIVERSE);
    assert!(matches!(
        decode(&buf),
        Err(CodecError::TruncatedInput { offset: 8 })
    ));
}

#[test]
fn trailing_bytes_after_terminator_are_ignored() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    end_document(&mut buf);
    buf.extend_from_slice(b"junk");

    assert!(decode(&buf).unwrap().is_empty());
}

// -------------------- Dialect A --------------------

#[test]
fn decode_dialect_a_sample() {
    let doc = decode(&sample_dialect_a()).unwrap();

    assert_eq!(doc.version(), FormatVersion::DialectA);
    assert_eq!(doc.app_ids().collect::<Vec<_>>(), vec![10, 440]);

    let app = doc.get(10).unwrap();
    assert_eq!(app.size, 0x100 + 10);
    assert_eq!(app.state, 2);
    assert_eq!(app.last_update, 1_700_000_000);
    assert_eq!(app.access_token, 0xDEAD_BEEF_0000_0001);
    assert_eq!(app.checksum, [0xAB; CHECKSUM_LEN]);
    assert_eq!(app.change_number, 9_010);

    let root = match &app.sections {
        Sections::Single(tree) => tree,
        other => panic!("expected a single tree, got {:?}", other),
    };
    assert_eq!(root.keys().collect::<Vec<_>>(), vec![&b"name"[..], b"type", b"common"]);
    assert_eq!(root.get(b"name").unwrap().as_str(), Some("Counter-Strike"));
    assert_eq!(root.get(b"type").unwrap().as_u32(), Some(1));

    let common = root.get(b"common").unwrap().as_section().unwrap();
    assert_eq!(common.len(), 3);
    assert_eq!(common.get(b"gameid"), Some(&Value::Int64(10)));
    assert_eq!(
        root.get_path(&[b"common", b"languages", b"english"]),
        Some(&Value::Int32(1))
    );

    let tf2 = match &doc.get(440).unwrap().sections {
        Sections::Single(tree) => tree,
        _ => unreachable!(),
    };
    assert_eq!(tf2.get(b"empty"), Some(&Value::Bytes(Vec::new())));
}

#[test]
fn empty_root_tree_needs_two_end_tags() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    app_header(&mut buf, 7);
    buf.extend_from_slice(&[TAG_END, TAG_END]);
    end_document(&mut buf);

    let doc = decode(&buf).unwrap();
    assert_eq!(doc.get(7).unwrap().sections, Sections::Single(SectionTree::new()));
}

#[test]
fn root_tree_with_single_end_tag_is_truncated() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    app_header(&mut buf, 7);
    buf.push(TAG_END);

    assert!(matches!(
        decode(&buf),
        Err(CodecError::TruncatedInput { .. })
    ));
}

#[test]
fn root_tree_with_single_end_tag_before_terminator_is_truncated() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    app_header(&mut buf, 7);
    buf.push(TAG_END);
    end_document(&mut buf);

    assert!(matches!(
        decode(&buf),
        Err(CodecError::TruncatedInput { .. })
    ));
}

#[test]
fn nested_tree_takes_a_single_end_tag() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    app_header(&mut buf, 7);
    buf.push(TAG_SECTION);
    cstr(&mut buf, b"empty");
    buf.push(TAG_END);
    int32_entry(&mut buf, b"after", 3);
    buf.extend_from_slice(&[TAG_END, TAG_END]);
    end_document(&mut buf);

    let doc = decode(&buf).unwrap();
    let Sections::Single(root) = &doc.get(7).unwrap().sections else {
        panic!("expected dialect A sections");
    };
    assert_eq!(root.get(b"empty"), Some(&Value::Section(SectionTree::new())));
    assert_eq!(root.get(b"after"), Some(&Value::Int32(3)));
}

#[test]
fn unknown_tag_is_rejected_with_offset() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    app_header(&mut buf, 7);
    let tag_offset = buf.len();
    buf.push(0x03);
    cstr(&mut buf, b"float");
    buf.extend_from_slice(&[0, 0, 0, 0, TAG_END, TAG_END]);
    end_document(&mut buf);

    let err = decode(&buf).unwrap_err();
    match err {
        CodecError::UnknownValueType { tag, offset } => {
            assert_eq!(tag, 0x03);
            assert_eq!(offset, tag_offset);
        }
        other => panic!("expected UnknownValueType, got {:?}", other),
    }
}

#[test]
fn duplicate_tree_key_is_rejected() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    app_header(&mut buf, 7);
    string_entry(&mut buf, b"name", b"a");
    let dup_key_offset = buf.len() + 1;
    int32_entry(&mut buf, b"name", 2);
    buf.extend_from_slice(&[TAG_END, TAG_END]);
    end_document(&mut buf);

    match decode(&buf).unwrap_err() {
        CodecError::DuplicateKey { key, offset } => {
            assert_eq!(key, KeyRef::Name(b"name".to_vec()));
            assert_eq!(offset, dup_key_offset);
        }
        other => panic!("expected DuplicateKey, got {:?}", other),
    }
}

#[test]
fn duplicate_app_id_is_rejected() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    app_header(&mut buf, 42);
    buf.extend_from_slice(&[TAG_END, TAG_END]);
    let second_offset = buf.len();
    app_header(&mut buf, 42);
    buf.extend_from_slice(&[TAG_END, TAG_END]);
    end_document(&mut buf);

    match decode(&buf).unwrap_err() {
        CodecError::DuplicateKey { key, offset } => {
            assert_eq!(key, KeyRef::AppId(42));
            assert_eq!(offset, second_offset);
        }
        other => panic!("expected DuplicateKey, got {:?}", other),
    }
}

#[test]
fn truncated_app_header_is_rejected() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    app_header(&mut buf, 7);
    buf.truncate(buf.len() - 3);

    assert!(matches!(
        decode(&buf),
        Err(CodecError::TruncatedInput { .. })
    ));
}

#[test]
fn truncated_values_are_rejected() {
    let full = sample_dialect_a();
    // Every strict prefix past the header must fail as truncated.
    for len in HEADER_BYTES..full.len() - 4 {
        match decode(&full[..len]) {
            Err(CodecError::TruncatedInput { .. }) => {}
            other => panic!("prefix of {} bytes gave {:?}", len, other),
        }
    }
}

#[test]
fn deeply_nested_sections_are_rejected() {
    let mut buf = header(VERSION_DIALECT_A, UNIVERSE);
    app_header(&mut buf, 7);
    for _ in 0..MAX_DEPTH + 1 {
        buf.push(TAG_SECTION);
        cstr(&mut buf, b"n");
    }
    for _ in 0..MAX_DEPTH + 1 {
        buf.push(TAG_END);
    }
    buf.extend_from_slice(&[TAG_END, TAG_END]);
    end_document(&mut buf);

    assert!(matches!(
        decode(&buf),
        Err(CodecError::NestingTooDeep { .. })
    ));
}

// -------------------- Dialect B --------------------

#[test]
fn decode_dialect_b_sections_keep_ids_and_order() {
    let doc = decode(&sample_dialect_b()).unwrap();
    assert_eq!(doc.version(), FormatVersion::DialectB);

    let app = doc.get(220).unwrap();
    let sections = match &app.sections {
        Sections::Named(sections) => sections,
        other => panic!("expected named sections, got {:?}", other),
    };

    let names: Vec<&[u8]> = sections.keys().map(|k| k.as_slice()).collect();
    assert_eq!(names, vec![&b"common"[..], b"extended"]);

    let common = &sections[&b"common"[..]];
    assert_eq!(common.id, 0x02);
    assert_eq!(common.tree.get(b"name").unwrap().as_str(), Some("Half-Life 2"));

    let extended = &sections[&b"extended"[..]];
    assert_eq!(extended.id, 0x05);
    assert_eq!(
        extended.tree.get(b"size"),
        Some(&Value::Int64(0x0000_0004_0000_0000))
    );
}

#[test]
fn dialect_b_app_without_sections() {
    let mut buf = header(VERSION_DIALECT_B, UNIVERSE);
    app_header(&mut buf, 5);
    buf.push(SECTION_LIST_END);
    end_document(&mut buf);

    let doc = decode(&buf).unwrap();
    assert_eq!(doc.get(5).unwrap().sections, Sections::Named(NamedSections::new()));
}

#[test]
fn dialect_b_missing_section_list_end_is_truncated() {
    let mut buf = header(VERSION_DIALECT_B, UNIVERSE);
    app_header(&mut buf, 5);
    buf.extend_from_slice(&[0x02, 0x00]);
    cstr(&mut buf, b"common");
    buf.extend_from_slice(&[TAG_END, TAG_END]);

    assert!(matches!(
        decode(&buf),
        Err(CodecError::TruncatedInput { .. })
    ));
}

#[test]
fn dialect_b_duplicate_section_name_is_rejected() {
    let mut buf = header(VERSION_DIALECT_B, UNIVERSE);
    app_header(&mut buf, 5);
    buf.extend_from_slice(&[0x02, 0x00]);
    cstr(&mut buf, b"common");
    buf.extend_from_slice(&[TAG_END, TAG_END]);
    buf.extend_from_slice(&[0x03, 0x00]);
    cstr(&mut buf, b"common");
    buf.extend_from_slice(&[TAG_END, TAG_END]);
    buf.push(SECTION_LIST_END);
    end_document(&mut buf);

    match decode(&buf).unwrap_err() {
        CodecError::DuplicateKey { key, .. } => assert_eq!(key, KeyRef::Name(b"common".to_vec())),
        other => panic!("expected DuplicateKey, got {:?}", other),
    }
}

#[test]
fn dialect_a_bytes_under_dialect_b_header_fail() {
    // A dialect-A payload starts with a tag byte; read as dialect B the
    // tag is taken as a section id and the structure falls apart.
    let mut a = sample_dialect_a();
    a[..4].copy_from_slice(&VERSION_DIALECT_B.to_le_bytes());

    assert!(decode(&a).is_err());
}
