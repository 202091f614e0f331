use bitfield_codec::{bf_dyn, bf_dyn_n, bf_int, FieldSpec, RecordSchema};

#[test]
fn dispatches_by_prior_field() {
    let schema = RecordSchema::build(
        "Tagged",
        vec![
            ("kind".into(), FieldSpec::Descriptor(bf_int(8))),
            (
                "body".into(),
                FieldSpec::Descriptor(bf_dyn(|view| {
                    let kind = view.get("kind").and_then(|v| v.as_uint()).unwrap_or(0);
                    let width = if kind == 1 { 16 } else { 8 };
                    Ok(FieldSpec::Descriptor(bf_int(width)))
                })),
            ),
        ],
        vec![],
    )
    .unwrap();

    let wide = RecordSchema::from_bytes(&schema, &[0x01, 0x12, 0x34], None).unwrap();
    assert_eq!(wide.get("kind").unwrap().as_uint(), Some(1));
    assert_eq!(wide.get("body").unwrap().as_uint(), Some(0x1234));

    let narrow = RecordSchema::from_bytes(&schema, &[0x02, 0x12], None).unwrap();
    assert_eq!(narrow.get("kind").unwrap().as_uint(), Some(2));
    assert_eq!(narrow.get("body").unwrap().as_uint(), Some(0x12));
}

#[test]
fn dispatches_by_remaining_bits() {
    // Mirrors a settings record that picks a wider or narrower extension
    // body depending on how many bits are left in the buffer, the way a
    // reply body chooses between a base and an extended settings shape.
    let schema = RecordSchema::build(
        "SettingsReply",
        vec![
            ("base".into(), FieldSpec::Descriptor(bf_int(8))),
            (
                "ext".into(),
                FieldSpec::Descriptor(bf_dyn_n(|_view, remaining| {
                    let width = if remaining == 16 { 16 } else { 8 };
                    Ok(FieldSpec::Descriptor(bf_int(width as u32)))
                })),
            ),
        ],
        vec![],
    )
    .unwrap();

    let with_ext = RecordSchema::from_bytes(&schema, &[0xAA, 0x12, 0x34], None).unwrap();
    assert_eq!(with_ext.get("ext").unwrap().as_uint(), Some(0x1234));

    let without_ext = RecordSchema::from_bytes(&schema, &[0xAA, 0x12], None).unwrap();
    assert_eq!(without_ext.get("ext").unwrap().as_uint(), Some(0x12));
}

#[test]
fn dyn_self_n_encode_dispatches_on_value_shape() {
    use bitfield_codec::FieldDescriptor;

    // The resolver picks between a one-byte payload and the absent marker
    // based on what's left to read; on encode, DynSelfN cannot ask "what's
    // left to write" (there's nothing yet), so it infers the shape from the
    // value itself instead: bytes round-trip, the unit marker round-trips,
    // a bare integer does not (it isn't one of the shapes encode-side
    // dispatch recognizes).
    let schema = RecordSchema::build(
        "MaybeBytes",
        vec![(
            "payload".into(),
            FieldSpec::Descriptor(bf_dyn_n(|_view, remaining| {
                if remaining == 0 {
                    Ok(FieldSpec::Unit)
                } else {
                    Ok(FieldSpec::Descriptor(FieldDescriptor::bytes(1)))
                }
            })),
        )],
        vec![],
    )
    .unwrap();

    let present = RecordSchema::from_bytes(&schema, &[0x42], None).unwrap();
    assert_eq!(present.get("payload").unwrap().as_bytes(), Some(&[0x42][..]));
    assert_eq!(present.to_bytes(None).unwrap(), vec![0x42]);

    let absent = RecordSchema::from_bytes(&schema, &[], None).unwrap();
    assert!(absent.get("payload").unwrap().is_none());
    assert_eq!(absent.to_bytes(None).unwrap(), Vec::<u8>::new());
}
