use bitfield_codec::{bf_bytes, bf_int, bf_list, FieldSpec, RecordSchema, Value};

#[test]
fn list_of_bytes_roundtrips() {
    let schema = RecordSchema::build(
        "ThreeBytes",
        vec![("xs".into(), FieldSpec::Descriptor(bf_list(bf_int(8), 3)))],
        vec![],
    )
    .unwrap();

    let record = RecordSchema::from_bytes(&schema, &[0x01, 0x02, 0x03], None).unwrap();
    let xs = record.get("xs").unwrap().as_list().unwrap();
    let values: Vec<u128> = xs.iter().map(|v| v.as_uint().unwrap()).collect();
    assert_eq!(values, vec![1, 2, 3]);
    assert_eq!(record.to_bytes(None).unwrap(), vec![0x01, 0x02, 0x03]);
}

#[test]
fn fixed_byte_block_roundtrips() {
    let schema = RecordSchema::build(
        "Blob",
        vec![("payload".into(), FieldSpec::Descriptor(bf_bytes(4)))],
        vec![],
    )
    .unwrap();

    let bytes = [0xDE, 0xAD, 0xBE, 0xEF];
    let record = RecordSchema::from_bytes(&schema, &bytes, None).unwrap();
    assert_eq!(record.get("payload").unwrap().as_bytes(), Some(&bytes[..]));
    assert_eq!(record.to_bytes(None).unwrap(), bytes);
}

#[test]
fn wrong_list_length_is_rejected_on_encode() {
    let schema = RecordSchema::build(
        "TwoBytes",
        vec![("xs".into(), FieldSpec::Descriptor(bf_list(bf_int(8), 2)))],
        vec![],
    )
    .unwrap();
    let record = RecordSchema::from_bytes(&schema, &[1, 2], None).unwrap();
    assert!(record.to_bytes(None).is_ok());

    let mut fields = indexmap::IndexMap::new();
    fields.insert(
        "xs".to_string(),
        Value::List(vec![Value::UInt(1), Value::UInt(2), Value::UInt(3)]),
    );
    let bogus = bitfield_codec::Record::new(schema.clone(), fields).unwrap();
    assert!(bogus.to_bytes(None).is_err());
}
