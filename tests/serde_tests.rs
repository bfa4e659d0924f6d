use bitfield::{Bitfield, Growth, Options};

#[test]
fn serialize_packed_bytes() {
    let mut bf = Bitfield::new(16);
    bf.set_all(&[true, false, true, true, false, false, true, false], 0);

    let json = serde_json::to_string(&bf).expect("cannot fail to serialize");
    assert_eq!(json, "[178,0]");
}

#[test]
fn deserialize_packed_bytes() {
    let bf: Bitfield = serde_json::from_str("[178,0]").expect("cannot fail to deserialize");
    assert_eq!(bf.as_bytes(), &[178, 0]);
    assert_eq!(bf.len(), 16);
    assert!(bf.get(0));
    assert!(!bf.get(1));
    assert_eq!(bf.growth(), Growth::Disabled);
}

#[test]
fn deserialize_rejects_out_of_range_bytes() {
    assert!(serde_json::from_str::<Bitfield>("[256]").is_err());
    assert!(serde_json::from_str::<Bitfield>("{}").is_err());
}

#[test]
fn serde_roundtrip_drops_growth() {
    let mut bf = Bitfield::with_options(0, Growth::Unbounded);
    bf.set(20, true);

    let json = serde_json::to_string(&bf).unwrap();
    let back: Bitfield = serde_json::from_str(&json).unwrap();
    assert_eq!(back.as_bytes(), bf.as_bytes());
    assert_eq!(back.growth(), Growth::Disabled);
}

#[test]
fn deserialize_options() {
    let options: Options = serde_json::from_str(r#"{"grow":{"bounded":50}}"#).unwrap();
    assert_eq!(options.grow, Growth::Bounded(50));

    let options: Options = serde_json::from_str(r#"{"grow":"unbounded"}"#).unwrap();
    assert_eq!(options.grow, Growth::Unbounded);

    let options: Options = serde_json::from_str("{}").unwrap();
    assert_eq!(options.grow, Growth::Disabled);
}

#[test]
fn serialize_options() {
    let json = serde_json::to_string(&Options::new().grow(Growth::Bounded(8))).unwrap();
    assert_eq!(json, r#"{"grow":{"bounded":8}}"#);
}
