use std::collections::HashSet;

use wirebson::ObjectId;

#[test]
fn hex_parsing_inverts_formatting() {
    let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
    assert_eq!(oid.to_hex(), "507f1f77bcf86cd799439011");
    assert_eq!(oid.to_string(), "507f1f77bcf86cd799439011");
    assert_eq!("507f1f77bcf86cd799439011".parse::<ObjectId>().unwrap(), oid);
}

#[test]
fn hex_parsing_rejects_bad_input() {
    assert!(ObjectId::parse_str("").is_err());
    assert!(ObjectId::parse_str("507f1f77bcf86cd79943901").is_err());
    assert!(ObjectId::parse_str("507f1f77bcf86cd7994390111").is_err());
    assert!(ObjectId::parse_str("507f1f77bcf86cd79943901g").is_err());
}

#[test]
fn generated_ids_embed_the_current_time() {
    let before = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as u32;
    let oid = ObjectId::new();
    let after = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as u32;
    assert!(oid.timestamp() >= before && oid.timestamp() <= after);
}

#[test]
fn generated_ids_are_distinct() {
    let ids: HashSet<ObjectId> = (0..1000).map(|_| ObjectId::new()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn consecutive_ids_share_machine_and_thread_bytes() {
    let a = ObjectId::new().bytes();
    let b = ObjectId::new().bytes();
    assert_eq!(a[4..9], b[4..9]);
}

#[test]
fn timestamp_only_ids_zero_the_tail() {
    let boundary = ObjectId::from_time(0x1122_3344, true);
    assert_eq!(
        boundary.bytes(),
        [0x11, 0x22, 0x33, 0x44, 0, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(boundary.timestamp(), 0x1122_3344);

    let full = ObjectId::from_time(0x1122_3344, false);
    assert_eq!(full.timestamp(), 0x1122_3344);
    assert_ne!(full.bytes()[4..], [0u8; 8]);
}

#[test]
fn ids_order_by_their_bytes() {
    let early = ObjectId::from_time(100, true);
    let late = ObjectId::from_time(200, true);
    assert!(early < late);
}
