use super::*;
use uuid::Uuid;

#[test]
fn test_id_newtype_roundtrip() {
    let raw = Uuid::new_v4();
    let id = PropertyId::new(raw);
    assert_eq!(id.value(), raw);

    let back: Uuid = id.into();
    assert_eq!(back, raw);
}

#[test]
fn test_id_display_matches_uuid() {
    let raw = Uuid::new_v4();
    let id = SlotId::new(raw);
    assert_eq!(id.to_string(), raw.to_string());
}

#[test]
fn test_generate_is_unique() {
    let a = SessionId::generate();
    let b = SessionId::generate();
    assert_ne!(a, b);
}

#[test]
fn test_id_serde_is_plain_uuid_string() {
    let raw = Uuid::new_v4();
    let id = VisitId::new(raw);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", raw));

    let parsed: VisitId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn test_distinct_id_types_compare_by_value() {
    let raw = Uuid::new_v4();
    assert_eq!(AgentId::new(raw).value(), ClientId::new(raw).value());
}

#[test]
fn test_agent_context_holds_identity() {
    let agent = AgentId::generate();
    let ctx = AgentContext::new(agent);
    assert_eq!(ctx.agent_id, agent);
}
