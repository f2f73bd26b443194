use serde_json::{Map, Value};
use thiserror::Error;
use crate::models::stats::{as_amount, as_count};
use crate::models::{CombatantStats, FightRecord};
use crate::parsing::regex::sanitize_name;

pub const COMPETITOR: &str = "competitor";
pub const OPPONENT: &str = "opponent";

// Recomputed on every parse, so submitted values are discarded.
const DERIVED_KEYS: [&str; 6] = [
    "accuracy",
    "offPrayRate",
    "averageHit",
    "damageDelta",
    "deservedDelta",
    "magicLuck",
];

const NON_NEGATIVE_INTEGER: &str = "a non-negative integer";
const NON_NEGATIVE_NUMBER: &str = "a non-negative number";

/// Why a submission was refused. The `Display` text is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No fight data provided")]
    Empty,

    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),

    #[error("Fight data must be a JSON object")]
    NotAnObject,

    #[error("Missing {side} data")]
    MissingSide { side: &'static str },

    #[error("Invalid {side} data: expected an object")]
    SideNotObject { side: &'static str },

    #[error("Missing {side}.{field}")]
    MissingField { side: &'static str, field: &'static str },

    #[error("Invalid {side}.{field}: expected {expected}")]
    InvalidField {
        side: &'static str,
        field: &'static str,
        expected: &'static str,
    },
}

pub fn parse_fight_data(raw: &str) -> Result<FightRecord, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Empty);
    }

    let root: Value =
        serde_json::from_str(raw).map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
    let Value::Object(mut root) = root else {
        return Err(ValidationError::NotAnObject);
    };

    let competitor = root
        .shift_remove(COMPETITOR)
        .ok_or(ValidationError::MissingSide { side: COMPETITOR })?;
    let opponent = root
        .shift_remove(OPPONENT)
        .ok_or(ValidationError::MissingSide { side: OPPONENT })?;

    let mut competitor = parse_combatant(COMPETITOR, competitor)?;
    let mut opponent = parse_combatant(OPPONENT, opponent)?;
    competitor.compute_derived(&opponent);
    opponent.compute_derived(&competitor);

    Ok(FightRecord {
        competitor,
        opponent,
        extra: root,
    })
}

fn parse_combatant(side: &'static str, value: Value) -> Result<CombatantStats, ValidationError> {
    let Value::Object(mut fields) = value else {
        return Err(ValidationError::SideNotObject { side });
    };

    let name = match fields.shift_remove("name") {
        Some(Value::String(name)) => sanitize_name(&name),
        Some(_) => return Err(invalid(side, "name", "a string")),
        None => return Err(ValidationError::MissingField { side, field: "name" }),
    };
    if name.is_empty() {
        return Err(invalid(side, "name", "a non-empty string"));
    }

    let dead = match fields.shift_remove("dead") {
        Some(Value::Bool(dead)) => dead,
        Some(_) => return Err(invalid(side, "dead", "a boolean")),
        None => return Err(ValidationError::MissingField { side, field: "dead" }),
    };

    let damage_dealt = take_required(&mut fields, side, "damageDealt", NON_NEGATIVE_NUMBER, as_amount)?;
    let attack_count = take_required(&mut fields, side, "attackCount", NON_NEGATIVE_INTEGER, as_count)?;

    let mut stats = CombatantStats {
        name,
        dead,
        damage_dealt,
        attack_count,
        ..Default::default()
    };
    stats.take_counters(&mut fields);

    for key in DERIVED_KEYS {
        fields.shift_remove(key);
    }
    stats.extra = fields;
    Ok(stats)
}

fn invalid(side: &'static str, field: &'static str, expected: &'static str) -> ValidationError {
    ValidationError::InvalidField { side, field, expected }
}

/// Removes a required numeric field. `null` counts as missing.
fn take_required<T>(
    fields: &mut Map<String, Value>,
    side: &'static str,
    field: &'static str,
    expected: &'static str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Result<T, ValidationError> {
    match fields.shift_remove(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { side, field }),
        Some(value) => convert(&value).ok_or_else(|| invalid(side, field, expected)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(competitor: Value, opponent: Value) -> String {
        json!({ "competitor": competitor, "opponent": opponent }).to_string()
    }

    fn side(name: &str, dead: bool, damage: f64, attacks: u64) -> Value {
        json!({ "name": name, "dead": dead, "damageDealt": damage, "attackCount": attacks })
    }

    #[test]
    fn parses_minimal_fight() {
        let raw = r#"{"competitor":{"name":"A","dead":false,"damageDealt":100,"attackCount":5},"opponent":{"name":"B","dead":true,"damageDealt":50,"attackCount":3}}"#;
        let fight = parse_fight_data(raw).unwrap();

        assert_eq!(fight.competitor.name, "A");
        assert!(!fight.competitor.dead);
        assert_eq!(fight.competitor.damage_dealt, 100.0);
        assert_eq!(fight.competitor.attack_count, 5);
        assert_eq!(fight.opponent.name, "B");
        assert!(fight.opponent.dead);
        assert_eq!(fight.competitor.damage_delta, Some(50.0));
        assert_eq!(fight.opponent.damage_delta, Some(-50.0));
        assert_eq!(fight.competitor.average_hit, Some(20.0));
        assert!(fight.extra.is_empty());
    }

    #[test]
    fn zero_attacks_and_damage_are_valid() {
        let raw = submission(side("A", false, 0.0, 0), side("B", false, 0.0, 0));
        let fight = parse_fight_data(&raw).unwrap();
        assert_eq!(fight.competitor.attack_count, 0);
        assert_eq!(fight.competitor.average_hit, None);
        assert_eq!(fight.winner(), None);
    }

    #[test]
    fn optional_counters_feed_derived_stats() {
        let mut competitor = side("A", false, 120.0, 10);
        competitor["offPraySuccessCount"] = json!(7);
        competitor["deservedDamage"] = json!(100.5);
        competitor["magicHitCount"] = json!(3);
        competitor["magicHitCountDeserved"] = json!(2.0);
        competitor["hitCount"] = json!(null);
        let raw = submission(competitor, side("B", true, 90.0, 9));

        let fight = parse_fight_data(&raw).unwrap();
        let a = &fight.competitor;
        assert_eq!(a.off_pray_success_count, Some(7));
        assert_eq!(a.off_pray_rate, Some(70.0));
        assert_eq!(a.deserved_delta, Some(19.5));
        assert_eq!(a.magic_luck, Some(150.0));
        assert_eq!(a.hit_count, None);
        assert_eq!(a.accuracy, None);
    }

    #[test]
    fn oddly_typed_counters_are_carried_through() {
        let mut competitor = side("A", false, 10.0, 2);
        competitor["hitCount"] = json!("n/a");
        competitor["magicHitCountDeserved"] = json!(-1);
        competitor["offPraySuccessCount"] = json!(1);
        let raw = submission(competitor, side("B", true, 5.0, 2));

        let fight = parse_fight_data(&raw).unwrap();
        let a = &fight.competitor;
        assert_eq!(a.hit_count, None);
        assert_eq!(a.accuracy, None);
        assert_eq!(a.off_pray_rate, Some(50.0));
        assert_eq!(a.extra.get("hitCount"), Some(&json!("n/a")));
        assert_eq!(a.extra.get("magicHitCountDeserved"), Some(&json!(-1)));
    }

    #[test]
    fn unknown_fields_are_carried_through() {
        let mut competitor = side("A", false, 1.0, 1);
        competitor["world"] = json!(330);
        competitor["offPrayRate"] = json!("99%");
        let raw = json!({
            "competitor": competitor,
            "opponent": side("B", false, 1.0, 1),
            "lastFightTime": 1719835200000u64,
        })
        .to_string();

        let fight = parse_fight_data(&raw).unwrap();
        assert_eq!(fight.competitor.extra.get("world"), Some(&json!(330)));
        assert!(!fight.competitor.extra.contains_key("offPrayRate"));
        assert_eq!(fight.extra.get("lastFightTime"), Some(&json!(1719835200000u64)));
    }

    #[test]
    fn names_are_sanitized() {
        let raw = submission(side("<img=2>Zezima", false, 1.0, 1), side("B", true, 1.0, 1));
        let fight = parse_fight_data(&raw).unwrap();
        assert_eq!(fight.competitor.name, "Zezima");
        assert_eq!(fight.winner(), Some("Zezima"));
    }

    #[test]
    fn rejects_empty_and_malformed_input() {
        assert_eq!(parse_fight_data("   "), Err(ValidationError::Empty));
        assert!(matches!(
            parse_fight_data("{not json"),
            Err(ValidationError::InvalidJson(_))
        ));
        assert_eq!(parse_fight_data("[1, 2]"), Err(ValidationError::NotAnObject));
    }

    #[test]
    fn rejects_missing_sides() {
        let raw = json!({ "competitor": side("A", false, 1.0, 1) }).to_string();
        assert_eq!(
            parse_fight_data(&raw),
            Err(ValidationError::MissingSide { side: OPPONENT })
        );

        let raw = json!({ "competitor": "A", "opponent": side("B", false, 1.0, 1) }).to_string();
        assert_eq!(
            parse_fight_data(&raw),
            Err(ValidationError::SideNotObject { side: COMPETITOR })
        );
    }

    #[test]
    fn rejects_wrongly_shaped_fields() {
        let raw = submission(json!({ "dead": false, "damageDealt": 1, "attackCount": 1 }), side("B", false, 1.0, 1));
        assert_eq!(
            parse_fight_data(&raw),
            Err(ValidationError::MissingField { side: COMPETITOR, field: "name" })
        );

        let raw = submission(side("A", false, 1.0, 1), json!({ "name": "B", "dead": "no", "damageDealt": 1, "attackCount": 1 }));
        assert_eq!(
            parse_fight_data(&raw),
            Err(invalid(OPPONENT, "dead", "a boolean"))
        );

        let raw = submission(json!({ "name": "A", "dead": false, "damageDealt": -5, "attackCount": 1 }), side("B", false, 1.0, 1));
        assert_eq!(
            parse_fight_data(&raw),
            Err(invalid(COMPETITOR, "damageDealt", NON_NEGATIVE_NUMBER))
        );

        let raw = submission(json!({ "name": "A", "dead": false, "damageDealt": 5, "attackCount": 1.5 }), side("B", false, 1.0, 1));
        assert_eq!(
            parse_fight_data(&raw),
            Err(invalid(COMPETITOR, "attackCount", NON_NEGATIVE_INTEGER))
        );

        let raw = submission(side("<col=ff0000></col>", false, 1.0, 1), side("B", false, 1.0, 1));
        assert_eq!(
            parse_fight_data(&raw),
            Err(invalid(COMPETITOR, "name", "a non-empty string"))
        );
    }

    #[test]
    fn error_messages_are_readable() {
        let err = invalid(OPPONENT, "attackCount", NON_NEGATIVE_INTEGER);
        assert_eq!(
            err.to_string(),
            "Invalid opponent.attackCount: expected a non-negative integer"
        );
        assert_eq!(
            ValidationError::MissingSide { side: COMPETITOR }.to_string(),
            "Missing competitor data"
        );
    }
}
