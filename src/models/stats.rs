use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Deserialization goes through [`CombatantStats::try_from`] so that counters
/// of an unexpected type stay in `extra` instead of failing the whole record.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Map<String, Value>")]
pub struct CombatantStats {
    // --- Required fields ---
    pub name: String,
    pub dead: bool,
    pub damage_dealt: f64,
    pub attack_count: u64,

    // --- Optional raw counters from the tracker export ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_pray_success_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offensive_pray_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deserved_damage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic_hit_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic_hit_count_deserved: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic_attack_count: Option<u64>,

    // --- Derived statistics, filled by the parser ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>, // percent of attacks that hit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_pray_rate: Option<f64>, // percent of attacks off the opponent's prayer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_hit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_delta: Option<f64>, // damage dealt minus damage received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deserved_delta: Option<f64>, // actual minus deserved damage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic_luck: Option<f64>, // percent of deserved magic hits that landed

    /// Every other key of the combatant object, copied through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CombatantStats {
    /// Moves the optional counters out of `fields`. A counter whose value does
    /// not fit its type is left in `fields`.
    pub fn take_counters(&mut self, fields: &mut Map<String, Value>) {
        self.hit_count = take_if(fields, "hitCount", as_count);
        self.off_pray_success_count = take_if(fields, "offPraySuccessCount", as_count);
        self.offensive_pray_count = take_if(fields, "offensivePrayCount", as_count);
        self.deserved_damage = take_if(fields, "deservedDamage", as_amount);
        self.magic_hit_count = take_if(fields, "magicHitCount", as_count);
        self.magic_hit_count_deserved = take_if(fields, "magicHitCountDeserved", as_amount);
        self.magic_attack_count = take_if(fields, "magicAttackCount", as_count);
    }

    fn take_derived(&mut self, fields: &mut Map<String, Value>) {
        self.accuracy = take_if(fields, "accuracy", Value::as_f64);
        self.off_pray_rate = take_if(fields, "offPrayRate", Value::as_f64);
        self.average_hit = take_if(fields, "averageHit", Value::as_f64);
        self.damage_delta = take_if(fields, "damageDelta", Value::as_f64);
        self.deserved_delta = take_if(fields, "deservedDelta", Value::as_f64);
        self.magic_luck = take_if(fields, "magicLuck", Value::as_f64);
    }

    /// Fills the derived statistics from the raw counters. `other` is the
    /// opposing side of the same encounter.
    pub fn compute_derived(&mut self, other: &CombatantStats) {
        self.accuracy = self.hit_count.and_then(|hits| percent(hits as f64, self.attack_count as f64));
        self.off_pray_rate = self
            .off_pray_success_count
            .and_then(|success| percent(success as f64, self.attack_count as f64));
        self.average_hit = ratio(self.damage_dealt, self.attack_count as f64);
        self.damage_delta = Some(self.damage_dealt - other.damage_dealt);
        self.deserved_delta = self.deserved_damage.map(|deserved| self.damage_dealt - deserved);
        self.magic_luck = match (self.magic_hit_count, self.magic_hit_count_deserved) {
            (Some(hits), Some(deserved)) => percent(hits as f64, deserved),
            _ => None,
        };
    }
}

// Saved records are read back as they were written. Only the four required
// fields can make a record unreadable.
impl TryFrom<Map<String, Value>> for CombatantStats {
    type Error = String;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let name = match fields.shift_remove("name") {
            Some(Value::String(name)) => name,
            _ => return Err("missing or invalid `name`".to_string()),
        };
        let dead = match fields.shift_remove("dead") {
            Some(Value::Bool(dead)) => dead,
            _ => return Err("missing or invalid `dead`".to_string()),
        };
        let damage_dealt = fields
            .shift_remove("damageDealt")
            .as_ref()
            .and_then(Value::as_f64)
            .ok_or("missing or invalid `damageDealt`")?;
        let attack_count = fields
            .shift_remove("attackCount")
            .as_ref()
            .and_then(as_count)
            .ok_or("missing or invalid `attackCount`")?;

        let mut stats = CombatantStats {
            name,
            dead,
            damage_dealt,
            attack_count,
            ..Default::default()
        };
        stats.take_counters(&mut fields);
        stats.take_derived(&mut fields);
        stats.extra = fields;
        Ok(stats)
    }
}

/// Removes `key` from `fields` only when `convert` accepts its value.
fn take_if<T>(
    fields: &mut Map<String, Value>,
    key: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = fields.get(key).and_then(convert)?;
    fields.shift_remove(key);
    Some(value)
}

/// A non-negative integer. Integral floats such as `5.0` count.
pub fn as_count(value: &Value) -> Option<u64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

/// A finite, non-negative number.
pub fn as_amount(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

fn percent(numerator: f64, denominator: f64) -> Option<f64> {
    ratio(numerator, denominator).map(|r| r * 100.0)
}
