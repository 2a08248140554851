//! Data models for moisture readings.

use chrono::{DateTime, Utc};
use serde::{ser::SerializeStruct, Serialize, Serializer};
use serde_json::Value;

// ---

/// A stored moisture reading.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reading {
    // ---
    pub id: i64,
    pub plant_name: String,
    pub location: String,
    pub moisture_value: i64,
    pub timestamp: DateTime<Utc>,
}

/// A validated reading that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReading {
    // ---
    pub plant_name: String,
    pub location: String,
    pub moisture_value: i64,
}

/// Reason a submitted payload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// Nothing usable was sent (absent, unparseable or falsy JSON).
    Empty,
    /// A required field is missing, falsy or of the wrong type.
    Invalid,
}

impl NewReading {
    /// Validate a JSON payload sent by a device.
    ///
    /// All three fields must be present and truthy. `moisture_value` is
    /// coerced to an integer (floats truncate, numeric strings parse).
    pub fn from_payload(payload: &Value) -> Result<Self, PayloadError> {
        // ---
        if !is_truthy(payload) {
            return Err(PayloadError::Empty);
        }
        let Value::Object(fields) = payload else {
            return Err(PayloadError::Invalid);
        };

        let field = |name: &str| fields.get(name).filter(|v| is_truthy(v));

        let (Some(plant_name), Some(location), Some(moisture_value)) = (
            field("plant_name"),
            field("location"),
            field("moisture_value"),
        ) else {
            return Err(PayloadError::Invalid);
        };

        Ok(NewReading {
            plant_name: as_text(plant_name).ok_or(PayloadError::Invalid)?,
            location: as_text(location).ok_or(PayloadError::Invalid)?,
            moisture_value: as_integer(moisture_value).ok_or(PayloadError::Invalid)?,
        })
    }
}

/// JSON truthiness as device firmware expects it: null, false, zero and
/// empty containers are all "not sent".
fn is_truthy(value: &Value) -> bool {
    // ---
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    // ---
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?.trunc();
            (f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Upper band boundaries for moisture classification.
///
/// A value strictly above `dry` is Dry, above `not_so_wet` is Not So Wet,
/// above `wet` is Wet, and anything else is Very Wet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoistureThresholds {
    pub wet: i64,
    pub not_so_wet: i64,
    pub dry: i64,
}

impl Default for MoistureThresholds {
    fn default() -> Self {
        Self {
            wet: 2100,
            not_so_wet: 2400,
            dry: 3000,
        }
    }
}

impl MoistureThresholds {
    pub fn classify(&self, moisture_value: i64) -> MoistureStatus {
        // ---
        if moisture_value > self.dry {
            MoistureStatus::Dry
        } else if moisture_value > self.not_so_wet {
            MoistureStatus::NotSoWet
        } else if moisture_value > self.wet {
            MoistureStatus::Wet
        } else {
            MoistureStatus::VeryWet
        }
    }
}

/// Four-band wetness classification of a raw sensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoistureStatus {
    Dry,
    NotSoWet,
    Wet,
    VeryWet,
}

impl MoistureStatus {
    /// CSS class used by the dashboard.
    pub fn css_class(self) -> &'static str {
        match self {
            MoistureStatus::Dry => "dry",
            MoistureStatus::NotSoWet => "not-so-wet",
            MoistureStatus::Wet => "wet",
            MoistureStatus::VeryWet => "very-wet",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoistureStatus::Dry => "Dry",
            MoistureStatus::NotSoWet => "Not So Wet",
            MoistureStatus::Wet => "Wet",
            MoistureStatus::VeryWet => "Very Wet",
        }
    }
}

impl Serialize for MoistureStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // ---
        let mut s = serializer.serialize_struct("MoistureStatus", 2)?;
        s.serialize_field("class", self.css_class())?;
        s.serialize_field("text", self.label())?;
        s.end()
    }
}

/// A reading annotated for display.
#[derive(Debug, Clone, Serialize)]
pub struct ReadingView {
    #[serde(flatten)]
    pub reading: Reading,
    pub moisture_status: MoistureStatus,
}

impl Reading {
    pub fn annotate(self, thresholds: &MoistureThresholds) -> ReadingView {
        let moisture_status = thresholds.classify(self.moisture_value);
        ReadingView {
            reading: self,
            moisture_status,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classification_bands() {
        // ---
        let t = MoistureThresholds::default();

        assert_eq!(t.classify(3001), MoistureStatus::Dry);
        assert_eq!(t.classify(2401), MoistureStatus::NotSoWet);
        assert_eq!(t.classify(2101), MoistureStatus::Wet);
        assert_eq!(t.classify(2100), MoistureStatus::VeryWet);

        // Boundaries belong to the wetter band
        assert_eq!(t.classify(3000), MoistureStatus::NotSoWet);
        assert_eq!(t.classify(2400), MoistureStatus::Wet);
        assert_eq!(t.classify(0), MoistureStatus::VeryWet);
        assert_eq!(t.classify(-5), MoistureStatus::VeryWet);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = MoistureThresholds {
            wet: 10,
            not_so_wet: 20,
            dry: 30,
        };
        assert_eq!(t.classify(31), MoistureStatus::Dry);
        assert_eq!(t.classify(11), MoistureStatus::Wet);
    }

    #[test]
    fn test_status_serialization() {
        // ---
        let value = serde_json::to_value(MoistureStatus::NotSoWet).unwrap();
        assert_eq!(value, json!({"class": "not-so-wet", "text": "Not So Wet"}));
    }

    #[test]
    fn test_valid_payload() {
        // ---
        let payload = json!({"plant_name": "Fern", "location": "Kitchen", "moisture_value": 450});
        let reading = NewReading::from_payload(&payload).unwrap();

        assert_eq!(reading.plant_name, "Fern");
        assert_eq!(reading.location, "Kitchen");
        assert_eq!(reading.moisture_value, 450);
    }

    #[test]
    fn test_moisture_coercion() {
        // ---
        let with = |v: Value| {
            NewReading::from_payload(&json!({"plant_name": "a", "location": "b", "moisture_value": v}))
        };

        assert_eq!(with(json!("2450")).unwrap().moisture_value, 2450);
        assert_eq!(with(json!(" 77 ")).unwrap().moisture_value, 77);
        assert_eq!(with(json!(2450.9)).unwrap().moisture_value, 2450);
        assert_eq!(with(json!(-3.7)).unwrap().moisture_value, -3);
        assert_eq!(with(json!(true)).unwrap().moisture_value, 1);
        assert_eq!(with(json!("wet")), Err(PayloadError::Invalid));
        assert_eq!(with(json!("12.5")), Err(PayloadError::Invalid));
        assert_eq!(with(json!([1])), Err(PayloadError::Invalid));
    }

    #[test]
    fn test_missing_or_falsy_fields() {
        // ---
        let cases = [
            json!({"plant_name": "a", "location": "b"}),
            json!({"plant_name": "", "location": "b", "moisture_value": 1}),
            json!({"plant_name": "a", "location": null, "moisture_value": 1}),
            json!({"plant_name": "a", "location": "b", "moisture_value": 0}),
            json!({"plant_name": "a", "location": "b", "moisture_value": ""}),
            json!({"plant_name": false, "location": "b", "moisture_value": 1}),
            json!([1, 2, 3]),
        ];
        for case in cases {
            assert_eq!(NewReading::from_payload(&case), Err(PayloadError::Invalid), "{case}");
        }
    }

    #[test]
    fn test_empty_payloads() {
        for case in [json!(null), json!({}), json!([]), json!(""), json!(0), json!(false)] {
            assert_eq!(NewReading::from_payload(&case), Err(PayloadError::Empty), "{case}");
        }
    }

    #[test]
    fn test_numeric_names_become_text() {
        let payload = json!({"plant_name": 7, "location": "Greenhouse", "moisture_value": 2200});
        assert_eq!(NewReading::from_payload(&payload).unwrap().plant_name, "7");
    }
}
