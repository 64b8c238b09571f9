//! Serde helpers shared by the configuration types

/// Serialize a `Duration` as whole seconds.
///
/// Timeouts in `config.toml` read as plain integers
/// (`login_timeout = 30`) instead of serde's `{ secs, nanos }` table.
pub mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serialize a Duration as seconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    /// Deserialize a Duration from seconds (u64)
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Timeouts {
        #[serde(with = "duration_secs")]
        grace: Duration,
    }

    #[test]
    fn test_serializes_as_integer_seconds() {
        let t = Timeouts {
            grace: Duration::from_millis(10_900),
        };
        assert_eq!(toml::to_string(&t).unwrap().trim(), "grace = 10");
    }

    #[test]
    fn test_deserializes_from_integer() {
        let t: Timeouts = toml::from_str("grace = 45").unwrap();
        assert_eq!(t.grace, Duration::from_secs(45));
    }

    #[test]
    fn test_rejects_negative() {
        assert!(toml::from_str::<Timeouts>("grace = -1").is_err());
    }
}
