//! Serde helpers shared by the domains

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Durations as whole seconds (`180`) or humantime strings (`"500ms"`).
///
/// Whole seconds are written back as integers so generated samples stay
/// readable.
pub mod serde_duration {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Seconds(u64),
        Text(#[serde(with = "humantime_serde")] Duration),
    }

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_u64(duration.as_secs())
        } else {
            humantime_serde::serialize(duration, serializer)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawDuration::deserialize(deserializer)? {
            RawDuration::Seconds(seconds) => Duration::from_secs(seconds),
            RawDuration::Text(duration) => duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "super::serde_duration")]
        value: Duration,
    }

    #[test]
    fn test_seconds_and_humantime_accepted() {
        let whole: Holder = serde_yaml::from_str("value: 180").unwrap();
        assert_eq!(whole.value, Duration::from_secs(180));

        let short: Holder = serde_yaml::from_str("value: 500ms").unwrap();
        assert_eq!(short.value, Duration::from_millis(500));
    }

    #[test]
    fn test_sub_second_values_survive_serialization() {
        let holder = Holder {
            value: Duration::from_millis(250),
        };
        let yaml = serde_yaml::to_string(&holder).unwrap();
        assert_eq!(serde_yaml::from_str::<Holder>(&yaml).unwrap(), holder);
        assert_eq!(
            serde_yaml::to_string(&Holder { value: Duration::from_secs(2) }).unwrap().trim(),
            "value: 2"
        );
    }
}
