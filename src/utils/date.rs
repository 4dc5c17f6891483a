use chrono::NaiveDateTime;

pub const DATE_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// dates are stored in one fixed format so that string comparison matches time order
pub fn format_date(date: NaiveDateTime) -> String {
    format!("{}", date.format(DATE_FMT))
}

pub mod serializer {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde::de::Error;
    use crate::utils::date::{DATE_FMT, format_date};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        format_date(*time).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let str_time: String = Deserialize::deserialize(deserializer)?;
        let time = NaiveDateTime::parse_from_str(&str_time, DATE_FMT).map_err(D::Error::custom)?;
        Ok(time)
    }
}

pub mod opt_serializer {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde::de::Error;
    use crate::utils::date::{DATE_FMT, format_date};

    pub fn serialize<S: Serializer>(time: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        time.map(format_date).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let str_time: Option<String> = Deserialize::deserialize(deserializer)?;
        match str_time {
            Some(str_time) if !str_time.is_empty() => {
                NaiveDateTime::parse_from_str(&str_time, DATE_FMT).map(Some).map_err(D::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDateTime};
    use serde::{Deserialize, Serialize};
    use crate::utils::date::{DATE_FMT, format_date};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "crate::utils::date::serializer")]
        at: NaiveDateTime,
        #[serde(with = "crate::utils::date::opt_serializer", default)]
        until: Option<NaiveDateTime>,
    }

    #[tokio::test]
    async fn test_should_round_trip_dates() {
        let at = NaiveDateTime::parse_from_str("2023-04-11T11:11:11.25", DATE_FMT).unwrap();
        let stamped = Stamped { at, until: Some(at + Duration::days(1)) };
        let json = serde_json::to_string(&stamped).unwrap();
        assert!(json.contains("2023-04-11T11:11:11.250"));
        assert_eq!(stamped, serde_json::from_str::<Stamped>(json.as_str()).unwrap());

        let empty: Stamped = serde_json::from_str("{\"at\":\"2023-04-11T11:11:11\",\"until\":null}").unwrap();
        assert_eq!(None, empty.until);
    }

    #[tokio::test]
    async fn test_should_order_formatted_dates() {
        let early = NaiveDateTime::parse_from_str("2023-04-11T11:11:11", DATE_FMT).unwrap();
        let late = early + Duration::milliseconds(500);
        assert!(format_date(early) < format_date(late));
    }
}
