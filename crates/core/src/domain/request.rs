use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Property size token used to index the rate table. A studio is a scalar
/// key; every other size is keyed by bedroom count (`"2_bed"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertySize {
    Studio,
    Bedrooms(u32),
}

impl PropertySize {
    pub fn rate_key(&self) -> String {
        match self {
            Self::Studio => "studio".to_string(),
            Self::Bedrooms(count) => format!("{count}_bed"),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Studio => "studio".to_string(),
            Self::Bedrooms(count) => format!("{count} bed"),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid property size `{0}` (expected `studio` or `<n>_bed`)")]
pub struct ParsePropertySizeError(pub String);

impl FromStr for PropertySize {
    type Err = ParsePropertySizeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let token = value.trim().to_ascii_lowercase();
        if token == "studio" {
            return Ok(Self::Studio);
        }

        if let Some(count) = token.strip_suffix("_bed") {
            if let Ok(count) = count.parse::<u32>() {
                return Ok(Self::Bedrooms(count));
            }
        }

        Err(ParsePropertySizeError(value.to_string()))
    }
}

impl fmt::Display for PropertySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rate_key())
    }
}

impl Serialize for PropertySize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.rate_key())
    }
}

impl<'de> Deserialize<'de> for PropertySize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(de::Error::custom)
    }
}

/// Cadence for general cleans. One-off keeps the undiscounted minimum;
/// recurring cadences unlock the matching rate-table discount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    #[default]
    OneOff,
    Weekly,
    Biweekly,
    Monthly,
}

impl Cadence {
    pub fn discount_key(&self) -> Option<&'static str> {
        match self {
            Self::OneOff => None,
            Self::Weekly => Some("weekly"),
            Self::Biweekly => Some("biweekly"),
            Self::Monthly => Some("monthly"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneOff => "one-off",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

/// Carpet area counts. Zero counts produce no breakdown line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarpetAreas {
    #[serde(default)]
    pub rooms: u32,
    #[serde(default)]
    pub lounges: u32,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub landing_halls: u32,
    #[serde(default)]
    pub stair_steps: u32,
    #[serde(default)]
    pub stair_flights: u32,
    #[serde(default)]
    pub small_rugs: u32,
    #[serde(default)]
    pub large_rugs: u32,
}

/// The requested service. A closed enum: an unknown `service` tag fails
/// deserialization at the interface boundary, the engine itself is total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum Service {
    EndOfTenancy {
        size: PropertySize,
        #[serde(default)]
        bathrooms: u32,
        #[serde(default)]
        wcs: u32,
    },
    AirbnbTurnover {
        size: PropertySize,
        #[serde(default)]
        bathrooms: u32,
    },
    Communal {
        block_size: String,
        frequency: String,
        #[serde(default)]
        lifts: u32,
        #[serde(default)]
        bin_store: bool,
    },
    General {
        #[serde(default)]
        cadence: Cadence,
    },
    Carpet {
        #[serde(default)]
        areas: CarpetAreas,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessFlags {
    #[serde(default)]
    pub pets: bool,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub congestion: bool,
    #[serde(default)]
    pub parking: bool,
}

/// One quote submission. Ephemeral: constructed per request, never stored
/// by the engine itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(flatten)]
    pub service: Service,
    #[serde(default)]
    pub flags: AccessFlags,
    #[serde(default)]
    pub promo: Option<String>,
    #[serde(default)]
    pub addons: Vec<String>,
}
