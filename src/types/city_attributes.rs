use serde::{Deserialize, Serialize};

/// Static description of a city, joined onto the long-form table by exact name.
///
/// Every attribute is optional: a city without a row in the attribute file keeps
/// its observations, only the attributes stay null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAttributes {
    pub city: String,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CityAttributes {
    pub fn unknown(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: None,
            latitude: None,
            longitude: None,
        }
    }
}
