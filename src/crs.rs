//! Coordinate reference system descriptors
//!
//! The descriptor is only checked for well-formedness and carried along with
//! the raster; nothing in this crate reprojects.

use crate::errors::{GridZoneError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parsed CRS descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Crs {
    /// `EPSG:<code>` authority reference
    Epsg(u32),
    /// PROJ4 parameter list, e.g. `+proj=longlat +datum=WGS84 +no_defs`
    Proj(Vec<(String, Option<String>)>),
}

impl Crs {
    /// Geographic WGS84
    pub fn wgs84() -> Self {
        Crs::Epsg(4326)
    }

    /// Parse an `EPSG:<code>` or PROJ4 string
    ///
    /// # Errors
    ///
    /// Returns [`GridZoneError::InvalidCrs`] if the string is empty, the EPSG
    /// code is not numeric, or a PROJ4 token does not start with `+`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| GridZoneError::InvalidCrs {
            crs: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty CRS string"));
        }

        if let Some((authority, code)) = trimmed.split_once(':') {
            if authority.eq_ignore_ascii_case("epsg") {
                return code
                    .trim()
                    .parse::<u32>()
                    .map(Crs::Epsg)
                    .map_err(|_| invalid("EPSG code must be a positive integer"));
            }
        }

        let mut params = Vec::new();
        for token in trimmed.split_whitespace() {
            let Some(body) = token.strip_prefix('+') else {
                return Err(invalid("PROJ4 parameters must start with '+'"));
            };
            let (key, value) = match body.split_once('=') {
                Some((k, v)) => (k, Some(v.to_string())),
                None => (body, None),
            };
            if key.is_empty() {
                return Err(invalid("empty PROJ4 parameter name"));
            }
            params.push((key.to_string(), value));
        }

        if !params.iter().any(|(k, _)| k == "proj" || k == "init") {
            return Err(invalid("missing +proj parameter"));
        }

        Ok(Crs::Proj(params))
    }

    /// Value of a PROJ4 parameter, if present
    pub fn proj_param(&self, key: &str) -> Option<&str> {
        match self {
            Crs::Proj(params) => params
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.as_deref()),
            Crs::Epsg(_) => None,
        }
    }

    /// Whether the CRS uses geographic (degree) coordinates
    pub fn is_geographic(&self) -> bool {
        match self {
            Crs::Epsg(code) => *code == 4326 || *code == 4269 || *code == 4258,
            Crs::Proj(_) => matches!(self.proj_param("proj"), Some("longlat" | "latlong" | "lonlat" | "latlon")),
        }
    }
}

impl FromStr for Crs {
    type Err = GridZoneError;

    fn from_str(s: &str) -> Result<Self> {
        Crs::parse(s)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{code}"),
            Crs::Proj(params) => {
                let tokens: Vec<String> = params
                    .iter()
                    .map(|(k, v)| match v {
                        Some(v) => format!("+{k}={v}"),
                        None => format!("+{k}"),
                    })
                    .collect();
                write!(f, "{}", tokens.join(" "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proj4() {
        let crs = Crs::parse("+proj=longlat +datum=WGS84 +no_defs").unwrap();
        assert_eq!(crs.proj_param("datum"), Some("WGS84"));
        assert_eq!(crs.proj_param("no_defs"), None);
        assert!(crs.is_geographic());
        assert_eq!(crs.to_string(), "+proj=longlat +datum=WGS84 +no_defs");
    }

    #[test]
    fn test_parse_epsg() {
        assert_eq!(Crs::parse("EPSG:4326").unwrap(), Crs::wgs84());
        assert_eq!("epsg:3035".parse::<Crs>().unwrap(), Crs::Epsg(3035));
        assert!(!Crs::Epsg(3035).is_geographic());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "   ", "EPSG:abc", "proj=longlat", "+datum=WGS84", "+=x +proj=longlat"] {
            assert!(
                matches!(Crs::parse(bad), Err(GridZoneError::InvalidCrs { .. })),
                "expected '{bad}' to be rejected"
            );
        }
    }
}
