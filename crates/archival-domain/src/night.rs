// night.rs
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::DomainError;

const NIGHT_FORMAT: &str = "%Y%m%d";

/// Noche de observación que acota una ejecución de archivado.
///
/// Se representa como 8 dígitos `YYYYMMDD` (p.ej. `19881103`), la misma forma
/// que recibe el job runner en `--night`. Es inmutable una vez creada.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Night {
    id: String,
    date: NaiveDate,
}

impl Night {
    /// Valida y construye una noche a partir de su identificador textual.
    ///
    /// # Errores
    /// `DomainError::InvalidNight` si no son exactamente 8 dígitos ASCII o si
    /// no forman una fecha de calendario válida.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.len() != 8 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidNight(raw.to_string()));
        }
        let date = NaiveDate::parse_from_str(trimmed, NIGHT_FORMAT).map_err(|_| DomainError::InvalidNight(raw.to_string()))?;
        Ok(Self { id: trimmed.to_string(),
                  date })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self { id: date.format(NIGHT_FORMAT).to_string(),
               date }
    }

    /// Noche por defecto: la fecha UTC actual (equivale a `date +%Y%m%d`).
    pub fn today_utc() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl fmt::Display for Night {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl FromStr for Night {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Night {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Night> for String {
    fn from(night: Night) -> Self {
        night.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_night() {
        let night = Night::parse("19881103").unwrap();
        assert_eq!(night.as_str(), "19881103");
        assert_eq!(night.date(), NaiveDate::from_ymd_opt(1988, 11, 3).unwrap());
    }

    #[test]
    fn rejects_malformed_nights() {
        for raw in ["", "1988110", "1988-11-03", "19881332", "2023021a", "198811031"] {
            assert!(matches!(Night::parse(raw), Err(DomainError::InvalidNight(_))), "{raw} debería ser inválida");
        }
    }

    #[test]
    fn from_date_roundtrips_through_display() {
        let night = Night::from_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(night.to_string(), "20240229");
        assert_eq!(Night::parse(&night.to_string()).unwrap(), night);
    }

    #[test]
    fn serde_uses_plain_string() {
        let night = Night::parse("19881103").unwrap();
        assert_eq!(serde_json::to_string(&night).unwrap(), "\"19881103\"");
        assert!(serde_json::from_str::<Night>("\"1988\"").is_err());
    }
}
