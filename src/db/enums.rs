use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "vps_provider_enum")]
#[serde(rename_all = "UPPERCASE")]
pub enum Provider {
    #[default]
    #[sea_orm(string_value = "IONOS")]
    Ionos,
    #[sea_orm(string_value = "CONTABO")]
    Contabo,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ionos => "IONOS",
            Provider::Contabo => "CONTABO",
            Provider::Other => "OTHER",
        }
    }

    /// Label shown in the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Ionos => "IONOS",
            Provider::Contabo => "Contabo",
            Provider::Other => "Other",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown provider '{0}', expected one of IONOS, CONTABO, OTHER")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IONOS" => Ok(Provider::Ionos),
            "CONTABO" => Ok(Provider::Contabo),
            "OTHER" => Ok(Provider::Other),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_case_insensitively() {
        assert_eq!("contabo".parse::<Provider>().unwrap(), Provider::Contabo);
        assert_eq!(" Ionos ".parse::<Provider>().unwrap(), Provider::Ionos);
        assert_eq!("OTHER".parse::<Provider>().unwrap(), Provider::Other);
        assert!("hetzner".parse::<Provider>().is_err());
    }

    #[test]
    fn serializes_as_uppercase_code() {
        assert_eq!(serde_json::to_string(&Provider::Contabo).unwrap(), "\"CONTABO\"");
        assert_eq!(Provider::default(), Provider::Ionos);
    }
}
