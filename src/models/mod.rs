//! Classification result model
//!
//! Every classification yields the same fourteen string fields. Compiled
//! signatures only carry the fields they actually set, as an ordered
//! [`FieldSet`], and are merged onto [`ResultFields::default`] at match time.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Default for every text field
pub const UNKNOWN: &str = "unknown";
/// Default for `ua_icon` and `os_icon`
pub const UNKNOWN_ICON: &str = "unknown.png";

/// One of the fixed result keys
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Typ,
    UaFamily,
    UaName,
    UaUrl,
    UaCompany,
    UaCompanyUrl,
    UaIcon,
    UaInfoUrl,
    OsFamily,
    OsName,
    OsUrl,
    OsCompany,
    OsCompanyUrl,
    OsIcon,
}

impl Field {
    /// Value used when a signature leaves this field unset
    pub fn default_value(self) -> &'static str {
        match self {
            Field::UaIcon | Field::OsIcon => UNKNOWN_ICON,
            _ => UNKNOWN,
        }
    }
}

/// Ordered field assignments; later entries win when merged
pub type FieldSet = Vec<(Field, String)>;

/// The classification of a single user agent string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFields {
    pub typ: String,
    pub ua_family: String,
    pub ua_name: String,
    pub ua_url: String,
    pub ua_company: String,
    pub ua_company_url: String,
    pub ua_icon: String,
    pub ua_info_url: String,
    pub os_family: String,
    pub os_name: String,
    pub os_url: String,
    pub os_company: String,
    pub os_company_url: String,
    pub os_icon: String,
}

impl Default for ResultFields {
    fn default() -> Self {
        Self {
            typ: UNKNOWN.to_string(),
            ua_family: UNKNOWN.to_string(),
            ua_name: UNKNOWN.to_string(),
            ua_url: UNKNOWN.to_string(),
            ua_company: UNKNOWN.to_string(),
            ua_company_url: UNKNOWN.to_string(),
            ua_icon: UNKNOWN_ICON.to_string(),
            ua_info_url: UNKNOWN.to_string(),
            os_family: UNKNOWN.to_string(),
            os_name: UNKNOWN.to_string(),
            os_url: UNKNOWN.to_string(),
            os_company: UNKNOWN.to_string(),
            os_company_url: UNKNOWN.to_string(),
            os_icon: UNKNOWN_ICON.to_string(),
        }
    }
}

impl ResultFields {
    /// Build a result by applying `fields` on top of the defaults
    pub fn from_fields(fields: &[(Field, String)]) -> Self {
        let mut result = Self::default();
        result.apply(fields);
        result
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Typ => &mut self.typ,
            Field::UaFamily => &mut self.ua_family,
            Field::UaName => &mut self.ua_name,
            Field::UaUrl => &mut self.ua_url,
            Field::UaCompany => &mut self.ua_company,
            Field::UaCompanyUrl => &mut self.ua_company_url,
            Field::UaIcon => &mut self.ua_icon,
            Field::UaInfoUrl => &mut self.ua_info_url,
            Field::OsFamily => &mut self.os_family,
            Field::OsName => &mut self.os_name,
            Field::OsUrl => &mut self.os_url,
            Field::OsCompany => &mut self.os_company,
            Field::OsCompanyUrl => &mut self.os_company_url,
            Field::OsIcon => &mut self.os_icon,
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Typ => &self.typ,
            Field::UaFamily => &self.ua_family,
            Field::UaName => &self.ua_name,
            Field::UaUrl => &self.ua_url,
            Field::UaCompany => &self.ua_company,
            Field::UaCompanyUrl => &self.ua_company_url,
            Field::UaIcon => &self.ua_icon,
            Field::UaInfoUrl => &self.ua_info_url,
            Field::OsFamily => &self.os_family,
            Field::OsName => &self.os_name,
            Field::OsUrl => &self.os_url,
            Field::OsCompany => &self.os_company,
            Field::OsCompanyUrl => &self.os_company_url,
            Field::OsIcon => &self.os_icon,
        }
    }

    pub fn set<S: Into<String>>(&mut self, field: Field, value: S) {
        *self.slot_mut(field) = value.into();
    }

    /// Merge assignments in order, overwriting whatever is already set
    pub fn apply(&mut self, fields: &[(Field, String)]) {
        for (field, value) in fields {
            self.set(*field, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn default_uses_unknown_and_unknown_icon() {
        let result = ResultFields::default();

        for field in Field::iter() {
            assert_eq!(result.get(field), field.default_value(), "{field:?}");
        }
        assert_eq!(result.ua_icon, "unknown.png");
        assert_eq!(result.os_icon, "unknown.png");
        assert_eq!(result.typ, "unknown");
    }

    #[test]
    fn field_names_match_result_keys() {
        assert_eq!(Field::iter().count(), 14);
        assert_eq!(Field::UaCompanyUrl.as_ref(), "ua_company_url");
        assert_eq!(Field::from_str("os_icon").unwrap(), Field::OsIcon);

        let json = serde_json::to_value(ResultFields::default()).unwrap();
        for field in Field::iter() {
            assert!(json.get(field.as_ref()).is_some(), "{field:?}");
        }
    }

    #[test]
    fn apply_later_entries_win() {
        let result = ResultFields::from_fields(&[
            (Field::OsFamily, "Linux".to_string()),
            (Field::UaFamily, "Firefox".to_string()),
            (Field::OsFamily, "Android".to_string()),
        ]);

        assert_eq!(result.os_family, "Android");
        assert_eq!(result.ua_family, "Firefox");
        assert_eq!(result.ua_name, UNKNOWN);
    }
}
