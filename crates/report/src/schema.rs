//! Report data model
//!
//! Records arrive as JSON snapshots from the database layer and are read-only here.

use crate::parser::{lenient_bool, lenient_opt_u32, lenient_string};
use serde::{Deserialize, Serialize};

/// Head-of-household details for one family block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub family_id: String,
    pub head_name: String,
    pub honorific: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub area_id: String,
    pub area_name: String,
    pub area_code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub family_number_suffix: String,
    /// Prayer points or free-form notes
    #[serde(alias = "notes", alias = "prayerPoints")]
    pub prayer_or_notes_text: String,
}

impl FamilyRecord {
    /// Family number as printed, e.g. "PLK-012"
    pub fn family_number(&self) -> String {
        join_non_empty(&[self.area_code.trim(), self.family_number_suffix.trim()], "-")
    }

    /// Head of household with honorific, e.g. "Mr. D. Samuel"
    pub fn display_head(&self) -> String {
        join_non_empty(&[self.honorific.trim(), self.head_name.trim()], " ")
    }

    /// Whether the family belongs to the given area (by id or code)
    pub fn in_area(&self, area: &str) -> bool {
        let area = area.trim();
        self.area_id.trim() == area || self.area_code.trim() == area
    }
}

/// One member row in a family's member table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub member_id: String,
    pub name: String,
    pub honorific: String,
    #[serde(deserialize_with = "lenient_opt_u32")]
    pub age: Option<u32>,
    pub sex: String,
    pub relation: String,
    pub occupation: String,
    pub working_place: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub baptised: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub confirmed: bool,
    #[serde(deserialize_with = "lenient_opt_u32")]
    pub serial_number: Option<u32>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_celebrant: bool,
}

impl MemberRecord {
    pub fn display_name(&self) -> String {
        join_non_empty(&[self.honorific.trim(), self.name.trim()], " ")
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn age_text(&self) -> String {
        self.age.map(|age| age.to_string()).unwrap_or_default()
    }
}

/// A family with its members and the ids of members being celebrated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyGroup {
    pub family: FamilyRecord,
    pub members: Vec<MemberRecord>,
    /// Member ids whose birthday or wedding day falls in the report window
    pub celebrants: Vec<String>,
}

impl FamilyGroup {
    pub fn is_celebrant(&self, member: &MemberRecord) -> bool {
        member.is_celebrant
            || (!member.member_id.is_empty()
                && self.celebrants.iter().any(|id| id == &member.member_id))
    }
}

/// A member flattened with its family and area, as used by the congregation register
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRow {
    #[serde(flatten)]
    pub member: MemberRecord,
    #[serde(deserialize_with = "lenient_string")]
    pub family_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub family_number: String,
    pub head_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub area_id: String,
    pub area_name: String,
    pub area_code: String,
}

impl RegisterRow {
    pub fn in_area(&self, area: &str) -> bool {
        let area = area.trim();
        self.area_id.trim() == area || self.area_code.trim() == area
    }

    /// Family heading text, e.g. "PLK-012  D. Samuel  (Palayamkottai)"
    pub fn family_heading(&self) -> String {
        let number = join_non_empty(&[self.area_code.trim(), self.family_number.trim()], "-");
        let mut heading = join_non_empty(&[number.as_str(), self.head_name.trim()], "  ");
        if !self.area_name.trim().is_empty() {
            heading.push_str(&format!("  ({})", self.area_name.trim()));
        }
        heading
    }
}

/// Church metadata printed in the report header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChurchInfo {
    #[serde(alias = "churchName")]
    pub name: String,
    pub short_name: Option<String>,
    pub pastorate_name: Option<String>,
    pub diocese: Option<String>,
}

impl ChurchInfo {
    /// Name used in file names: the configured short name, or the church
    /// name with whitespace runs collapsed to `-`
    pub fn short_name(&self) -> String {
        let source = self
            .short_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.name.trim());
        source.split_whitespace().collect::<Vec<_>>().join("-")
    }
}

/// Options recognised by every report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportOptions {
    /// `YYYY-MM-DD`, first day of the report window
    pub from_date: Option<String>,
    /// `YYYY-MM-DD`, last day of the report window
    pub to_date: Option<String>,
    /// Restrict to one congregation area (matched by area id or code)
    #[serde(deserialize_with = "crate::parser::lenient_opt_string")]
    pub area_id: Option<String>,
    #[serde(deserialize_with = "lenient_opt_u32")]
    pub year: Option<u32>,
}

impl ReportOptions {
    pub fn date_range(from: &str, to: &str) -> Self {
        Self {
            from_date: Some(from.to_string()),
            to_date: Some(to.to_string()),
            ..Self::default()
        }
    }

    pub fn for_year(year: u32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn area(mut self, area_id: &str) -> Self {
        self.area_id = Some(area_id.to_string());
        self
    }

    /// Area filter, ignoring blank values
    pub fn area_filter(&self) -> Option<&str> {
        self.area_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn join_non_empty(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
}
