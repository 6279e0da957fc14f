use serde::{Deserialize, Serialize};

use crate::query::RecordQuery;
use crate::types::{AGE_WEEKS_FIELD, BREED_FIELD, SEX_FIELD};

/// Named rescue-training profiles. Each one is a fixed breed set, a required
/// sex-and-fertility label, and an inclusive age window in weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescueProfile {
    Water,
    Mountain,
    Disaster,
}

impl RescueProfile {
    pub const ALL: [RescueProfile; 3] = [
        RescueProfile::Water,
        RescueProfile::Mountain,
        RescueProfile::Disaster,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RescueProfile::Water => "Water Rescue",
            RescueProfile::Mountain => "Mountain Rescue",
            RescueProfile::Disaster => "Disaster Rescue",
        }
    }

    pub fn breeds(&self) -> &'static [&'static str] {
        match self {
            RescueProfile::Water => &[
                "Labrador Retriever Mix",
                "Chesapeake Bay Retriever",
                "Newfoundland",
            ],
            RescueProfile::Mountain => &[
                "German Shepherd",
                "Alaskan Malamute",
                "Old English Sheepdog",
                "Siberian Husky",
                "Rottweiler",
            ],
            RescueProfile::Disaster => &[
                "Doberman Pinscher",
                "German Shepherd",
                "Golden Retriever",
                "Bloodhound",
                "Rottweiler",
            ],
        }
    }

    pub fn sex_label(&self) -> &'static str {
        match self {
            RescueProfile::Water => "Intact Female",
            RescueProfile::Mountain | RescueProfile::Disaster => "Intact Male",
        }
    }

    /// Inclusive (min, max) age in weeks.
    pub fn age_weeks(&self) -> (f64, f64) {
        match self {
            RescueProfile::Water | RescueProfile::Mountain => (26.0, 156.0),
            RescueProfile::Disaster => (20.0, 300.0),
        }
    }

    pub fn query(&self) -> RecordQuery {
        let (min, max) = self.age_weeks();
        RecordQuery::all()
            .one_of(BREED_FIELD, self.breeds().iter().copied())
            .equals(SEX_FIELD, self.sex_label())
            .between(AGE_WEEKS_FIELD, min, max)
    }
}

impl std::fmt::Display for RescueProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Dropdown state: a rescue profile, or no filter at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterSelection {
    #[default]
    Reset,
    Profile(RescueProfile),
}

impl FilterSelection {
    pub const RESET_LABEL: &'static str = "Reset";

    /// Total over every input: anything that is not a profile label, including
    /// `Reset`, an empty string, or garbage, selects no filter.
    pub fn parse(value: &str) -> Self {
        RescueProfile::ALL
            .into_iter()
            .find(|p| p.label() == value.trim())
            .map(FilterSelection::Profile)
            .unwrap_or(FilterSelection::Reset)
    }

    pub fn from_param(value: Option<&str>) -> Self {
        value.map(Self::parse).unwrap_or_default()
    }

    pub fn profile(&self) -> Option<RescueProfile> {
        match self {
            FilterSelection::Reset => None,
            FilterSelection::Profile(p) => Some(*p),
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.profile().is_some()
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterSelection::Reset => Self::RESET_LABEL,
            FilterSelection::Profile(p) => p.label(),
        }
    }

    pub fn query(&self) -> RecordQuery {
        match self {
            FilterSelection::Reset => RecordQuery::all(),
            FilterSelection::Profile(p) => p.query(),
        }
    }

    /// Dropdown entries in display order.
    pub fn options() -> impl Iterator<Item = FilterSelection> {
        RescueProfile::ALL
            .into_iter()
            .map(FilterSelection::Profile)
            .chain(std::iter::once(FilterSelection::Reset))
    }
}
