//! Profile data collected by the quiz.

use serde::{Deserialize, Serialize};

/// Maximum number of goals a user may pick.
pub const MAX_GOALS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Self::Female, Self::Male, Self::NonBinary];
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Female => write!(f, "Female"),
            Self::Male => write!(f, "Male"),
            Self::NonBinary => write!(f, "Non-binary"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    InRelationship,
    BrokeUp,
    Engaged,
    Married,
    Looking,
    Single,
}

impl RelationshipStatus {
    pub const ALL: [RelationshipStatus; 6] = [
        Self::InRelationship,
        Self::BrokeUp,
        Self::Engaged,
        Self::Married,
        Self::Looking,
        Self::Single,
    ];
}

impl std::fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InRelationship => "In a relationship",
            Self::BrokeUp => "Just broke up",
            Self::Engaged => "Engaged",
            Self::Married => "Married",
            Self::Looking => "Looking for a soulmate",
            Self::Single => "Single",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Family,
    Career,
    Health,
    Marriage,
    Travel,
    Education,
    Friends,
    Children,
}

impl Goal {
    pub const ALL: [Goal; 8] = [
        Self::Family,
        Self::Career,
        Self::Health,
        Self::Marriage,
        Self::Travel,
        Self::Education,
        Self::Friends,
        Self::Children,
    ];
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Family => "Family harmony",
            Self::Career => "Career growth",
            Self::Health => "Physical vitality",
            Self::Marriage => "Finding a spouse",
            Self::Travel => "World exploration",
            Self::Education => "Higher learning",
            Self::Friends => "Social connections",
            Self::Children => "Starting a family",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteColor {
    Red,
    Yellow,
    Blue,
    Orange,
    Green,
}

impl FavoriteColor {
    pub const ALL: [FavoriteColor; 5] = [
        Self::Red,
        Self::Yellow,
        Self::Blue,
        Self::Orange,
        Self::Green,
    ];
}

impl std::fmt::Display for FavoriteColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Earth,
    Water,
    Fire,
    Air,
}

impl Element {
    pub const ALL: [Element; 4] = [Self::Earth, Self::Water, Self::Fire, Self::Air];
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A single field write requested by a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    Gender(Gender),
    BirthDate(String),
    BirthTime(Option<String>),
    BirthPlace(String),
    RelationshipStatus(RelationshipStatus),
    FavoriteColor(FavoriteColor),
    Element(Element),
    PalmImage(String),
}

/// What the user has told us so far. One per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// `YYYY-MM-DD`, empty until entered.
    pub birth_date: String,
    /// `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_time: Option<String>,
    pub birth_place: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_status: Option<RelationshipStatus>,
    /// Selection order is kept; never longer than [`MAX_GOALS`].
    pub goals: Vec<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_color: Option<FavoriteColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    /// Data URL or bare base64.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palm_image: Option<String>,
}

impl Profile {
    pub fn apply(&mut self, update: ProfileUpdate) {
        match update {
            ProfileUpdate::Gender(g) => self.gender = Some(g),
            ProfileUpdate::BirthDate(d) => self.birth_date = d,
            ProfileUpdate::BirthTime(t) => {
                self.birth_time = t.filter(|t| !t.trim().is_empty());
            }
            ProfileUpdate::BirthPlace(p) => self.birth_place = p,
            ProfileUpdate::RelationshipStatus(r) => self.relationship_status = Some(r),
            ProfileUpdate::FavoriteColor(c) => self.favorite_color = Some(c),
            ProfileUpdate::Element(e) => self.element = Some(e),
            ProfileUpdate::PalmImage(img) => self.palm_image = Some(img),
        }
    }

    /// Toggle a goal in or out of the selection.
    ///
    /// Removing always works. Adding only works below [`MAX_GOALS`]; at the
    /// cap the selection is left exactly as it was. Returns whether anything
    /// changed.
    pub fn toggle_goal(&mut self, goal: Goal) -> bool {
        if let Some(pos) = self.goals.iter().position(|g| *g == goal) {
            self.goals.remove(pos);
            return true;
        }
        if self.goals.len() < MAX_GOALS {
            self.goals.push(goal);
            return true;
        }
        false
    }

    pub fn has_birth_date(&self) -> bool {
        !self.birth_date.trim().is_empty()
    }

    pub fn has_birth_place(&self) -> bool {
        !self.birth_place.trim().is_empty()
    }

    pub fn has_palm_image(&self) -> bool {
        self.palm_image.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_is_empty() {
        let p = Profile::default();
        assert!(p.gender.is_none());
        assert!(!p.has_birth_date());
        assert!(!p.has_birth_place());
        assert!(!p.has_palm_image());
        assert!(p.goals.is_empty());
    }

    #[test]
    fn toggle_adds_until_cap() {
        let mut p = Profile::default();
        for (k, goal) in [Goal::Career, Goal::Travel, Goal::Health].into_iter().enumerate() {
            assert!(p.toggle_goal(goal));
            assert_eq!(p.goals.len(), k + 1);
        }

        let before = p.goals.clone();
        assert!(!p.toggle_goal(Goal::Family));
        assert_eq!(p.goals, before, "full selection must be left untouched");
    }

    #[test]
    fn toggle_removes_regardless_of_size() {
        let mut p = Profile::default();
        p.toggle_goal(Goal::Career);
        p.toggle_goal(Goal::Travel);
        p.toggle_goal(Goal::Health);

        assert!(p.toggle_goal(Goal::Travel));
        assert_eq!(p.goals, vec![Goal::Career, Goal::Health]);

        // Room again after a removal.
        assert!(p.toggle_goal(Goal::Friends));
        assert_eq!(p.goals.len(), 3);

        let mut single = Profile::default();
        single.toggle_goal(Goal::Children);
        assert!(single.toggle_goal(Goal::Children));
        assert!(single.goals.is_empty());
    }

    #[test]
    fn blank_inputs_do_not_count() {
        let mut p = Profile::default();
        p.apply(ProfileUpdate::BirthDate("   ".into()));
        p.apply(ProfileUpdate::BirthPlace("".into()));
        p.apply(ProfileUpdate::PalmImage(String::new()));
        assert!(!p.has_birth_date());
        assert!(!p.has_birth_place());
        assert!(!p.has_palm_image());

        p.apply(ProfileUpdate::BirthTime(Some(" ".into())));
        assert!(p.birth_time.is_none());
    }

    #[test]
    fn apply_overwrites_choices() {
        let mut p = Profile::default();
        p.apply(ProfileUpdate::Gender(Gender::Male));
        p.apply(ProfileUpdate::Gender(Gender::NonBinary));
        assert_eq!(p.gender, Some(Gender::NonBinary));

        p.apply(ProfileUpdate::BirthTime(Some("07:45".into())));
        assert_eq!(p.birth_time.as_deref(), Some("07:45"));
        p.apply(ProfileUpdate::BirthTime(None));
        assert!(p.birth_time.is_none());
    }

    #[test]
    fn labels_match_display_copy() {
        assert_eq!(Gender::NonBinary.to_string(), "Non-binary");
        assert_eq!(RelationshipStatus::Looking.to_string(), "Looking for a soulmate");
        assert_eq!(Goal::Health.to_string(), "Physical vitality");
        assert_eq!(FavoriteColor::Orange.to_string(), "Orange");
        assert_eq!(Element::Air.to_string(), "Air");
    }

    #[test]
    fn profile_serde_skips_unset() {
        let mut p = Profile::default();
        p.apply(ProfileUpdate::BirthPlace("Toronto, Ontario, Canada".into()));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["birth_place"], "Toronto, Ontario, Canada");
        assert!(json.get("gender").is_none());
        assert!(json.get("palm_image").is_none());
    }
}
