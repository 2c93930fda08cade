//! Step sequencer: the fixed order of quiz screens and the rules for
//! moving through it.

use serde::{Deserialize, Serialize};

use super::model::Profile;

/// Denominator of the progress header.
pub const TOTAL_STEPS: u8 = 14;

/// The screens of the quiz, in order.
///
/// Progresses linearly: Landing → BirthDate → … → ResultsPreview →
/// FullReport. Only `reset` leaves FullReport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Landing,
    BirthDate,
    BirthTime,
    BirthPlace,
    ProcessingChart,
    Relationship,
    Goals,
    Color,
    Element,
    ProcessingAccuracy,
    PalmIntro,
    PalmUpload,
    ProcessingPalm,
    ResultsPreview,
    FullReport,
}

impl Step {
    pub const ALL: [Step; 15] = [
        Self::Landing,
        Self::BirthDate,
        Self::BirthTime,
        Self::BirthPlace,
        Self::ProcessingChart,
        Self::Relationship,
        Self::Goals,
        Self::Color,
        Self::Element,
        Self::ProcessingAccuracy,
        Self::PalmIntro,
        Self::PalmUpload,
        Self::ProcessingPalm,
        Self::ResultsPreview,
        Self::FullReport,
    ];

    /// Zero-based position in the sequence.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Step> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Unconditional successor, ignoring guards.
    pub fn next(self) -> Option<Step> {
        Self::from_ordinal(self.ordinal() + 1)
    }

    pub fn prev(self) -> Option<Step> {
        self.ordinal().checked_sub(1).and_then(Self::from_ordinal)
    }

    /// Whether the required input for leaving this step is present.
    ///
    /// Only BirthDate, BirthPlace and PalmUpload have a guard. Everything
    /// else, including optional fields like birth time, always passes.
    pub fn guard_satisfied(self, profile: &Profile) -> bool {
        match self {
            Self::BirthDate => profile.has_birth_date(),
            Self::BirthPlace => profile.has_birth_place(),
            Self::PalmUpload => profile.has_palm_image(),
            _ => true,
        }
    }

    /// Whether this screen shows the header with back button and progress.
    pub fn shows_header(self) -> bool {
        !matches!(self, Self::Landing | Self::ResultsPreview | Self::FullReport)
    }

    /// Processing screens advance themselves once their gate resolves.
    pub fn is_processing(self) -> bool {
        matches!(
            self,
            Self::ProcessingChart | Self::ProcessingAccuracy | Self::ProcessingPalm
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::FullReport)
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::Landing
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Landing => "landing",
            Self::BirthDate => "birth_date",
            Self::BirthTime => "birth_time",
            Self::BirthPlace => "birth_place",
            Self::ProcessingChart => "processing_chart",
            Self::Relationship => "relationship",
            Self::Goals => "goals",
            Self::Color => "color",
            Self::Element => "element",
            Self::ProcessingAccuracy => "processing_accuracy",
            Self::PalmIntro => "palm_intro",
            Self::PalmUpload => "palm_upload",
            Self::ProcessingPalm => "processing_palm",
            Self::ResultsPreview => "results_preview",
            Self::FullReport => "full_report",
        };
        write!(f, "{s}")
    }
}

/// Move forward one step if the current step's guard holds.
///
/// A failed guard is not an error: the step comes back unchanged.
pub fn advance(current: Step, profile: &Profile) -> Step {
    if !current.guard_satisfied(profile) {
        return current;
    }
    current.next().unwrap_or(current)
}

/// Move back one step, stopping at Landing.
pub fn back(current: Step) -> Step {
    current.prev().unwrap_or(current)
}

pub fn reset() -> Step {
    Step::Landing
}

/// Header progress for a step, `round(100 * ordinal / 14)` capped at 100.
pub fn progress_percent(step: Step) -> u8 {
    let pct = (100.0 * f64::from(step.ordinal()) / f64::from(TOTAL_STEPS)).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::ProfileUpdate;

    fn complete_profile() -> Profile {
        let mut p = Profile::default();
        p.apply(ProfileUpdate::BirthDate("1990-03-21".into()));
        p.apply(ProfileUpdate::BirthPlace("Lisbon".into()));
        p.apply(ProfileUpdate::PalmImage("data:image/jpeg;base64,AAAA".into()));
        p
    }

    #[test]
    fn ordinals_follow_declaration_order() {
        for (i, step) in Step::ALL.iter().enumerate() {
            assert_eq!(step.ordinal() as usize, i);
            assert_eq!(Step::from_ordinal(i as u8), Some(*step));
        }
        assert_eq!(Step::from_ordinal(15), None);
    }

    #[test]
    fn guarded_steps_hold_without_input() {
        let empty = Profile::default();
        for step in [Step::BirthDate, Step::BirthPlace, Step::PalmUpload] {
            assert_eq!(advance(step, &empty), step, "{step} should not advance");
        }
    }

    #[test]
    fn guarded_steps_advance_with_input() {
        let p = complete_profile();
        assert_eq!(advance(Step::BirthDate, &p), Step::BirthTime);
        assert_eq!(advance(Step::BirthPlace, &p), Step::ProcessingChart);
        assert_eq!(advance(Step::PalmUpload, &p), Step::ProcessingPalm);
    }

    #[test]
    fn unguarded_steps_always_move_one() {
        let empty = Profile::default();
        for step in Step::ALL {
            if matches!(
                step,
                Step::BirthDate | Step::BirthPlace | Step::PalmUpload | Step::FullReport
            ) {
                continue;
            }
            let next = advance(step, &empty);
            assert_eq!(next.ordinal(), step.ordinal() + 1, "{step} should move one");
        }
    }

    #[test]
    fn goals_are_not_guarded_by_advance() {
        let empty = Profile::default();
        assert_eq!(advance(Step::Goals, &empty), Step::Color);
    }

    #[test]
    fn full_report_has_no_successor() {
        let p = complete_profile();
        assert_eq!(advance(Step::FullReport, &p), Step::FullReport);
        assert!(Step::FullReport.is_terminal());
    }

    #[test]
    fn advance_walks_whole_sequence() {
        let p = complete_profile();
        let mut current = Step::Landing;
        let mut visited = vec![current];
        while !current.is_terminal() {
            current = advance(current, &p);
            visited.push(current);
        }
        assert_eq!(visited, Step::ALL.to_vec());
    }

    #[test]
    fn back_stops_at_landing() {
        assert_eq!(back(Step::BirthDate), Step::Landing);
        assert_eq!(back(Step::Landing), Step::Landing);
        assert_eq!(back(back(Step::Landing)), Step::Landing);
        assert_eq!(back(Step::Relationship), Step::ProcessingChart);
    }

    #[test]
    fn header_hidden_on_bookend_screens() {
        let hidden: Vec<Step> = Step::ALL.into_iter().filter(|s| !s.shows_header()).collect();
        assert_eq!(
            hidden,
            vec![Step::Landing, Step::ResultsPreview, Step::FullReport]
        );
    }

    #[test]
    fn progress_formula() {
        assert_eq!(progress_percent(Step::Landing), 0);
        assert_eq!(progress_percent(Step::BirthDate), 7);
        assert_eq!(progress_percent(Step::ProcessingChart), 29);
        assert_eq!(progress_percent(Step::ProcessingAccuracy), 64);
        assert_eq!(progress_percent(Step::ProcessingPalm), 86);
        assert_eq!(progress_percent(Step::ResultsPreview), 93);
        assert_eq!(progress_percent(Step::FullReport), 100);
    }

    #[test]
    fn display_matches_serde() {
        for step in Step::ALL {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json, "mismatch for {step:?}");
        }
    }

    #[test]
    fn reset_is_landing() {
        assert_eq!(reset(), Step::Landing);
        assert_eq!(Step::default(), Step::Landing);
    }
}
