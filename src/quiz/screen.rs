//! Screen resolver: maps the current step and session data to the screen
//! to show and the operations that screen is allowed to request.
//!
//! Pure: nothing here mutates state. Screens only ever ask for `advance`,
//! `back`, a field write or (on the final report) a reset.

use super::model::{
    Element, FavoriteColor, Gender, Goal, MAX_GOALS, Profile, ProfileUpdate, RelationshipStatus,
};
use super::reading::{ChartReading, PalmReading, ReadingView, ResultCache};
use super::step::{Step, TOTAL_STEPS, progress_percent};

pub const PENDING_SUN_SIGN: &str = "Sun";
pub const PENDING_SIGN: &str = "Calculating...";
pub const PENDING_PREDICTION: &str =
    "The stars are currently aligning to generate your unique path...";
pub const PENDING_PALM_SUMMARY: &str = "Analyzing palm lines...";
pub const PENDING_POWER_WORD: &str = "DESTINY";

/// Header shown on every step except the bookends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressHeader {
    pub ordinal: u8,
    pub total: u8,
    pub percent: u8,
}

impl ProgressHeader {
    pub fn for_step(step: Step) -> Option<Self> {
        step.shows_header().then(|| Self {
            ordinal: step.ordinal(),
            total: TOTAL_STEPS,
            percent: progress_percent(step),
        })
    }
}

/// Profile fields a screen can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Gender,
    BirthDate,
    BirthTime,
    BirthPlace,
    RelationshipStatus,
    FavoriteColor,
    Element,
}

impl Field {
    /// The field an update writes. Palm photos go through `UploadPalm`
    /// instead and have no field.
    pub fn of(update: &ProfileUpdate) -> Option<Self> {
        match update {
            ProfileUpdate::Gender(_) => Some(Self::Gender),
            ProfileUpdate::BirthDate(_) => Some(Self::BirthDate),
            ProfileUpdate::BirthTime(_) => Some(Self::BirthTime),
            ProfileUpdate::BirthPlace(_) => Some(Self::BirthPlace),
            ProfileUpdate::RelationshipStatus(_) => Some(Self::RelationshipStatus),
            ProfileUpdate::FavoriteColor(_) => Some(Self::FavoriteColor),
            ProfileUpdate::Element(_) => Some(Self::Element),
            ProfileUpdate::PalmImage(_) => None,
        }
    }
}

/// An operation a screen may trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    /// Request `advance`. A disabled button still exists but does nothing.
    Continue { enabled: bool },
    Back,
    /// Free-form input that does not advance on its own.
    SetField(Field),
    /// Pick one option; writes the field and advances.
    Choose(Field),
    ToggleGoal,
    /// Store a palm photo and advance.
    UploadPalm,
    /// Reset the session to Landing.
    StartOver,
}

/// Fixed copy for a processing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingCopy {
    pub title: &'static str,
    pub subtitle: &'static str,
}

pub const CHART_COPY: ProcessingCopy = ProcessingCopy {
    title: "Mapping your birth chart...",
    subtitle: "Your chart shows a rare spark, let's discover your best match",
};

pub const ACCURACY_COPY: ProcessingCopy = ProcessingCopy {
    title: "Forecast accuracy",
    subtitle: "You're close to a big reveal! Confirm one last thing...",
};

pub const PALM_COPY: ProcessingCopy = ProcessingCopy {
    title: "Analyzing Lines...",
    subtitle: "Deciphering the unique paths of your destiny...",
};

/// The final report, with placeholder copy for slots still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullReport<'a> {
    pub chart: ReadingView<'a, ChartReading>,
    pub palm: ReadingView<'a, PalmReading>,
}

impl FullReport<'_> {
    pub fn sun_sign(&self) -> String {
        self.chart
            .ready()
            .map(|c| c.sun_sign.to_string())
            .unwrap_or_else(|| PENDING_SUN_SIGN.to_string())
    }

    pub fn moon_sign(&self) -> &str {
        self.chart.ready().map_or(PENDING_SIGN, |c| c.moon_sign.as_str())
    }

    pub fn ascendant(&self) -> &str {
        self.chart.ready().map_or(PENDING_SIGN, |c| c.ascendant.as_str())
    }

    pub fn prediction(&self) -> &str {
        self.chart
            .ready()
            .map_or(PENDING_PREDICTION, |c| c.prediction.as_str())
    }

    pub fn palm_summary(&self) -> &str {
        self.palm
            .ready()
            .map_or(PENDING_PALM_SUMMARY, |p| p.summary.as_str())
    }

    pub fn power_word(&self) -> &str {
        self.chart
            .ready()
            .map_or(PENDING_POWER_WORD, |c| c.power_word.as_str())
    }
}

/// One variant per step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen<'a> {
    Landing {
        options: &'static [Gender],
        selected: Option<Gender>,
    },
    BirthDate {
        value: &'a str,
    },
    BirthTime {
        value: Option<&'a str>,
    },
    BirthPlace {
        value: &'a str,
    },
    ProcessingChart(ProcessingCopy),
    Relationship {
        options: &'static [RelationshipStatus],
        selected: Option<RelationshipStatus>,
    },
    Goals {
        options: &'static [Goal],
        selected: &'a [Goal],
        at_cap: bool,
    },
    Color {
        options: &'static [FavoriteColor],
        selected: Option<FavoriteColor>,
    },
    Element {
        options: &'static [Element],
        selected: Option<Element>,
    },
    ProcessingAccuracy(ProcessingCopy),
    PalmIntro,
    PalmUpload {
        has_image: bool,
    },
    ProcessingPalm(ProcessingCopy),
    ResultsPreview {
        palm: ReadingView<'a, PalmReading>,
    },
    FullReport(FullReport<'a>),
}

/// Everything needed to draw the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView<'a> {
    pub step: Step,
    pub header: Option<ProgressHeader>,
    pub screen: Screen<'a>,
    pub affordances: Vec<Affordance>,
}

impl ScreenView<'_> {
    pub fn offers(&self, affordance: Affordance) -> bool {
        self.affordances.contains(&affordance)
    }

    /// Whether the Continue button is present and enabled.
    pub fn can_continue(&self) -> bool {
        self.offers(Affordance::Continue { enabled: true })
    }
}

/// Resolve the screen for `step`.
pub fn resolve<'a>(step: Step, profile: &'a Profile, results: &'a ResultCache) -> ScreenView<'a> {
    use Affordance::*;

    let (screen, mut affordances) = match step {
        Step::Landing => (
            Screen::Landing {
                options: &Gender::ALL,
                selected: profile.gender,
            },
            vec![Choose(Field::Gender)],
        ),
        Step::BirthDate => (
            Screen::BirthDate {
                value: &profile.birth_date,
            },
            vec![
                SetField(Field::BirthDate),
                Continue {
                    enabled: profile.has_birth_date(),
                },
            ],
        ),
        Step::BirthTime => (
            Screen::BirthTime {
                value: profile.birth_time.as_deref(),
            },
            vec![SetField(Field::BirthTime), Continue { enabled: true }],
        ),
        Step::BirthPlace => (
            Screen::BirthPlace {
                value: &profile.birth_place,
            },
            vec![
                SetField(Field::BirthPlace),
                Continue {
                    enabled: profile.has_birth_place(),
                },
            ],
        ),
        Step::ProcessingChart => (Screen::ProcessingChart(CHART_COPY), vec![]),
        Step::Relationship => (
            Screen::Relationship {
                options: &RelationshipStatus::ALL,
                selected: profile.relationship_status,
            },
            vec![Choose(Field::RelationshipStatus)],
        ),
        Step::Goals => (
            Screen::Goals {
                options: &Goal::ALL,
                selected: &profile.goals,
                at_cap: profile.goals.len() >= MAX_GOALS,
            },
            // Continue is only a visual gate here; `advance` does not check goals.
            vec![
                ToggleGoal,
                Continue {
                    enabled: !profile.goals.is_empty(),
                },
            ],
        ),
        Step::Color => (
            Screen::Color {
                options: &FavoriteColor::ALL,
                selected: profile.favorite_color,
            },
            vec![Choose(Field::FavoriteColor)],
        ),
        Step::Element => (
            Screen::Element {
                options: &Element::ALL,
                selected: profile.element,
            },
            vec![Choose(Field::Element)],
        ),
        Step::ProcessingAccuracy => (Screen::ProcessingAccuracy(ACCURACY_COPY), vec![]),
        Step::PalmIntro => (Screen::PalmIntro, vec![Continue { enabled: true }]),
        Step::PalmUpload => (
            Screen::PalmUpload {
                has_image: profile.has_palm_image(),
            },
            vec![
                UploadPalm,
                Continue {
                    enabled: profile.has_palm_image(),
                },
            ],
        ),
        Step::ProcessingPalm => (Screen::ProcessingPalm(PALM_COPY), vec![]),
        Step::ResultsPreview => (
            Screen::ResultsPreview {
                palm: results.palm(),
            },
            vec![Continue { enabled: true }],
        ),
        Step::FullReport => (
            Screen::FullReport(FullReport {
                chart: results.chart(),
                palm: results.palm(),
            }),
            vec![StartOver],
        ),
    };

    let header = ProgressHeader::for_step(step);
    if header.is_some() {
        affordances.push(Back);
    }

    ScreenView {
        step,
        header,
        screen,
        affordances,
    }
}
