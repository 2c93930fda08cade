//! Drives whole quiz sessions through the public API with a mock oracle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use destiny_quiz::config::QuizConfig;
use destiny_quiz::error::GenerationError;
use destiny_quiz::oracle::ReadingOracle;
use destiny_quiz::quiz::model::{Element, FavoriteColor, Gender, Goal, RelationshipStatus};
use destiny_quiz::quiz::screen::{PENDING_PALM_SUMMARY, PENDING_SUN_SIGN};
use destiny_quiz::quiz::{
    Action, ChartReading, PalmReading, Profile, ProfileUpdate, Screen, Session, Step, ZodiacSign,
};

enum Behavior {
    Succeed,
    Fail,
    Hang,
}

/// Counts calls and answers with a chart whose sun sign is deliberately wrong.
struct MockOracle {
    behavior: Behavior,
    charts: AtomicUsize,
    palms: AtomicUsize,
}

impl MockOracle {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            charts: AtomicUsize::new(0),
            palms: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> (usize, usize) {
        (
            self.charts.load(Ordering::SeqCst),
            self.palms.load(Ordering::SeqCst),
        )
    }

    async fn behave(&self, reading: &'static str) -> Result<(), GenerationError> {
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(GenerationError::EmptyResponse { reading }),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ReadingOracle for MockOracle {
    async fn generate_chart(&self, profile: &Profile) -> Result<ChartReading, GenerationError> {
        self.charts.fetch_add(1, Ordering::SeqCst);
        self.behave("chart").await?;
        Ok(ChartReading {
            sun_sign: ZodiacSign::Scorpio,
            moon_sign: "Cancer".into(),
            ascendant: "Leo".into(),
            prediction: format!("Someone from {} thinks of you.", profile.birth_place),
            power_word: "Momentum".into(),
            lucky_color: "Indigo".into(),
            compatibility_note: "Water signs soothe you.".into(),
        })
    }

    async fn analyze_palm(&self, _image: &str) -> Result<PalmReading, GenerationError> {
        self.palms.fetch_add(1, Ordering::SeqCst);
        self.behave("palm").await?;
        Ok(PalmReading {
            love_score: 64,
            health_score: 72,
            wisdom_score: 95,
            career_score: 58,
            love_text: "Patient.".into(),
            health_text: "Resilient.".into(),
            wisdom_text: "Curious.".into(),
            career_text: "Winding.".into(),
            summary: "A thinker's hand.".into(),
            dominant_hand_prediction: "A long trip.".into(),
        })
    }
}

fn session_with(behavior: Behavior, config: QuizConfig) -> (Session, Arc<MockOracle>) {
    let oracle = MockOracle::new(behavior);
    (Session::new(config, oracle.clone()), oracle)
}

/// Answer every question up to the first processing screen.
fn answer_birth_questions(s: &mut Session) {
    assert!(s.dispatch(Action::Choose(ProfileUpdate::Gender(Gender::Female))));
    assert!(s.dispatch(Action::Set(ProfileUpdate::BirthDate("1990-03-21".into()))));
    assert!(s.dispatch(Action::Continue));
    assert!(s.dispatch(Action::Continue));
    assert!(s.dispatch(Action::Set(ProfileUpdate::BirthPlace("Lisbon".into()))));
    assert!(s.dispatch(Action::Continue));
    assert_eq!(s.step(), Step::ProcessingChart);
}

/// Everything between the chart and the palm upload.
fn answer_preferences(s: &mut Session) {
    assert_eq!(s.step(), Step::Relationship);
    assert!(s.dispatch(Action::Choose(ProfileUpdate::RelationshipStatus(
        RelationshipStatus::Single
    ))));
    assert!(s.dispatch(Action::ToggleGoal(Goal::Career)));
    assert!(s.dispatch(Action::Continue));
    assert!(s.dispatch(Action::Choose(ProfileUpdate::FavoriteColor(
        FavoriteColor::Green
    ))));
    assert!(s.dispatch(Action::Choose(ProfileUpdate::Element(Element::Water))));
    assert_eq!(s.step(), Step::ProcessingAccuracy);
}

async fn run_to_report(s: &mut Session) {
    answer_birth_questions(s);
    s.settle().await;
    answer_preferences(s);
    s.settle().await;
    assert_eq!(s.step(), Step::PalmIntro);
    assert!(s.dispatch(Action::Continue));
    assert!(s.dispatch(Action::UploadPalm("data:image/jpeg;base64,/9j/4AAQ".into())));
    assert_eq!(s.step(), Step::ProcessingPalm);
    s.settle().await;
    assert_eq!(s.step(), Step::ResultsPreview);
    assert!(s.dispatch(Action::Continue));
    assert_eq!(s.step(), Step::FullReport);
}

#[tokio::test(start_paused = true)]
async fn full_run_fills_both_slots_once() {
    let (mut s, oracle) = session_with(Behavior::Succeed, QuizConfig::default());
    run_to_report(&mut s).await;

    assert_eq!(oracle.calls(), (1, 1));
    assert!(s.results().has_chart());
    assert!(s.results().has_palm());

    let Screen::FullReport(report) = s.view().screen else {
        panic!("expected the full report");
    };
    // The mock says Scorpio; 21 March is Aries.
    assert_eq!(report.sun_sign(), "Aries");
    assert_eq!(report.moon_sign(), "Cancer");
    assert_eq!(report.prediction(), "Someone from Lisbon thinks of you.");
    assert_eq!(report.palm_summary(), "A thinker's hand.");
    assert_eq!(report.power_word(), "Momentum");
}

#[tokio::test(start_paused = true)]
async fn processing_screens_hold_for_dwell_floor() {
    let (mut s, _) = session_with(Behavior::Succeed, QuizConfig::default());
    answer_birth_questions(&mut s);

    let start = Instant::now();
    s.settle().await;
    let held = start.elapsed();
    assert!(held >= Duration::from_millis(3000), "held only {held:?}");
    assert!(held < Duration::from_millis(3100), "held {held:?}");
    assert_eq!(s.step(), Step::Relationship);
}

#[tokio::test(start_paused = true)]
async fn start_over_returns_to_landing_with_empty_slots() {
    let (mut s, _) = session_with(Behavior::Succeed, QuizConfig::default());
    run_to_report(&mut s).await;

    assert!(s.dispatch(Action::StartOver));
    assert_eq!(s.step(), Step::Landing);
    assert!(!s.results().has_chart());
    assert!(!s.results().has_palm());
    assert!(!s.gate_in_flight());
}

#[tokio::test(start_paused = true)]
async fn second_run_generates_fresh_readings() {
    // A cleared profile lets the same answers be replayed; kept goals would
    // otherwise be toggled off again.
    let config = QuizConfig {
        reset_clears_profile: true,
        ..QuizConfig::default()
    };
    let (mut s, oracle) = session_with(Behavior::Succeed, config);
    run_to_report(&mut s).await;
    s.dispatch(Action::StartOver);
    run_to_report(&mut s).await;
    assert_eq!(oracle.calls(), (2, 2));
}

#[tokio::test(start_paused = true)]
async fn backing_out_of_processing_cancels_the_gate() {
    let (mut s, oracle) = session_with(Behavior::Succeed, QuizConfig::default());
    answer_birth_questions(&mut s);
    assert!(s.dispatch(Action::Back));
    assert_eq!(s.step(), Step::BirthPlace);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(s.drain_events(), 0);
    assert_eq!(s.step(), Step::BirthPlace);
    assert!(!s.results().has_chart());

    // Re-entering starts a new gate and a new call.
    assert!(s.dispatch(Action::Continue));
    s.settle().await;
    assert_eq!(s.step(), Step::Relationship);
    assert!(s.results().has_chart());
    assert_eq!(oracle.calls().0, 2);
}

#[tokio::test(start_paused = true)]
async fn failures_substitute_fallback_by_default() {
    let (mut s, _) = session_with(Behavior::Fail, QuizConfig::default());
    run_to_report(&mut s).await;

    let chart = s.results().chart().ready().cloned().unwrap();
    let expected = ChartReading::fallback().with_sun_sign_from("1990-03-21");
    assert_eq!(chart, expected);
    assert_eq!(chart.sun_sign, ZodiacSign::Aries);
    assert_eq!(
        s.results().palm().ready().cloned().unwrap(),
        PalmReading::fallback()
    );
}

#[tokio::test(start_paused = true)]
async fn failures_leave_slots_pending_without_fallback() {
    let config = QuizConfig {
        substitute_fallback: false,
        ..QuizConfig::default()
    };
    let (mut s, oracle) = session_with(Behavior::Fail, config);
    run_to_report(&mut s).await;

    assert_eq!(oracle.calls(), (1, 1));
    assert!(!s.results().has_chart());
    assert!(!s.results().has_palm());

    let Screen::FullReport(report) = s.view().screen else {
        panic!("expected the full report");
    };
    assert_eq!(report.sun_sign(), PENDING_SUN_SIGN);
    assert_eq!(report.palm_summary(), PENDING_PALM_SUMMARY);
}

#[tokio::test(start_paused = true)]
async fn hung_generation_times_out_and_still_advances() {
    let config = QuizConfig {
        generation_timeout: Some(Duration::from_secs(10)),
        ..QuizConfig::default()
    };
    let (mut s, _) = session_with(Behavior::Hang, config);
    answer_birth_questions(&mut s);

    let start = Instant::now();
    s.settle().await;
    assert!(start.elapsed() >= Duration::from_secs(10));
    assert!(start.elapsed() < Duration::from_secs(11));
    assert_eq!(s.step(), Step::Relationship);
    assert!(!s.results().has_chart());
}

#[tokio::test(start_paused = true)]
async fn palm_upload_requires_a_photo() {
    let (mut s, oracle) = session_with(Behavior::Succeed, QuizConfig::default());
    answer_birth_questions(&mut s);
    s.settle().await;
    answer_preferences(&mut s);
    s.settle().await;
    s.dispatch(Action::Continue);
    assert_eq!(s.step(), Step::PalmUpload);

    // Continue stays disabled until a photo is stored.
    assert!(!s.dispatch(Action::Continue));
    assert_eq!(s.step(), Step::PalmUpload);
    assert_eq!(oracle.calls().1, 0);
}
