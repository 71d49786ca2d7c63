use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use quiz_core::Clock;
use quiz_core::collect::InputSignal;
use quiz_core::model::{Milestone, Question};
use quiz_core::time::{fixed_clock, fixed_now};
use services::{
    NoTransition, NullTelemetry, SceneTransition, SessionConfig, SessionController, SessionPhase,
    StagePresenter, SubmitReport, TelemetryEmitter, TelemetryError, TelemetryEvent, TelemetryKind,
};
use storage::repository::{InMemoryProfile, ProfileRepository};

//
// ─── FAKES ────────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct RecordingPresenter {
    calls: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl StagePresenter for RecordingPresenter {
    fn learner_position(&self) -> Option<f32> {
        Some(0.0)
    }
    fn target_position(&self) -> Option<f32> {
        Some(8.0)
    }
    fn move_learner(&self, x: f32) {
        self.record(format!("move:{x:.1}"));
    }
    fn show_learner_speech(&self, text: &str) {
        self.record(format!("learner:{text}"));
    }
    fn show_target_speech(&self, text: &str) {
        self.record(format!("target:{text}"));
    }
    fn clear_speech(&self) {
        self.record("clear");
    }
    fn show_notice(&self, signal: &InputSignal) {
        self.record(format!("notice:{}", signal.message));
    }
    fn show_progress(&self, value: f32, message: &str) {
        self.record(format!("progress:{value:.0}:{message}"));
    }
}

/// Presenter with no stage widgets wired up.
struct UnwiredPresenter;

impl StagePresenter for UnwiredPresenter {
    fn learner_position(&self) -> Option<f32> {
        None
    }
    fn target_position(&self) -> Option<f32> {
        Some(8.0)
    }
    fn move_learner(&self, _x: f32) {}
    fn show_learner_speech(&self, _text: &str) {}
    fn show_target_speech(&self, _text: &str) {}
    fn clear_speech(&self) {}
    fn show_notice(&self, _signal: &InputSignal) {}
    fn show_progress(&self, _value: f32, _message: &str) {}
}

#[derive(Default)]
struct CountingScene {
    invocations: AtomicUsize,
    last_score: AtomicUsize,
}

impl SceneTransition for CountingScene {
    fn begin(&self, final_score: u8) {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.last_score
            .store(usize::from(final_score), Ordering::SeqCst);
    }
}

#[derive(Default)]
struct CapturingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

#[async_trait]
impl TelemetryEmitter for CapturingTelemetry {
    async fn emit(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Give spawned fire-and-forget telemetry tasks a chance to run.
async fn drain_spawned_tasks() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}

//
// ─── FLOWS ────────────────────────────────────────────────────────────────────
//

#[tokio::test]
async fn choice_set_flow_scores_and_applies_fail_delta() {
    let presenter = Arc::new(RecordingPresenter::default());
    let question =
        Question::choice_set("Which are languages?", owned(&["python", "java"]), 70.0).unwrap();
    let mut controller = SessionController::start(
        question,
        owned(&["Python", "Excel", "Java"]),
        SessionConfig::instant(),
        Clock::default_clock(),
        presenter.clone(),
        Arc::new(NullTelemetry),
        Arc::new(NoTransition),
        Arc::new(InMemoryProfile::new()),
    )
    .await;

    // Submitting with nothing selected never reaches the scoring engine.
    let report = controller.submit().await;
    assert!(matches!(report, SubmitReport::Rejected(_)));
    assert!(controller.progress().abs() < f32::EPSILON);

    controller.toggle_choice(0);
    controller.toggle_choice(1);
    controller.toggle_choice(2);
    let report = controller.submit().await;

    let SubmitReport::Evaluated(outcome) = report else {
        panic!("expected evaluated attempt, got {report:?}");
    };
    assert!((outcome.score.score_percentage - 200.0 / 3.0).abs() < 0.01);
    assert!(!outcome.score.passed);
    assert!((outcome.progress - 10.0).abs() < f32::EPSILON);
    assert_eq!(outcome.milestone, Milestone::Begin);
    assert_eq!(controller.phase(), SessionPhase::Collecting);

    let calls = presenter.calls();
    let position = |needle: &str| {
        calls
            .iter()
            .position(|c| c == needle)
            .unwrap_or_else(|| panic!("missing {needle:?} in {calls:?}"))
    };
    let learner = position("learner:Python, Excel, Java");
    let think = position("target:...");
    let verdict = position("target:Not quite. You scored 67%.");
    assert!(learner < think && think < verdict, "order was {calls:?}");
}

#[tokio::test]
async fn free_text_auto_submits_at_capacity() {
    let presenter = Arc::new(RecordingPresenter::default());
    let question = Question::free_text(
        "Name programming languages",
        owned(&["python", "java"]),
        3,
        3,
        false,
        70.0,
    )
    .unwrap();
    let mut controller = SessionController::start(
        question,
        Vec::new(),
        SessionConfig::instant(),
        Clock::default_clock(),
        presenter,
        Arc::new(NullTelemetry),
        Arc::new(NoTransition),
        Arc::new(InMemoryProfile::new()),
    )
    .await;

    assert_eq!(controller.enter_text("python").await, SubmitReport::Pending);
    assert_eq!(controller.enter_text("java").await, SubmitReport::Pending);

    // The third entry fills the attempt: evaluation happens with no explicit
    // submit call.
    let report = controller.enter_text("ruby").await;
    let SubmitReport::Evaluated(outcome) = report else {
        panic!("expected auto-submitted attempt, got {report:?}");
    };
    assert!((outcome.score.score_percentage - 200.0 / 3.0).abs() < 0.01);
    assert!(!outcome.score.passed);
    assert!((outcome.progress - 10.0).abs() < f32::EPSILON);

    // Attempt state was cleared for the next round.
    assert!(controller.collector().submitted().is_empty());
}

#[tokio::test]
async fn free_text_duplicate_rejection_leaves_count_unchanged() {
    let question = Question::free_text(
        "Name programming languages",
        owned(&["go"]),
        1,
        5,
        false,
        70.0,
    )
    .unwrap();
    let mut controller = SessionController::start(
        question,
        Vec::new(),
        SessionConfig::instant(),
        Clock::default_clock(),
        Arc::new(RecordingPresenter::default()),
        Arc::new(NullTelemetry),
        Arc::new(NoTransition),
        Arc::new(InMemoryProfile::new()),
    )
    .await;

    controller.enter_text("Go").await;
    let report = controller.enter_text("go").await;

    assert!(matches!(report, SubmitReport::Rejected(_)));
    assert_eq!(controller.collector().submitted(), ["Go"].as_slice());
}

#[tokio::test]
async fn placement_pass_applies_pass_delta() {
    let question = Question::placement("Place the operation", owned(&["addition"])).unwrap();
    let mut controller = SessionController::start(
        question,
        owned(&["addition", "subtraction"]),
        SessionConfig::instant(),
        Clock::default_clock(),
        Arc::new(RecordingPresenter::default()),
        Arc::new(NullTelemetry),
        Arc::new(NoTransition),
        Arc::new(InMemoryProfile::new()),
    )
    .await;

    let report = controller.place_item(0).await;
    let SubmitReport::Evaluated(outcome) = report else {
        panic!("expected evaluated placement, got {report:?}");
    };
    assert!((outcome.score.score_percentage - 100.0).abs() < f32::EPSILON);
    assert!(outcome.score.passed);
    assert!((outcome.progress - 25.0).abs() < f32::EPSILON);
    assert_eq!(outcome.milestone, Milestone::Started);
}

#[tokio::test]
async fn completion_transitions_once_and_persists_profile() {
    let scene = Arc::new(CountingScene::default());
    let profile = Arc::new(InMemoryProfile::new());
    let question = Question::placement("Place the operation", owned(&["addition"])).unwrap();
    let mut config = SessionConfig::instant();
    config.clear_answers_after_attempt = true;

    let mut controller = SessionController::start(
        question,
        owned(&["addition"]),
        config,
        fixed_clock(),
        Arc::new(RecordingPresenter::default()),
        Arc::new(NullTelemetry),
        scene.clone(),
        profile.clone(),
    )
    .await;

    // Four passes at +25 each reach the completion threshold.
    for _ in 0..3 {
        let report = controller.place_item(0).await;
        assert!(matches!(report, SubmitReport::Evaluated(_)));
    }
    assert_eq!(controller.phase(), SessionPhase::Collecting);

    let report = controller.place_item(0).await;
    let SubmitReport::Evaluated(outcome) = report else {
        panic!("expected final attempt, got {report:?}");
    };
    assert!(outcome.completed);
    assert!((outcome.progress - 100.0).abs() < f32::EPSILON);
    assert_eq!(controller.phase(), SessionPhase::Transitioning);

    // The transition fired exactly once with the final score.
    assert_eq!(scene.invocations.load(Ordering::SeqCst), 1);
    assert_eq!(scene.last_score.load(Ordering::SeqCst), 100);

    // Further input is backpressured, not queued; nothing fires twice.
    let report = controller.place_item(0).await;
    assert!(matches!(report, SubmitReport::Rejected(_)));
    assert_eq!(scene.invocations.load(Ordering::SeqCst), 1);

    assert_eq!(profile.last_score().await.unwrap(), Some(100));
    assert_eq!(profile.last_played_at().await.unwrap(), Some(fixed_now()));
}

#[tokio::test]
async fn start_restores_persisted_profile_values() {
    let profile = Arc::new(InMemoryProfile::new());
    profile.set_last_score(64).await.unwrap();
    profile.set_last_played_at(fixed_now()).await.unwrap();

    let question = Question::placement("Place the operation", owned(&["addition"])).unwrap();
    let controller = SessionController::start(
        question,
        owned(&["addition"]),
        SessionConfig::instant(),
        Clock::default_clock(),
        Arc::new(RecordingPresenter::default()),
        Arc::new(NullTelemetry),
        Arc::new(NoTransition),
        profile,
    )
    .await;

    assert_eq!(controller.previous_score(), Some(64));
    assert_eq!(controller.previously_played_at(), Some(fixed_now()));
}

#[tokio::test]
async fn scene_transition_carries_the_closing_attempt_score() {
    let scene = Arc::new(CountingScene::default());
    let profile = Arc::new(InMemoryProfile::new());
    // One passing attempt completes the session, but with a partial score:
    // two of three selections are canonical.
    let question =
        Question::choice_set("Which are languages?", owned(&["python", "java"]), 50.0).unwrap();
    let mut config = SessionConfig::instant();
    config.pass_delta = 100.0;

    let mut controller = SessionController::start(
        question,
        owned(&["Python", "Excel", "Java"]),
        config,
        Clock::default_clock(),
        Arc::new(RecordingPresenter::default()),
        Arc::new(NullTelemetry),
        scene.clone(),
        profile.clone(),
    )
    .await;

    controller.toggle_choice(0);
    controller.toggle_choice(1);
    controller.toggle_choice(2);
    let report = controller.submit().await;

    let SubmitReport::Evaluated(outcome) = report else {
        panic!("expected evaluated attempt, got {report:?}");
    };
    assert!(outcome.completed);
    assert!((outcome.progress - 100.0).abs() < f32::EPSILON);

    // The transition and the profile carry the attempt's 67%, not the capped
    // progress value.
    assert_eq!(scene.invocations.load(Ordering::SeqCst), 1);
    assert_eq!(scene.last_score.load(Ordering::SeqCst), 67);
    assert_eq!(profile.last_score().await.unwrap(), Some(67));
}

#[tokio::test]
async fn missing_wiring_skips_the_sequence_without_progress() {
    let question = Question::placement("Place the operation", owned(&["addition"])).unwrap();
    let mut controller = SessionController::start(
        question,
        owned(&["addition"]),
        SessionConfig::instant(),
        Clock::default_clock(),
        Arc::new(UnwiredPresenter),
        Arc::new(NullTelemetry),
        Arc::new(NoTransition),
        Arc::new(InMemoryProfile::new()),
    )
    .await;

    let report = controller.place_item(0).await;

    assert_eq!(report, SubmitReport::Ignored);
    assert!(controller.progress().abs() < f32::EPSILON);
    assert_eq!(controller.phase(), SessionPhase::Collecting);
}

#[tokio::test]
async fn telemetry_reports_each_transition_point() {
    let telemetry = Arc::new(CapturingTelemetry::default());
    let question = Question::placement("Place the operation", owned(&["addition"])).unwrap();
    let mut controller = SessionController::start(
        question,
        owned(&["addition"]),
        SessionConfig::instant(),
        fixed_clock(),
        Arc::new(RecordingPresenter::default()),
        telemetry.clone(),
        Arc::new(NoTransition),
        Arc::new(InMemoryProfile::new()),
    )
    .await;

    for _ in 0..4 {
        controller.place_item(0).await;
    }
    drain_spawned_tasks().await;

    let events = telemetry.events.lock().unwrap();
    let session = controller.session_id();
    assert!(events.iter().all(|event| event.session == session));
    assert!(events.iter().all(|event| event.at == fixed_now()));

    let count = |kind: TelemetryKind| events.iter().filter(|e| e.kind == kind).count();
    assert_eq!(count(TelemetryKind::SubmissionEvaluated), 4);
    assert_eq!(count(TelemetryKind::ProgressUpdated), 4);
    assert_eq!(count(TelemetryKind::SessionCompleted), 1);
}
