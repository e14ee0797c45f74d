//! Session behaviour against a scripted model.
//!
//! The fake records every call in order and tracks how many image requests
//! are in flight at once, so ordering and sequencing can be asserted without
//! any network.

use sermon_card::prompts::FALLBACK_IMAGES;
use sermon_card::{
    AnalysisRequest, ExtractionError, ImageRef, ImageRequest, InlineImage, Phase, PhaseKind,
    ProviderError, SermonError, SermonModel, Session, SessionConfig, SessionError,
    SessionObserver, ViewType,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Test doubles ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Analysis,
    Image(usize),
}

struct FakeModel {
    analysis: Result<String, ProviderError>,
    /// Image indices that fail.
    failing: Vec<usize>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeModel {
    fn new(analysis: Result<String, ProviderError>) -> Arc<Self> {
        Self::failing(analysis, &[])
    }

    fn failing(analysis: Result<String, ProviderError>, failing: &[usize]) -> Arc<Self> {
        Arc::new(Self {
            analysis,
            failing: failing.to_vec(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn image_calls(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Image(i) => Some(i),
                Call::Analysis => None,
            })
            .collect()
    }
}

/// The prompt ends with `VariationID-<ms>-<index>]`.
fn prompt_index(prompt: &str) -> usize {
    prompt
        .trim_end_matches(']')
        .rsplit('-')
        .next()
        .and_then(|s| s.parse().ok())
        .expect("prompt carries a uniqueness token")
}

#[async_trait::async_trait]
impl SermonModel for FakeModel {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate_analysis(&self, _request: &AnalysisRequest) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(Call::Analysis);
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.analysis.clone()
    }

    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<Option<InlineImage>, ProviderError> {
        let index = prompt_index(&request.prompt);
        self.calls.lock().unwrap().push(Call::Image(index));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&index) {
            return Err(ProviderError::Http {
                model: "fake-image".into(),
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(Some(InlineImage {
            mime_type: "image/png".into(),
            data: format!("aW1n{index}"),
        }))
    }
}

#[derive(Default)]
struct Recorder {
    phases: Mutex<Vec<(PhaseKind, PhaseKind)>>,
    images: Mutex<Vec<(usize, bool)>>,
}

impl SessionObserver for Recorder {
    fn on_phase_change(&self, from: PhaseKind, to: PhaseKind) {
        self.phases.lock().unwrap().push((from, to));
    }

    fn on_image_complete(&self, index: usize, _total: usize, fallback: bool) {
        self.images.lock().unwrap().push((index, fallback));
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn analysis_json(prompts: usize) -> String {
    let points: Vec<_> = (0..prompts.min(3))
        .map(|i| serde_json::json!({"title": format!("Point {}", i + 1), "description": "..."}))
        .collect();
    let image_prompts: Vec<_> = (0..prompts).map(|i| format!("scene {i}")).collect();
    serde_json::json!({
        "title": "The Good Shepherd",
        "scripture": "John 10:11",
        "coreTheme": "The shepherd lays down his life for the sheep.",
        "summaryPoints": points,
        "imagePrompts": image_prompts,
        "evangelismMessage": "He knows you by name. Come and follow him.",
        "keywords": ["shepherd", "sheep", "life"]
    })
    .to_string()
}

fn sermon_text() -> String {
    "I am the good shepherd. The good shepherd lays down his life for the sheep. "
        .repeat(7)
}

fn session_with(model: Arc<FakeModel>, recorder: Option<Arc<Recorder>>) -> Session {
    let mut builder = SessionConfig::builder().model(model);
    if let Some(r) = recorder {
        builder = builder.observer(r);
    }
    Session::new(builder.build().unwrap()).unwrap()
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn short_text_never_starts_analysis() {
    let model = FakeModel::new(Ok(analysis_json(3)));
    let recorder = Arc::new(Recorder::default());
    let mut session = session_with(model.clone(), Some(recorder.clone()));

    for text in ["123456789", "   short   ", "", "\n\t\n"] {
        let err = session.submit_text(text).await.unwrap_err();
        assert!(matches!(err, SermonError::Validation(_)), "{text:?}: {err}");
        assert_eq!(session.phase_kind(), PhaseKind::Idle);
        assert!(matches!(session.error(), Some(SessionError::Validation(_))));
    }

    assert!(model.calls().is_empty(), "no remote calls for short text");
    assert!(recorder.phases.lock().unwrap().is_empty());
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn three_real_images_in_order() {
    let model = FakeModel::new(Ok(analysis_json(3)));
    let recorder = Arc::new(Recorder::default());
    let mut session = session_with(model.clone(), Some(recorder.clone()));

    let text = sermon_text();
    assert!(text.trim().chars().count() >= 500);
    let analysis = session.submit_text(&text).await.unwrap();

    let images = analysis.generated_images();
    assert_eq!(images.len(), 3);
    for (i, image) in images.iter().enumerate() {
        assert_eq!(image.src(), format!("data:image/png;base64,aW1n{i}"));
    }

    assert_eq!(session.phase_kind(), PhaseKind::Result);
    assert_eq!(
        model.calls(),
        vec![Call::Analysis, Call::Image(0), Call::Image(1), Call::Image(2)]
    );
    assert_eq!(model.max_in_flight.load(Ordering::SeqCst), 1);

    assert_eq!(
        *recorder.phases.lock().unwrap(),
        vec![
            (PhaseKind::Idle, PhaseKind::Analyzing),
            (PhaseKind::Analyzing, PhaseKind::GeneratingImages),
            (PhaseKind::GeneratingImages, PhaseKind::Result),
        ]
    );
    assert_eq!(
        *recorder.images.lock().unwrap(),
        vec![(0, false), (1, false), (2, false)]
    );
}

#[tokio::test]
async fn image_count_follows_prompt_count() {
    for (prompts, expected) in [(1, 1), (2, 2), (3, 3), (5, 3)] {
        let model = FakeModel::new(Ok(analysis_json(prompts)));
        let mut session = session_with(model.clone(), None);
        let analysis = session.submit_text(&sermon_text()).await.unwrap();
        assert_eq!(analysis.generated_images().len(), expected, "{prompts} prompts");
        assert_eq!(model.image_calls(), (0..expected).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn model_supplied_images_are_replaced_by_generated_ones() {
    let mut json: serde_json::Value = serde_json::from_str(&analysis_json(3)).unwrap();
    json["generatedImages"] = serde_json::json!(["https://model-supplied/one.png"]);
    let model = FakeModel::new(Ok(json.to_string()));
    let mut session = session_with(model.clone(), None);

    let analysis = session.submit_text(&sermon_text()).await.unwrap();

    assert_eq!(model.image_calls(), vec![0, 1, 2]);
    let srcs: Vec<_> = analysis.generated_images().iter().map(ImageRef::src).collect();
    assert_eq!(
        srcs,
        vec![
            "data:image/png;base64,aW1n0",
            "data:image/png;base64,aW1n1",
            "data:image/png;base64,aW1n2",
        ]
    );
}

// ── Image failures ───────────────────────────────────────────────────────────

#[tokio::test]
async fn all_images_fail_gives_fallback_table_in_order() {
    let model = FakeModel::failing(Ok(analysis_json(3)), &[0, 1, 2]);
    let recorder = Arc::new(Recorder::default());
    let mut session = session_with(model.clone(), Some(recorder.clone()));

    let analysis = session.submit_text(&sermon_text()).await.unwrap();
    let expected: Vec<ImageRef> = FALLBACK_IMAGES
        .iter()
        .map(|u| ImageRef::Remote(u.to_string()))
        .collect();
    assert_eq!(analysis.generated_images(), expected.as_slice());
    assert_eq!(session.phase_kind(), PhaseKind::Result);
    assert_eq!(
        *recorder.images.lock().unwrap(),
        vec![(0, true), (1, true), (2, true)]
    );
}

#[tokio::test]
async fn one_failure_keeps_positions() {
    let model = FakeModel::failing(Ok(analysis_json(3)), &[1]);
    let mut session = session_with(model.clone(), None);

    let images = session
        .submit_text(&sermon_text())
        .await
        .unwrap()
        .generated_images()
        .to_vec();
    assert!(images[0].is_inline());
    assert_eq!(images[1], ImageRef::Remote(FALLBACK_IMAGES[1].to_string()));
    assert_eq!(images[2].src(), "data:image/png;base64,aW1n2");
    assert_eq!(model.image_calls(), vec![0, 1, 2]);
}

#[tokio::test]
async fn fallback_is_the_same_every_time() {
    for _ in 0..3 {
        let model = FakeModel::failing(Ok(analysis_json(3)), &[2]);
        let mut session = session_with(model, None);
        let analysis = session.submit_text(&sermon_text()).await.unwrap();
        assert_eq!(
            analysis.image_at(2),
            Some(&ImageRef::Remote(FALLBACK_IMAGES[2].to_string()))
        );
    }
}

// ── Analyzer failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn analyzer_error_returns_to_idle_without_images() {
    let model = FakeModel::new(Err(ProviderError::Timeout {
        model: "fake".into(),
        secs: 120,
    }));
    let recorder = Arc::new(Recorder::default());
    let mut session = session_with(model.clone(), Some(recorder.clone()));

    let err = session.submit_text(&sermon_text()).await.unwrap_err();
    assert!(matches!(err, SermonError::Analysis(_)));
    assert_eq!(session.phase_kind(), PhaseKind::Idle);
    assert!(matches!(session.error(), Some(SessionError::Analysis(_))));
    assert!(session.analysis().is_none());
    assert_eq!(model.calls(), vec![Call::Analysis]);
    assert_eq!(
        *recorder.phases.lock().unwrap(),
        vec![
            (PhaseKind::Idle, PhaseKind::Analyzing),
            (PhaseKind::Analyzing, PhaseKind::Idle),
        ]
    );
}

#[tokio::test]
async fn malformed_analysis_returns_to_idle_without_images() {
    let model = FakeModel::new(Ok("{\"title\": \"only a title\"}".into()));
    let mut session = session_with(model.clone(), None);

    let err = session.submit_text(&sermon_text()).await.unwrap_err();
    assert!(matches!(err, SermonError::Analysis(_)));
    assert!(model.image_calls().is_empty());

    session.dismiss_error();
    assert!(session.error().is_none());
    assert_eq!(session.phase_kind(), PhaseKind::Idle);
}

// ── Navigation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_outside_idle_is_rejected() {
    let model = FakeModel::new(Ok(analysis_json(3)));
    let mut session = session_with(model.clone(), None);
    session.submit_text(&sermon_text()).await.unwrap();

    let err = session.submit_text(&sermon_text()).await.unwrap_err();
    assert!(matches!(
        err,
        SermonError::InvalidState {
            phase: PhaseKind::Result,
            ..
        }
    ));
    assert_eq!(session.phase_kind(), PhaseKind::Result);
    assert_eq!(model.image_calls().len(), 3, "second submit made no calls");
}

#[tokio::test]
async fn view_toggle_is_non_destructive_and_go_home_resets() {
    let model = FakeModel::new(Ok(analysis_json(3)));
    let mut session = session_with(model.clone(), None);
    session.submit_text(&sermon_text()).await.unwrap();

    let card = session.render().unwrap();
    session.set_view(ViewType::Infographic);
    let infographic = session.render().unwrap();
    assert_ne!(card, infographic);
    session.set_view(ViewType::SummaryCard);
    assert_eq!(session.render().unwrap(), card);
    assert_eq!(model.calls().len(), 4, "toggling never calls the model");

    session.go_home();
    assert!(matches!(session.phase(), Phase::Idle { error: None }));
    assert!(session.analysis().is_none());
    assert!(session.render().is_none());

    session.submit_text(&sermon_text()).await.unwrap();
    assert_eq!(session.phase_kind(), PhaseKind::Result);
}

// ── Uploads ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn non_pdf_upload_is_rejected_without_state_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.docx");
    std::fs::write(&path, b"not a pdf").unwrap();

    let model = FakeModel::new(Ok(analysis_json(3)));
    let mut session = session_with(model.clone(), None);

    let err = session
        .submit_pdf(path.to_str().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SermonError::Extraction(ExtractionError::NotAPdf { .. })
    ));
    assert_eq!(session.phase_kind(), PhaseKind::Idle);
    assert!(session.error().is_none(), "upload errors are not banners");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn missing_pdf_is_reported() {
    let model = FakeModel::new(Ok(analysis_json(3)));
    let mut session = session_with(model, None);
    let err = session
        .submit_pdf("/no/such/dir/sermon.PDF")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SermonError::Extraction(ExtractionError::FileNotFound { .. })
    ));
}
