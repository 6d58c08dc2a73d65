//! Model binding, generation, and the full generate-then-normalize round
//! trip, exercised against an in-process mock of the Gemini REST API.

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    body::Body,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};

use playlens::gemini::analysis::{analyze_playlist, get_song_recommendations};
use playlens::gemini::client::{FALLBACK_REPLY, GeminiModel, GenerationOptions};
use playlens::gemini::normalize::Normalized;
use playlens::types::{NOT_SPECIFIED, PlaylistAnalysis, Track};

static ANALYSIS_CALLS: AtomicUsize = AtomicUsize::new(0);

fn reply(text: &str) -> Json<Value> {
    Json(json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    }))
}

async fn generate(Path(action): Path<String>, Json(body): Json<Value>) -> Response {
    // Path segment looks like "<model>:generateContent"
    let model = action.split(':').next().unwrap_or_default().to_string();
    if model.starts_with("bad") {
        return Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from("{\"error\": \"model overloaded\"}"))
            .unwrap();
    }

    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    let text = if prompt == "Hello" {
        "Hi there".to_string()
    } else if prompt.contains("Analyze the following playlist") {
        // First reply is garbage to exercise the round-trip retry
        if ANALYSIS_CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
            "I could not find anything useful to say.".to_string()
        } else {
            "Here is the analysis:\n```json\n{\"general_description\": \"Synth-heavy 80s pop\", \
             \"bpm_range\": {\"min\": 100, \"most_common\": 118, \"max\": 135}, \
             \"instruments\": {\"Synth\": \"high\"}, \
             \"key_distribution\": {\"A Minor\": 4}, \
             \"mood_description\": \"nostalgic\", \
             \"genre_analysis\": \"synth-pop\"}\n```"
                .to_string()
        }
    } else if prompt.contains("Recommend 3 songs") {
        // Missing comma between the object literals, wrapped in prose
        "Sure:\n[{\"title\":\"A\",\"artist\":\"X\"}{\"title\":\"B\"}]".to_string()
    } else {
        "{}".to_string()
    };

    reply(&text).into_response()
}

async fn start_mock_gemini() -> String {
    let app = Router::new().route("/models/{action}", post(generate));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn make_tracks() -> Vec<Track> {
    (0..5)
        .map(|i| Track {
            id: format!("id{}", i),
            name: format!("Song {}", i),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            duration_ms: 210_000,
            popularity: 55,
            release_date: Some("1985-01-01".to_string()),
        })
        .collect()
}

#[tokio::test]
async fn test_model_binding_and_round_trips() {
    let base = start_mock_gemini().await;

    unsafe {
        std::env::set_var("GEMINI_API_URL", &base);
        std::env::set_var("GEMINI_API_KEY", "test-key");
        std::env::set_var("GEMINI_MODELS", "bad-model,good-model");
    }

    // The first candidate fails its probe, the second is bound
    let model = GeminiModel::setup().await;
    assert!(!model.is_fallback());

    let greeting = model
        .generate("Hello", &GenerationOptions::analysis())
        .await
        .unwrap();
    assert_eq!(greeting, "Hi there");

    // Analysis round trip: the first (malformed) reply is retried, the
    // second parses into a validated record
    let tracks = make_tracks();
    let analysis = analyze_playlist(&model, &tracks, None).await;
    assert!(!analysis.is_fallback());
    let analysis = analysis.into_inner();
    assert_eq!(analysis.general_description, "Synth-heavy 80s pop");
    assert_eq!(analysis.bpm_range.most_common, 118.0);
    assert_eq!(analysis.key_distribution["A Minor"], 4);
    assert!(ANALYSIS_CALLS.load(Ordering::SeqCst) >= 2);

    // Recommendation round trip survives the missing-comma reply
    let recommendations = get_song_recommendations(&model, &analysis, None).await;
    assert!(!recommendations.is_fallback());
    let recommendations = recommendations.into_inner();
    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0].title, "A");
    assert_eq!(recommendations[0].artist, "X");
    assert_eq!(recommendations[1].artist, NOT_SPECIFIED);

    // With no responsive candidate the binding degrades to the stub
    unsafe {
        std::env::set_var("GEMINI_MODELS", "bad-one,bad-two");
    }
    let stub = GeminiModel::setup().await;
    assert!(stub.is_fallback());
    let text = stub
        .generate("anything", &GenerationOptions::analysis())
        .await
        .unwrap();
    assert_eq!(text, FALLBACK_REPLY);

    // The stub degrades the analysis to the hardcoded default
    let degraded = analyze_playlist(&stub, &tracks, None).await;
    assert!(degraded.is_fallback());
    assert_eq!(*degraded.value(), PlaylistAnalysis::default());

    // Offline recommendations follow the keyword heuristics
    let mut bollywood = PlaylistAnalysis::default();
    bollywood.genre_analysis = "Classic Bollywood film music".to_string();
    let offline = get_song_recommendations(&stub, &bollywood, None).await;
    assert!(offline.is_fallback());
    let offline = offline.into_inner();
    assert_eq!(offline.len(), 3);
    assert!(offline.iter().any(|r| r.artist == "Arijit Singh"));

    let generic = get_song_recommendations(&stub, &PlaylistAnalysis::default(), None).await;
    assert!(matches!(generic, Normalized::Fallback(_)));
    assert_eq!(generic.into_inner().len(), 3);
}
