use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::model_path;
use super::CompletionRequest;
use super::GenerateContentResponse;
use super::Gemini;
use super::Model;
use super::ModelListResponse;
use crate::domain::models::Backend;
use crate::domain::models::Content;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResponse;
use crate::domain::models::ImagePayload;
use crate::domain::models::Modality;
use crate::domain::models::Part;
use crate::domain::models::Role;

impl Gemini {
    fn with_url(url: String) -> Gemini {
        return Gemini {
            client: reqwest::Client::new(),
            url,
            token: "abc".to_string(),
            model: "model-1".to_string(),
            timeout: "200".to_string(),
        };
    }
}

#[test]
fn it_normalizes_model_paths() {
    assert_eq!(model_path("gemini-2.5-flash"), "models/gemini-2.5-flash");
    assert_eq!(
        model_path("models/gemini-2.5-flash"),
        "models/gemini-2.5-flash"
    );
}

#[test]
fn it_serializes_multimodal_requests() -> Result<()> {
    let mut request = GenerationRequest::new("model-1");
    request.contents = vec![Content {
        role: Role::User,
        parts: vec![
            Part::from(&ImagePayload::new(vec![0, 1, 2], "image/png")),
            Part::Text("Tell me a story".to_string()),
        ],
    }];

    let body = serde_json::to_value(CompletionRequest::from(&request))?;
    assert_eq!(
        body,
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "AAEC" } },
                    { "text": "Tell me a story" }
                ]
            }]
        })
    );

    return Ok(());
}

#[test]
fn it_serializes_speech_requests() -> Result<()> {
    let mut request = GenerationRequest::new("tts-1");
    request.contents = vec![Content::text(Role::User, "A quiet morning.")];
    request.response_modalities = vec![Modality::Audio];
    request.voice = Some("Kore".to_string());

    let body = serde_json::to_value(CompletionRequest::from(&request))?;
    assert_eq!(
        body,
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": "A quiet morning." }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Kore" } }
                }
            }
        })
    );

    return Ok(());
}

#[test]
fn it_serializes_system_instructions() -> Result<()> {
    let mut request = GenerationRequest::new("chat-1");
    request.contents = vec![Content::text(Role::User, "Hi")];
    request.system_instruction = Some("Be kind".to_string());

    let body = serde_json::to_value(CompletionRequest::from(&request))?;
    assert_eq!(
        body["systemInstruction"],
        json!({ "parts": [{ "text": "Be kind" }] })
    );
    assert!(body.get("generationConfig").is_none());

    return Ok(());
}

#[test]
fn it_reads_text_from_the_first_candidate() -> Result<()> {
    let res: GenerateContentResponse = serde_json::from_value(json!({
        "candidates": [
            {
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Hello ", "thoughtSignature": "xyz" },
                        { "text": "World" }
                    ]
                },
                "finishReason": "STOP"
            },
            { "content": { "parts": [{ "text": "ignored" }] } }
        ],
        "usageMetadata": { "totalTokenCount": 3 }
    }))?;

    let response = GenerationResponse::from(res);
    assert_eq!(response.text, Some("Hello World".to_string()));
    assert_eq!(response.audio, None);

    return Ok(());
}

#[test]
fn it_reads_inline_audio() -> Result<()> {
    let res: GenerateContentResponse = serde_json::from_value(json!({
        "candidates": [{
            "content": {
                "parts": [{
                    "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAA=" }
                }]
            }
        }]
    }))?;

    let response = GenerationResponse::from(res);
    assert_eq!(response.text, None);
    let audio = response.audio.unwrap();
    assert_eq!(audio.mime_type, "audio/L16;codec=pcm;rate=24000");
    assert_eq!(audio.data, "AAA=");

    return Ok(());
}

#[test]
fn it_treats_empty_responses_as_missing_data() -> Result<()> {
    let res: GenerateContentResponse = serde_json::from_value(json!({}))?;
    assert_eq!(GenerationResponse::from(res), GenerationResponse::default());

    let res: GenerateContentResponse =
        serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))?;
    assert_eq!(GenerationResponse::from(res), GenerationResponse::default());

    return Ok(());
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1beta/models/model-1")
        .match_header("x-goog-api-key", "abc")
        .with_status(200)
        .create_async()
        .await;

    let backend = Gemini::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_successfully_health_checks_with_official_api() {
    let token = match std::env::var("STORYLOOM_API_KEY") {
        Ok(token) => token,
        Err(_) => {
            println!("There is no token in environment defined, skipping test");
            return;
        }
    };
    let backend = Gemini {
        client: reqwest::Client::new(),
        url: "https://generativelanguage.googleapis.com".to_string(),
        token,
        model: "gemini-2.5-flash".to_string(),
        timeout: "2000".to_string(),
    };

    let res = backend.health_check().await;
    assert!(res.is_ok());
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1beta/models/model-1")
        .with_status(500)
        .create_async()
        .await;

    let backend = Gemini::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_health_checks_without_a_token() {
    let mut backend = Gemini::with_url("http://localhost".to_string());
    backend.token = "".to_string();

    let res = backend.health_check().await;
    assert!(res.is_err());
}

#[tokio::test]
async fn it_lists_models() -> Result<()> {
    let body = serde_json::to_string(&ModelListResponse {
        models: vec![
            Model {
                name: "models/second".to_string(),
                supported_generation_methods: vec!["generateContent".to_string()],
            },
            Model {
                name: "models/embedder".to_string(),
                supported_generation_methods: vec!["embedContent".to_string()],
            },
            Model {
                name: "models/first".to_string(),
                supported_generation_methods: vec![
                    "countTokens".to_string(),
                    "generateContent".to_string(),
                ],
            },
        ],
    })?;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1beta/models")
        .match_header("x-goog-api-key", "abc")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let backend = Gemini::with_url(server.url());
    let res = backend.list_models().await?;
    mock.assert_async().await;

    assert_eq!(res, vec!["first".to_string(), "second".to_string()]);

    return Ok(());
}

#[tokio::test]
async fn it_generates_content() -> Result<()> {
    let body = json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "The fog rolled in." }] }
        }]
    })
    .to_string();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent")
        .match_header("x-goog-api-key", "abc")
        .match_body(Matcher::PartialJson(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Begin" }] }]
        })))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let mut request = GenerationRequest::new("model-1");
    request.contents = vec![Content::text(Role::User, "Begin")];

    let backend = Gemini::with_url(server.url());
    let res = backend.generate_content(request).await?;
    mock.assert_async().await;

    assert_eq!(res.text, Some("The fog rolled in.".to_string()));

    return Ok(());
}

#[tokio::test]
async fn it_fails_on_unsuccessful_generation() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent")
        .with_status(503)
        .with_body("{\"error\":{\"code\":503}}")
        .create_async()
        .await;

    let mut request = GenerationRequest::new("model-1");
    request.contents = vec![Content::text(Role::User, "Begin")];

    let backend = Gemini::with_url(server.url());
    let res = backend.generate_content(request).await;
    mock.assert_async().await;

    assert!(res.is_err());
    assert!(res.unwrap_err().to_string().contains("503"));
}
