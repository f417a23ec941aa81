//! End-to-end conversation through the public API: registration, then a
//! question answered by a fake completion endpoint.

use std::sync::{Arc, Mutex};

use ads_assistant::assistant::texts;
use ads_assistant::assistant::{AiClient, AssistantEngine, Database, Outbox, Reply};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Default)]
struct Transcript(Arc<Mutex<Vec<(i64, Reply)>>>);

impl Outbox for Transcript {
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<(), String> {
        self.0.lock().unwrap().push((chat_id, reply));
        Ok(())
    }
}

impl Transcript {
    fn drain(&self) -> Vec<String> {
        self.0.lock().unwrap().drain(..).map(|(_, r)| r.text).collect()
    }
}

#[tokio::test]
async fn test_register_then_ask() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("assistente_ads.db");
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": texts::SYSTEM_PROMPT },
                { "role": "user", "content": "o que é normalização?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "É organizar dados em tabelas sem redundância." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transcript = Transcript::default();
    let engine = AssistantEngine::new(
        Database::open(&db_path).unwrap(),
        AiClient::new(
            "sk-test".to_string(),
            format!("{}/api/v1/chat/completions", server.uri()),
            "deepseek/deepseek-chat".to_string(),
        ),
        transcript.clone(),
    );
    let chat_id = 777;

    engine.handle_message(chat_id, "/start").await;
    assert_eq!(transcript.drain().last().map(String::as_str), Some(texts::ASK_NAME));

    engine.handle_message(chat_id, "Maria").await;
    assert_eq!(transcript.drain(), vec![texts::ask_academic_id("Maria")]);

    engine.handle_message(chat_id, "RA12345").await;
    assert_eq!(transcript.drain()[0], texts::REGISTERED);

    // Read back through a fresh handle on the same file.
    let user = Database::open(&db_path).unwrap().get_user(chat_id).unwrap().unwrap();
    assert_eq!(user.name, "Maria");
    assert_eq!(user.academic_id, "RA12345");

    engine.handle_message(chat_id, "o que é normalização?").await;
    assert_eq!(
        transcript.drain(),
        vec![
            texts::THINKING.to_string(),
            "É organizar dados em tabelas sem redundância.".to_string(),
            texts::FOLLOW_UP.to_string(),
        ]
    );
}
