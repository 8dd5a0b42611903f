use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResponse;

/// Replays scripted responses in order and records every request it sees.
/// Running out of scripted responses is reported as a transport failure.
#[derive(Default)]
pub struct MockBackend {
    responses: Mutex<VecDeque<Result<GenerationResponse>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockBackend {
    pub fn new(responses: Vec<Result<GenerationResponse>>) -> MockBackend {
        return MockBackend {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(vec![]),
        };
    }

    pub fn push(&self, response: Result<GenerationResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        return self.requests.lock().unwrap().clone();
    }

    pub fn last_request(&self) -> GenerationRequest {
        return self.requests.lock().unwrap().last().unwrap().clone();
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        return Ok(vec!["mock-model".to_string()]);
    }

    #[allow(clippy::implicit_return)]
    async fn generate_content(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        self.requests.lock().unwrap().push(request);

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(res) => return res,
            None => bail!("Mock backend connection refused"),
        }
    }
}
