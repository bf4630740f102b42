// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fakes for orchestrator and gateway tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use sketchcast::diffusion::{Capabilities, PriorExchange, ProviderAdapter, ProviderError};
use sketchcast::vision::{Prediction, SketchDescriber, SketchImage};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TINY_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{}", TINY_PNG_BASE64)
}

pub fn sketch() -> SketchImage {
    SketchImage::parse(&png_data_uri()).unwrap()
}

pub const BOTH: Capabilities = Capabilities {
    text_to_image: true,
    image_to_image: true,
};

pub const IMAGE_ONLY: Capabilities = Capabilities {
    text_to_image: false,
    image_to_image: true,
};

#[derive(Debug, Clone)]
pub enum Behaviour {
    Succeed(String),
    Fail(String),
    /// Never settles; flips the drop flag when the task is torn down
    Hang,
    Panic,
    /// Succeeds with the url after the delay
    Delay(Duration, String),
}

/// Records provider ids in call order across several fakes
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub struct FakeProvider {
    id: String,
    capabilities: Capabilities,
    behaviour: Behaviour,
    calls: AtomicU32,
    log: CallLog,
    last_prompt: Mutex<Option<String>>,
    last_seed: AtomicBool,
    dropped: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl FakeProvider {
    pub fn new(id: &str, behaviour: Behaviour, log: &CallLog) -> Arc<Self> {
        Self::with_capabilities(id, behaviour, BOTH, log)
    }

    pub fn with_capabilities(
        id: &str,
        behaviour: Behaviour,
        capabilities: Capabilities,
        log: &CallLog,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            capabilities,
            behaviour,
            calls: AtomicU32::new(0),
            log: Arc::clone(log),
            last_prompt: Mutex::new(None),
            last_seed: AtomicBool::new(false),
            dropped: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub fn saw_seed(&self) -> bool {
        self.last_seed.load(Ordering::SeqCst)
    }

    /// True once a hanging call has been torn down
    pub fn hang_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for FakeProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn generate(
        &self,
        prompt: &str,
        seed: Option<&SketchImage>,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(self.id.clone());
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.last_seed.store(seed.is_some(), Ordering::SeqCst);

        match &self.behaviour {
            Behaviour::Succeed(url) => Ok(url.clone()),
            Behaviour::Fail(body) => Err(ProviderError::Rejected {
                provider: self.id.clone(),
                status: 500,
                body: body.clone(),
            }),
            Behaviour::Hang => {
                let _guard = DropFlag(Arc::clone(&self.dropped));
                std::future::pending::<()>().await;
                unreachable!()
            }
            Behaviour::Panic => panic!("{} blew up", self.id),
            Behaviour::Delay(delay, url) => {
                tokio::time::sleep(*delay).await;
                Ok(url.clone())
            }
        }
    }
}

pub fn as_adapters(providers: &[&Arc<FakeProvider>]) -> Vec<Arc<dyn ProviderAdapter>> {
    providers
        .iter()
        .map(|p| Arc::clone(*p) as Arc<dyn ProviderAdapter>)
        .collect()
}

/// Describer with canned answers
pub struct FakeDescriber {
    description: String,
    prediction: Prediction,
    describe_calls: AtomicU32,
    last_context: Mutex<Option<PriorExchange>>,
    last_previous_guess: Mutex<Option<String>>,
}

impl FakeDescriber {
    pub fn new(description: &str) -> Arc<Self> {
        Self::with_prediction(description, Prediction::fallback())
    }

    pub fn with_prediction(description: &str, prediction: Prediction) -> Arc<Self> {
        Arc::new(Self {
            description: description.to_string(),
            prediction,
            describe_calls: AtomicU32::new(0),
            last_context: Mutex::new(None),
            last_previous_guess: Mutex::new(None),
        })
    }

    pub fn describe_calls(&self) -> u32 {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn last_context(&self) -> Option<PriorExchange> {
        self.last_context.lock().unwrap().clone()
    }

    pub fn last_previous_guess(&self) -> Option<String> {
        self.last_previous_guess.lock().unwrap().clone()
    }
}

#[async_trait]
impl SketchDescriber for FakeDescriber {
    async fn describe(&self, _image: &SketchImage, context: Option<&PriorExchange>) -> String {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = context.cloned();
        self.description.clone()
    }

    async fn predict(
        &self,
        _image: &SketchImage,
        previous_guess: Option<&str>,
        _previous_answer: Option<&str>,
    ) -> Prediction {
        *self.last_previous_guess.lock().unwrap() = previous_guess.map(str::to_string);
        self.prediction.clone()
    }
}

/// Serve `router` on an ephemeral port and return its base URL
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
