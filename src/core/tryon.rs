use crate::core::image_loader::load_image;
use crate::core::interpreter::interpret;
use crate::core::prompt::TRY_ON_PROMPT;
use crate::core::{
    AssetPath, AssetStore, ImageModel, ImageReference, ModelRequest, TryOnPayload, TryOnRequest,
};
use crate::utils::error::Result;
use crate::utils::validation::require_request_field;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    LoadingImages,
    InvokingModel,
    Interpreting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::LoadingImages => "loading-images",
            Stage::InvokingModel => "invoking-model",
            Stage::Interpreting => "interpreting",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Checks presence and containment of both references. Runs before any
/// file is opened.
pub fn validate_payload(payload: &TryOnPayload) -> Result<TryOnRequest> {
    let user_image = require_request_field("userImageUrl", payload.user_image_url.as_deref())?;
    let garment_image =
        require_request_field("garmentImageUrl", payload.garment_image_url.as_deref())?;

    Ok(TryOnRequest {
        user_image: AssetPath::resolve(ImageReference::new(user_image))?,
        garment_image: AssetPath::resolve(ImageReference::new(garment_image))?,
    })
}

/// Runs one try-on: validate, load both images, call the model once and
/// interpret its answer. Any failure ends the run; nothing is retried.
pub struct TryOnEngine<S: AssetStore> {
    store: S,
    model: Arc<dyn ImageModel>,
}

impl<S: AssetStore> TryOnEngine<S> {
    pub fn new(store: S, model: Arc<dyn ImageModel>) -> Self {
        Self { store, model }
    }

    /// Returns the `data:` URL of the generated image.
    pub async fn run(&self, payload: &TryOnPayload) -> Result<String> {
        let mut stage = Stage::Validating;
        let result = self.advance(payload, &mut stage).await;

        match &result {
            Ok(_) => tracing::info!(stage = %Stage::Done, "Try-on completed"),
            Err(e) => tracing::error!(stage = %stage, "Try-on failed: {}", e),
        }
        result
    }

    async fn advance(&self, payload: &TryOnPayload, stage: &mut Stage) -> Result<String> {
        let request = validate_payload(payload)?;

        *stage = Stage::LoadingImages;
        tracing::debug!(
            "Loading images: user={}, garment={}",
            request.user_image,
            request.garment_image
        );
        let user_image = load_image(&self.store, &request.user_image).await?;
        let garment_image = load_image(&self.store, &request.garment_image).await?;

        *stage = Stage::InvokingModel;
        tracing::debug!("Sending try-on request to image model");
        let model_request = ModelRequest::try_on(TRY_ON_PROMPT, user_image, garment_image);
        let response = self.model.generate(&model_request).await?;

        *stage = Stage::Interpreting;
        interpret(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        Candidate, Content, InlineData, ModelPart, ModelResponse, PromptFeedback, ResponsePart,
    };
    use crate::utils::error::TryOnError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStore {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        reads: Arc<AtomicUsize>,
    }

    impl MockStore {
        async fn with_files(files: &[(&str, &[u8])]) -> Self {
            let store = Self::default();
            for (path, data) in files {
                store.write_asset(path, data).await.unwrap();
            }
            store
        }
    }

    impl AssetStore for MockStore {
        async fn read_asset(&self, asset: &AssetPath) -> Result<Vec<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let reference = asset.reference().as_str();
            let files = self.files.lock().await;
            files
                .get(reference)
                .cloned()
                .ok_or_else(|| TryOnError::asset(reference, "No such file or directory"))
        }

        async fn write_asset(&self, relative_path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(relative_path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct StubModel {
        response: std::result::Result<ModelResponse, String>,
        calls: AtomicUsize,
        last_request: Mutex<Option<ModelRequest>>,
    }

    impl StubModel {
        fn returning(response: ModelResponse) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(response),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn failing(detail: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Err(detail.to_string()),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageModel for StubModel {
        async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().await = Some(request.clone());
            self.response.clone().map_err(TryOnError::model)
        }
    }

    fn image_response(mime_type: &str, data: &str) -> ModelResponse {
        ModelResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![ResponsePart::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: data.to_string(),
                        },
                    }],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
        }
    }

    fn payload(user: Option<&str>, garment: Option<&str>) -> TryOnPayload {
        TryOnPayload {
            user_image_url: user.map(str::to_string),
            garment_image_url: garment.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_run_returns_data_url() {
        let store = MockStore::with_files(&[
            ("/uploads/a.png", b"user"),
            ("/garments/shirts/shirt-1.png", b"shirt"),
        ])
        .await;
        let model = StubModel::returning(image_response("image/png", "Zm9v"));
        let engine = TryOnEngine::new(store, model.clone());

        let result = engine
            .run(&payload(
                Some("/uploads/a.png"),
                Some("/garments/shirts/shirt-1.png"),
            ))
            .await
            .unwrap();

        assert_eq!(result, "data:image/png;base64,Zm9v");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_run_sends_prompt_then_user_then_garment() {
        let store = MockStore::with_files(&[
            ("/uploads/a.png", b"user"),
            ("/garments/shirt-1.jpg", b"shirt"),
        ])
        .await;
        let model = StubModel::returning(image_response("image/png", "Zm9v"));
        let engine = TryOnEngine::new(store, model.clone());

        engine
            .run(&payload(Some("/uploads/a.png"), Some("/garments/shirt-1.jpg")))
            .await
            .unwrap();

        let request = model.last_request.lock().await.clone().unwrap();
        assert_eq!(request.parts.len(), 3);
        assert!(matches!(&request.parts[0], ModelPart::Text(t) if t == TRY_ON_PROMPT));
        assert!(matches!(
            &request.parts[1],
            ModelPart::Image(img) if img.mime_type == "image/png" && img.data == "dXNlcg=="
        ));
        assert!(matches!(
            &request.parts[2],
            ModelPart::Image(img) if img.mime_type == "image/jpeg" && img.data == "c2hpcnQ="
        ));
    }

    #[tokio::test]
    async fn test_missing_fields_fail_before_any_io() {
        let cases = [
            payload(None, Some("/garments/shirt-1.png")),
            payload(Some("/uploads/a.png"), None),
            payload(Some(""), Some("/garments/shirt-1.png")),
            payload(None, None),
        ];

        for case in cases {
            let store = MockStore::default();
            let model = StubModel::returning(image_response("image/png", "Zm9v"));
            let engine = TryOnEngine::new(store.clone(), model.clone());

            let err = engine.run(&case).await.unwrap_err();

            assert!(matches!(err, TryOnError::InputValidationError { .. }));
            assert_eq!(store.reads.load(Ordering::SeqCst), 0);
            assert_eq!(model.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_escaping_reference_fails_before_any_io() {
        let cases = [
            payload(Some("/uploads/a.png"), Some("../../etc/passwd")),
            payload(Some("/uploads/missing.png"), Some("../../etc/passwd")),
            payload(Some("/uploads/../../etc/passwd"), Some("/garments/shirt-1.png")),
        ];

        for case in cases {
            let store = MockStore::with_files(&[
                ("/uploads/a.png", b"user"),
                ("/garments/shirt-1.png", b"shirt"),
            ])
            .await;
            let model = StubModel::returning(image_response("image/png", "Zm9v"));
            let engine = TryOnEngine::new(store.clone(), model.clone());

            let err = engine.run(&case).await.unwrap_err();

            assert!(matches!(err, TryOnError::InputValidationError { .. }));
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
            assert_eq!(store.reads.load(Ordering::SeqCst), 0);
            assert_eq!(model.calls(), 0);
        }
    }

    #[test]
    fn test_validate_payload_resolves_both_paths() {
        let request = validate_payload(&payload(
            Some("http://localhost:3000/uploads/a.png"),
            Some("/garments/shirts/shirt-1.png"),
        ))
        .unwrap();

        assert_eq!(
            request.user_image.relative(),
            std::path::Path::new("uploads/a.png")
        );
        assert_eq!(
            request.garment_image.reference().as_str(),
            "/garments/shirts/shirt-1.png"
        );
    }

    #[tokio::test]
    async fn test_missing_file_skips_model_call() {
        let store = MockStore::with_files(&[("/garments/shirt-1.png", b"shirt")]).await;
        let model = StubModel::returning(image_response("image/png", "Zm9v"));
        let engine = TryOnEngine::new(store, model.clone());

        let err = engine
            .run(&payload(
                Some("/uploads/missing.png"),
                Some("/garments/shirt-1.png"),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, TryOnError::AssetReadError { .. }));
        assert!(err.client_message().contains("/uploads/missing.png"));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_is_reported_generically() {
        let store = MockStore::with_files(&[
            ("/uploads/a.png", b"user"),
            ("/garments/shirt-1.png", b"shirt"),
        ])
        .await;
        let model = StubModel::failing("HTTP 429: quota exhausted for project 1234");
        let engine = TryOnEngine::new(store, model.clone());

        let err = engine
            .run(&payload(Some("/uploads/a.png"), Some("/garments/shirt-1.png")))
            .await
            .unwrap_err();

        assert!(matches!(err, TryOnError::ModelInvocationError { .. }));
        assert!(!err.client_message().contains("1234"));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_refusal_is_surfaced() {
        let store = MockStore::with_files(&[
            ("/uploads/a.png", b"user"),
            ("/garments/shirt-1.png", b"shirt"),
        ])
        .await;
        let model = StubModel::returning(ModelResponse {
            candidates: vec![],
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some("SAFETY".to_string()),
            }),
        });
        let engine = TryOnEngine::new(store, model);

        let err = engine
            .run(&payload(Some("/uploads/a.png"), Some("/garments/shirt-1.png")))
            .await
            .unwrap_err();

        assert!(matches!(err, TryOnError::NoImageProduced { .. }));
        assert!(err.client_message().contains("SAFETY"));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::LoadingImages.to_string(), "loading-images");
        assert_eq!(Stage::InvokingModel.to_string(), "invoking-model");
    }
}
