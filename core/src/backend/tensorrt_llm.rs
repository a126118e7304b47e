//! TensorRT-LLM backend

use crate::backend::{Backend, LoaderRegistry};
use crate::config::{TrtLlmConfig, BACKEND_NAME};
use crate::engine::{LoadRequest, ModelLoader, PretrainedModel};
use crate::error::{BackendError, Result};
use crate::generation::{BackendInputs, GenerationKwargs, RequestOutput, SamplingParams};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, warn};

/// Backend adapter driving a TensorRT-LLM engine
pub struct TrtLlmBackend {
    config: TrtLlmConfig,
    loader: Box<dyn ModelLoader>,
    pretrained_model: Option<Box<dyn PretrainedModel>>,
}

impl TrtLlmBackend {
    pub const NAME: &'static str = BACKEND_NAME;

    /// Create a backend using the default loader registry
    pub fn new(config: TrtLlmConfig) -> Result<Self> {
        Self::with_registry(config, &LoaderRegistry::default())
    }

    /// Create a backend resolving its loader from `registry`
    pub fn with_registry(config: TrtLlmConfig, registry: &LoaderRegistry) -> Result<Self> {
        let loader = registry.resolve(&config.model_type).ok_or_else(|| {
            BackendError::UnsupportedModelType {
                backend: Self::NAME.to_string(),
                model_type: config.model_type.clone(),
            }
        })?;
        info!("\t+ Using TRTLLMModel class {}", loader.loader_name());

        Ok(Self {
            config,
            loader,
            pretrained_model: None,
        })
    }

    /// Name of the selected loader
    pub fn loader_name(&self) -> &str {
        self.loader.loader_name()
    }

    /// Get the backend configuration
    pub fn config(&self) -> &TrtLlmConfig {
        &self.config
    }

    async fn load_pretrained(&self, workdir: &Path) -> Result<Box<dyn PretrainedModel>> {
        let request = LoadRequest {
            model: &self.config.model,
            model_type: &self.config.model_type,
            endpoint: &self.config.engine,
            workdir,
        };

        self.loader.from_pretrained(&request).await
    }

    async fn run_generation(
        &self,
        inputs: &BackendInputs,
        kwargs: &GenerationKwargs,
    ) -> Result<Vec<RequestOutput>> {
        let model = self
            .pretrained_model
            .as_ref()
            .ok_or_else(|| BackendError::NotLoaded {
                backend: Self::NAME.to_string(),
            })?;

        let params = SamplingParams::from_kwargs(kwargs);
        debug!(
            "Generating for {} sequence(s) with {:?}",
            inputs.batch_size(),
            params
        );

        model.generate(inputs.input_ids.clone(), &params).await
    }
}

#[async_trait]
impl Backend for TrtLlmBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn load(&mut self) -> Result<()> {
        // A failed (re)load leaves the backend unloaded
        self.pretrained_model = None;

        info!("\t+ Creating backend temporary directory");
        let tmpdir = tempfile::Builder::new().prefix("trtbench-").tempdir()?;

        info!("\t+ Loading pretrained TRTLLMModel");
        let loaded = self.load_pretrained(tmpdir.path()).await;

        info!("\t+ Cleaning up backend temporary directory");
        let cleanup = tmpdir.close();

        let model = match loaded {
            Ok(model) => model,
            Err(e) => {
                // The loader error is the one reported
                if let Err(cleanup_err) = cleanup {
                    warn!("Failed to remove backend temporary directory: {}", cleanup_err);
                }
                return Err(e);
            }
        };
        cleanup?;
        self.pretrained_model = Some(model);

        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.pretrained_model.is_some()
    }

    async fn prefill(
        &self,
        inputs: &BackendInputs,
        kwargs: &GenerationKwargs,
    ) -> Result<Vec<RequestOutput>> {
        self.run_generation(inputs, kwargs).await
    }

    async fn generate(
        &self,
        inputs: &BackendInputs,
        kwargs: &GenerationKwargs,
    ) -> Result<Vec<RequestOutput>> {
        self.run_generation(inputs, kwargs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LoaderFactory;
    use crate::error::{EngineError, Error};
    use crate::generation::{CompletionOutput, FinishReason};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(Vec<Vec<u32>>, SamplingParams)>>>;

    /// Shared record of what the mock engine observed
    #[derive(Clone, Default)]
    struct LoadRecord {
        workdir: Arc<Mutex<Option<(PathBuf, bool)>>>,
        model: Arc<Mutex<Option<String>>>,
        calls: Calls,
        /// Make `from_pretrained` fail
        fail: Arc<AtomicBool>,
        /// Delete the workdir during loading so cleanup fails
        remove_workdir: Arc<AtomicBool>,
    }

    struct MockModel {
        calls: Calls,
    }

    #[async_trait]
    impl PretrainedModel for MockModel {
        async fn generate(
            &self,
            prompts: Vec<Vec<u32>>,
            params: &SamplingParams,
        ) -> Result<Vec<RequestOutput>> {
            self.calls.lock().unwrap().push((prompts.clone(), params.clone()));

            Ok(prompts
                .into_iter()
                .enumerate()
                .map(|(request_id, prompt_token_ids)| RequestOutput {
                    request_id,
                    outputs: vec![CompletionOutput {
                        index: 0,
                        text: format!("out-{}", request_id),
                        token_ids: vec![0; params.max_tokens.max(1) as usize],
                        num_tokens: None,
                        finish_reason: Some(FinishReason::Length),
                    }],
                    prompt_token_ids,
                })
                .collect())
        }

        fn model_id(&self) -> &str {
            "mock"
        }
    }

    struct MockLoader {
        record: LoadRecord,
    }

    #[async_trait]
    impl ModelLoader for MockLoader {
        fn loader_name(&self) -> &str {
            "MockForCausalLM"
        }

        async fn from_pretrained(
            &self,
            request: &LoadRequest<'_>,
        ) -> Result<Box<dyn PretrainedModel>> {
            *self.record.workdir.lock().unwrap() =
                Some((request.workdir.to_path_buf(), request.workdir.is_dir()));
            *self.record.model.lock().unwrap() = Some(request.model.to_string());

            if self.record.remove_workdir.load(Ordering::SeqCst) {
                std::fs::remove_dir_all(request.workdir)?;
            }

            if self.record.fail.load(Ordering::SeqCst) {
                return Err(EngineError::Network {
                    message: "connection refused".to_string(),
                }
                .into());
            }

            Ok(Box::new(MockModel {
                calls: self.record.calls.clone(),
            }))
        }
    }

    struct MockFactory {
        record: LoadRecord,
    }

    impl LoaderFactory for MockFactory {
        fn create(&self) -> Box<dyn ModelLoader> {
            Box::new(MockLoader {
                record: self.record.clone(),
            })
        }

        fn model_type(&self) -> &str {
            "mock"
        }

        fn loader_name(&self) -> &str {
            "MockForCausalLM"
        }
    }

    fn mock_backend(fail: bool) -> (TrtLlmBackend, LoadRecord) {
        let record = LoadRecord::default();
        record.fail.store(fail, Ordering::SeqCst);
        let mut registry = LoaderRegistry::new();
        registry.register_factory(Box::new(MockFactory {
            record: record.clone(),
        }));

        let config = TrtLlmConfig::new("org/mock-model", "mock");
        let backend = TrtLlmBackend::with_registry(config, &registry).unwrap();
        (backend, record)
    }

    #[test]
    fn test_supported_model_types_select_their_loader() {
        let registry = LoaderRegistry::default();

        for model_type in registry.list_model_types() {
            let backend = TrtLlmBackend::new(TrtLlmConfig::new("some/model", model_type))
                .unwrap_or_else(|e| panic!("'{}' should be supported: {}", model_type, e));

            assert_eq!(Some(backend.loader_name()), registry.loader_name(model_type));
            assert_eq!(backend.name(), "tensorrt-llm");
            assert!(!backend.is_loaded());
        }
    }

    #[test]
    fn test_unsupported_model_type_fails_construction() {
        let result = TrtLlmBackend::new(TrtLlmConfig::new("bigscience/bloom", "bloom"));

        match result {
            Err(Error::Backend(BackendError::UnsupportedModelType { backend, model_type })) => {
                assert_eq!(backend, "tensorrt-llm");
                assert_eq!(model_type, "bloom");
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected construction to fail"),
        }
    }

    #[tokio::test]
    async fn test_load_removes_temporary_directory() {
        let (mut backend, record) = mock_backend(false);

        backend.load().await.unwrap();

        let (workdir, existed) = record.workdir.lock().unwrap().clone().unwrap();
        assert!(existed, "workdir should exist while loading");
        assert!(!workdir.exists(), "workdir should be removed after loading");
        assert_eq!(record.model.lock().unwrap().as_deref(), Some("org/mock-model"));
        assert!(backend.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_load_removes_temporary_directory() {
        let (mut backend, record) = mock_backend(true);

        let err = backend.load().await.unwrap_err();
        assert!(matches!(err, Error::Engine(EngineError::Network { .. })));

        let (workdir, existed) = record.workdir.lock().unwrap().clone().unwrap();
        assert!(existed);
        assert!(!workdir.exists());
        assert!(!backend.is_loaded());
    }

    #[tokio::test]
    async fn test_cleanup_failure_leaves_backend_unloaded() {
        let (mut backend, record) = mock_backend(false);
        record.remove_workdir.store(true, Ordering::SeqCst);

        let err = backend.load().await.unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(!backend.is_loaded());
    }

    #[tokio::test]
    async fn test_load_failure_reported_over_cleanup_failure() {
        let (mut backend, record) = mock_backend(true);
        record.remove_workdir.store(true, Ordering::SeqCst);

        let err = backend.load().await.unwrap_err();

        assert!(matches!(err, Error::Engine(EngineError::Network { .. })));
        assert!(!backend.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_reload_drops_previous_model() {
        let (mut backend, record) = mock_backend(false);
        backend.load().await.unwrap();
        assert!(backend.is_loaded());

        record.fail.store(true, Ordering::SeqCst);
        assert!(backend.load().await.is_err());

        assert!(!backend.is_loaded());
        let err = backend
            .generate(&BackendInputs::new(vec![vec![1]]), &GenerationKwargs::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(BackendError::NotLoaded { .. })));
    }

    #[tokio::test]
    async fn test_generate_before_load_fails() {
        let (backend, _record) = mock_backend(false);
        let inputs = BackendInputs::new(vec![vec![1, 2, 3]]);

        let err = backend
            .generate(&inputs, &GenerationKwargs::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(BackendError::NotLoaded { .. })));

        let err = backend
            .prefill(&inputs, &GenerationKwargs::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(BackendError::NotLoaded { .. })));
    }

    #[tokio::test]
    async fn test_generate_forwards_inputs_and_params() {
        let (mut backend, record) = mock_backend(false);
        backend.load().await.unwrap();

        let inputs = BackendInputs::new(vec![vec![1, 2, 3], vec![4, 5]]);
        let kwargs = GenerationKwargs::new().with_max_new_tokens(8).with_top_k(5);
        let outputs = backend.generate(&inputs, &kwargs).await.unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].prompt_token_ids, vec![1, 2, 3]);
        assert_eq!(outputs[1].outputs[0].text, "out-1");
        assert_eq!(outputs[1].generated_tokens(), Some(8));

        let calls = record.calls.lock().unwrap();
        let (prompts, params) = &calls[0];
        assert_eq!(prompts, &inputs.input_ids);
        assert_eq!(params, &SamplingParams::from_kwargs(&kwargs));
    }

    #[tokio::test]
    async fn test_prefill_and_generate_share_translation() {
        let (mut backend, record) = mock_backend(false);
        backend.load().await.unwrap();

        let inputs = BackendInputs::new(vec![vec![9]]);
        let kwargs = GenerationKwargs::new().with_new_tokens(1);
        let prefill = backend.prefill(&inputs, &kwargs).await.unwrap();
        let generate = backend.generate(&inputs, &kwargs).await.unwrap();

        assert_eq!(prefill, generate);
        let calls = record.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
        assert_eq!(calls[0].1.min_tokens, 1);
        assert_eq!(calls[0].1.top_k, SamplingParams::DEFAULT_TOP_K);
    }
}
