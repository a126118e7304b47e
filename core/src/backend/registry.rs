//! Registry mapping model-type labels to engine model loaders

use crate::engine::ModelLoader;
use std::collections::BTreeMap;

/// Registry of loader factories keyed by model-type label
pub struct LoaderRegistry {
    factories: BTreeMap<String, Box<dyn LoaderFactory>>,
}

/// Factory trait for creating model loaders
pub trait LoaderFactory: Send + Sync {
    /// Create a new instance of the loader
    fn create(&self) -> Box<dyn ModelLoader>;

    /// Model-type label this factory answers to
    fn model_type(&self) -> &str;

    /// Name of the engine model class the loader produces
    fn loader_name(&self) -> &str;
}

impl LoaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a loader factory, replacing any previous one for the same label
    pub fn register_factory(&mut self, factory: Box<dyn LoaderFactory>) {
        self.factories.insert(factory.model_type().to_string(), factory);
    }

    /// Create the loader for a model-type label
    pub fn resolve(&self, model_type: &str) -> Option<Box<dyn ModelLoader>> {
        self.factories.get(model_type).map(|factory| factory.create())
    }

    /// Whether a label is supported
    pub fn contains(&self, model_type: &str) -> bool {
        self.factories.contains_key(model_type)
    }

    /// Loader name registered for a label
    pub fn loader_name(&self, model_type: &str) -> Option<&str> {
        self.factories.get(model_type).map(|factory| factory.loader_name())
    }

    /// All supported labels, sorted
    pub fn list_model_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        let mut registry = Self::new();

        registry.register_factory(Box::new(LlamaLoaderFactory));
        registry.register_factory(Box::new(GemmaLoaderFactory));
        registry.register_factory(Box::new(MistralLoaderFactory));
        registry.register_factory(Box::new(MixtralLoaderFactory));
        registry.register_factory(Box::new(Qwen2LoaderFactory));
        registry.register_factory(Box::new(Phi3LoaderFactory));
        registry.register_factory(Box::new(Gpt2LoaderFactory));

        registry
    }
}

/// Macro to help implement loader factories for served architectures
#[macro_export]
macro_rules! impl_loader_factory {
    ($factory:ident, $model_type:expr, $architecture:expr) => {
        pub struct $factory;

        impl $crate::backend::LoaderFactory for $factory {
            fn create(&self) -> Box<dyn $crate::engine::ModelLoader> {
                Box::new($crate::engine::ServedModelLoader::new($architecture))
            }

            fn model_type(&self) -> &str {
                $model_type
            }

            fn loader_name(&self) -> &str {
                $architecture
            }
        }
    };
}

impl_loader_factory!(LlamaLoaderFactory, "llama", "LlamaForCausalLM");
impl_loader_factory!(GemmaLoaderFactory, "gemma", "GemmaForCausalLM");
impl_loader_factory!(MistralLoaderFactory, "mistral", "MistralForCausalLM");
impl_loader_factory!(MixtralLoaderFactory, "mixtral", "MixtralForCausalLM");
impl_loader_factory!(Qwen2LoaderFactory, "qwen2", "Qwen2ForCausalLM");
impl_loader_factory!(Phi3LoaderFactory, "phi3", "Phi3ForCausalLM");
impl_loader_factory!(Gpt2LoaderFactory, "gpt2", "GPT2LMHeadModel");
