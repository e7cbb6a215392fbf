use std::{env, fmt};

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Settings for one interactive session. Nothing here is persisted; the
/// active store in particular is client-side bookkeeping and may point at a
/// store that has since been deleted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    api_key: String,
    model: String,
    active_store_id: Option<String>,
    base_url: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            active_store_id: None,
            base_url: None,
        }
    }
}

impl SessionConfig {
    /// Read `OPENAI_API_KEY`, `OPENAI_MODEL`, `BBP_VECTOR_STORE_ID` and
    /// `OPENAI_BASE_URL`, loading a `.env` file first when one exists.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            config.set_api_key(api_key);
        }
        if let Ok(model) = env::var("OPENAI_MODEL") {
            config.set_model(model);
        }
        if let Ok(store_id) = env::var("BBP_VECTOR_STORE_ID") {
            config.set_active_store(store_id);
        }
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            config.set_base_url(base_url);
        }
        config
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn active_store_id(&self) -> Option<&str> {
        self.active_store_id.as_deref()
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into().trim().to_string();
    }

    /// Blank values fall back to the default model.
    pub fn set_model(&mut self, model: impl Into<String>) {
        let model = model.into();
        let model = model.trim();
        self.model = if model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model.to_string()
        };
    }

    /// Blank IDs clear the active store.
    pub fn set_active_store(&mut self, store_id: impl Into<String>) {
        let store_id = store_id.into();
        let store_id = store_id.trim();
        self.active_store_id = (!store_id.is_empty()).then(|| store_id.to_string());
    }

    pub fn clear_active_store(&mut self) {
        self.active_store_id = None;
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        let base_url = base_url.into();
        let base_url = base_url.trim();
        self.base_url = (!base_url.is_empty()).then(|| base_url.to_string());
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("api_key", &if self.has_api_key() { "<set>" } else { "<unset>" })
            .field("model", &self.model)
            .field("active_store_id", &self.active_store_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}
