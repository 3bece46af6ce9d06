use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::{Config, Engine, ProcmineError, Result};

pub struct EngineBuilder {
    config: Config,
    rt: Option<Arc<Runtime>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            rt: None,
        }
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn async_worker_thread_number(
        mut self,
        n: u16,
    ) -> Self {
        self.config.async_worker_thread_number = n;
        self
    }

    /// Runs analyses on an existing runtime instead of creating one.
    pub fn runtime(
        mut self,
        runtime: Arc<Runtime>,
    ) -> Self {
        self.rt = Some(runtime);
        self
    }

    pub fn build(&self) -> Result<Engine> {
        let runtime = match self.rt.as_ref() {
            Some(rt) => rt.clone(),
            None => {
                if self.config.async_worker_thread_number == 0 {
                    return Err(ProcmineError::Config("async_worker_thread_number must be at least 1".to_string()));
                }
                let rt = Builder::new_multi_thread()
                    .worker_threads(self.config.async_worker_thread_number.into())
                    .enable_all()
                    .build()
                    .map_err(|e| ProcmineError::Engine(format!("failed to build runtime: {}", e)))?;
                Arc::new(rt)
            }
        };

        Ok(Engine::new(self.config.clone(), runtime))
    }
}
