#![allow(dead_code)]

use async_trait::async_trait;
use rustf_datasource::{DatasourceDescriptor, DatasourceFactory, DatasourceRegistry, Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

/// Stand-in for a connection pool
#[derive(Debug)]
pub struct TestPool {
    pub url: String,
    pub serial: usize,
}

/// Factory that counts builds
///
/// URLs starting with `fail:` fail to build. URLs starting with `gated:`
/// signal `entered` and then wait for a `gate` permit.
pub struct CountingFactory {
    builds: AtomicUsize,
    delay: Duration,
    pub entered: Notify,
    pub gate: Semaphore,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            builds: AtomicUsize::new(0),
            delay,
            entered: Notify::new(),
            gate: Semaphore::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasourceFactory for CountingFactory {
    type Handle = TestPool;

    async fn build(&self, descriptor: &DatasourceDescriptor) -> Result<TestPool> {
        if descriptor.url.starts_with("fail:") {
            return Err(Error::construction(&descriptor.name, "connection refused"));
        }
        if descriptor.url.starts_with("gated:") {
            self.entered.notify_one();
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| Error::internal(e.to_string()))?;
            permit.forget();
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let serial = self.builds.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TestPool {
            url: descriptor.url.clone(),
            serial,
        })
    }
}

pub fn descriptor(name: &str, url: &str) -> DatasourceDescriptor {
    DatasourceDescriptor::new(name, url)
}

pub async fn registry_with(factory: CountingFactory) -> Arc<DatasourceRegistry<CountingFactory>> {
    let registry = DatasourceRegistry::new(factory, descriptor("primary", "test://primary"))
        .await
        .expect("default datasource builds");
    Arc::new(registry)
}

pub async fn registry() -> Arc<DatasourceRegistry<CountingFactory>> {
    registry_with(CountingFactory::new()).await
}
