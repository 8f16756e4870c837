//! Multi-resource deployment and teardown

use stackflow_cloud::{CleanupReport, Lifecycle, Result};
use std::time::Instant;
use tracing::{error, info, warn};

/// Creation order. Teardown runs in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Image,
    Keypair,
    Network,
    Router,
    Instance,
    /// Anything else, created last in insertion order
    Extra,
}

/// Sequences creators by [`Stage`] and rolls back on failure.
#[derive(Default)]
pub struct Deployment {
    creators: Vec<(Stage, Box<dyn Lifecycle>)>,
}

impl Deployment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, stage: Stage, creator: impl Lifecycle + 'static) -> Self {
        self.creators.push((stage, Box::new(creator)));
        self
    }

    pub fn image(self, creator: impl Lifecycle + 'static) -> Self {
        self.add(Stage::Image, creator)
    }

    pub fn keypair(self, creator: impl Lifecycle + 'static) -> Self {
        self.add(Stage::Keypair, creator)
    }

    pub fn network(self, creator: impl Lifecycle + 'static) -> Self {
        self.add(Stage::Network, creator)
    }

    pub fn router(self, creator: impl Lifecycle + 'static) -> Self {
        self.add(Stage::Router, creator)
    }

    pub fn instance(self, creator: impl Lifecycle + 'static) -> Self {
        self.add(Stage::Instance, creator)
    }

    pub fn extra(self, creator: impl Lifecycle + 'static) -> Self {
        self.add(Stage::Extra, creator)
    }

    /// Labels in creation order
    pub fn labels(&self) -> Vec<String> {
        let mut creators: Vec<_> = self.creators.iter().collect();
        creators.sort_by_key(|(stage, _)| *stage);
        creators.iter().map(|(_, c)| c.label()).collect()
    }

    /// Creates every resource in stage order.
    ///
    /// On the first failure every resource created so far is cleaned in
    /// reverse order, then the creation error is returned. Rollback failures
    /// are logged, never returned in its place.
    pub async fn deploy(&mut self) -> Result<()> {
        self.creators.sort_by_key(|(stage, _)| *stage);

        for index in 0..self.creators.len() {
            let creator = &mut self.creators[index].1;
            info!("Deploying {}", creator.label());
            if let Err(e) = creator.provision().await {
                error!("Failed to deploy {}: {}", creator.label(), e);
                let report = self.rollback(index).await;
                if !report.is_success() {
                    warn!("Rollback incomplete: {}", report);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Cleans every resource in reverse stage order, continuing past
    /// failures.
    pub async fn teardown(&mut self) -> CleanupReport {
        self.creators.sort_by_key(|(stage, _)| *stage);
        let len = self.creators.len();
        self.rollback(len).await
    }

    /// Cleans creators `[0, upto]` (bounded by the list) in reverse.
    async fn rollback(&mut self, upto: usize) -> CleanupReport {
        let start = Instant::now();
        let mut report = CleanupReport::new();
        let end = (upto + 1).min(self.creators.len());

        for (_, creator) in self.creators[..end].iter_mut().rev() {
            let label = creator.label();
            let held = creator.is_held();
            match creator.teardown().await {
                Ok(()) if held => report.add_success(label),
                Ok(()) => {}
                Err(e) => {
                    warn!("Failed to clean {}: {}", label, e);
                    report.add_failure(label, e);
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!("Teardown finished: {}", report);
        report
    }
}
