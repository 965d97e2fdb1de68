//! Scrap service port
//!
//! Where new scraps get their ids. The local service answers immediately;
//! the simulated remote one behaves like a server round-trip.

use std::time::Duration;

use async_trait::async_trait;
use smol::Timer;

use crate::clock::{Clock, IdGenerator, SystemClock};
use crate::{ScrapDraft, ScrapId, ScrapResult};

/// Server acknowledgement of a saved scrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub id: ScrapId,
}

#[async_trait(?Send)]
pub trait ScrapService {
    async fn save_scrap(&self, draft: &ScrapDraft) -> ScrapResult<SaveReceipt>;
}

/// Issues ids in-process
pub struct LocalScrapService {
    clock: Box<dyn Clock>,
    ids: IdGenerator,
}

impl LocalScrapService {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            ids: IdGenerator::new(),
        }
    }
}

impl Default for LocalScrapService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl ScrapService for LocalScrapService {
    async fn save_scrap(&self, _draft: &ScrapDraft) -> ScrapResult<SaveReceipt> {
        Ok(SaveReceipt {
            id: self.ids.next_id(&self.clock.now()),
        })
    }
}

/// Pretends to post the scrap to a server
pub struct SimulatedRemoteService {
    latency: Duration,
    clock: Box<dyn Clock>,
    ids: IdGenerator,
}

impl SimulatedRemoteService {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            clock: Box::new(SystemClock),
            ids: IdGenerator::new(),
        }
    }
}

#[async_trait(?Send)]
impl ScrapService for SimulatedRemoteService {
    async fn save_scrap(&self, draft: &ScrapDraft) -> ScrapResult<SaveReceipt> {
        let payload = serde_json::to_string(draft)?;
        tracing::info!(%payload, "posting scrap");
        Timer::after(self.latency).await;

        // Issued when the response arrives
        let id = self.ids.next_id(&self.clock.now());
        tracing::debug!(%id, "scrap saved remotely");
        Ok(SaveReceipt { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextSpan;
    use std::time::Instant;

    fn draft() -> ScrapDraft {
        ScrapDraft {
            content: "quick".to_string(),
            offset: TextSpan { start: 4, end: 9 },
        }
    }

    #[test]
    fn test_local_ids_are_unique() {
        let service = LocalScrapService::new();
        let (a, b) = smol::block_on(async {
            let a = service.save_scrap(&draft()).await.unwrap();
            let b = service.save_scrap(&draft()).await.unwrap();
            (a, b)
        });
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_remote_waits_for_latency() {
        let service = SimulatedRemoteService::new(Duration::from_millis(20));
        let started = Instant::now();
        let receipt = smol::block_on(service.save_scrap(&draft())).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(receipt.id.as_str().parse::<i64>().is_ok());
    }
}
