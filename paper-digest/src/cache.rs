use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// SHA-256 of a credential, so the cache never holds the secret itself.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialFingerprint(Vec<u8>);

impl CredentialFingerprint {
    pub fn of(credential: &str) -> Self {
        Self(Sha256::digest(credential.as_bytes()).to_vec())
    }
}

impl std::fmt::Debug for CredentialFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.iter().take(4).map(|b| format!("{:02x}", b)).collect();
        write!(f, "CredentialFingerprint({}..)", prefix)
    }
}

#[derive(Debug, Clone)]
pub struct CachedSummary {
    pub fingerprint: CredentialFingerprint,
    pub text: String,
}

impl CachedSummary {
    /// The cached text, if it was produced under the same credential.
    pub fn for_credential(&self, fingerprint: &CredentialFingerprint) -> Option<&str> {
        (&self.fingerprint == fingerprint).then_some(self.text.as_str())
    }
}

/// Lock guarding one link's cached summary. Holding it across the upstream
/// call keeps at most one request in flight per link.
pub type SummarySlot = Arc<Mutex<Option<CachedSummary>>>;

/// In-memory summaries keyed by paper link, for the lifetime of one session.
#[derive(Default)]
pub struct SummaryCache {
    slots: RwLock<HashMap<String, SummarySlot>>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `link`, creating an empty one on first use.
    pub async fn slot(&self, link: &str) -> SummarySlot {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(link) {
                return slot.clone();
            }
        }

        let mut slots = self.slots.write().await;
        slots
            .entry(link.to_string())
            .or_insert_with(|| {
                debug!("Creating summary slot for {}", link);
                Arc::new(Mutex::new(None))
            })
            .clone()
    }

    /// Number of links holding a summary.
    pub async fn len(&self) -> usize {
        let slots: Vec<SummarySlot> = self.slots.read().await.values().cloned().collect();
        let mut filled = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                filled += 1;
            }
        }
        filled
    }

    pub async fn clear(&self) {
        let mut slots = self.slots.write().await;
        slots.clear();
        debug!("Cleared summary cache");
    }
}
