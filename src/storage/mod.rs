//! # Triplet Store Trait
//!
//! This is THE contract between the graph model and any key-value backend
//! that persists topology. The model never retries: every failure surfaces
//! to the caller as `Error::Store`.
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryStore` | `memory` | In-process store for testing/embedding |

pub mod memory;

use async_trait::async_trait;

use crate::model::{Triplet, TripletKey, TripletPattern};
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// TripletStore Trait
// ============================================================================

/// Asynchronous triplet persistence.
///
/// `get` matches every field set on the pattern and treats unset fields as
/// wildcards. `put` does not enforce uniqueness; the graph model checks for
/// an existing key before writing.
#[async_trait]
pub trait TripletStore: Send + Sync + 'static {
    /// All triplets matching the pattern, in insertion order.
    async fn get(&self, pattern: &TripletPattern) -> Result<Vec<Triplet>>;

    /// Persist a triplet.
    async fn put(&self, triplet: Triplet) -> Result<()>;

    /// Delete every record with the triplet's key. Returns true if one existed.
    async fn del(&self, triplet: &Triplet) -> Result<bool>;

    /// Flush and release the backend.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    /// Whether a triplet with this key is stored.
    ///
    /// Default: exact-key `get`.
    async fn contains(&self, key: &TripletKey) -> Result<bool> {
        Ok(!self.get(&TripletPattern::for_key(key)).await?.is_empty())
    }

    /// Number of stored triplets.
    ///
    /// Default: full scan.
    async fn count(&self) -> Result<u64> {
        Ok(self.get(&TripletPattern::any()).await?.len() as u64)
    }

    /// Every triplet touching `hash` as subject or object, without duplicates
    /// for self-loops.
    ///
    /// Default: one subject-side and one object-side query.
    async fn incident(&self, hash: &str) -> Result<Vec<Triplet>> {
        let mut out = self.get(&TripletPattern::any().subject(hash)).await?;
        for t in self.get(&TripletPattern::any().object(hash)).await? {
            if t.subject.hash != hash {
                out.push(t);
            }
        }
        Ok(out)
    }
}
