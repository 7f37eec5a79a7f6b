//! Suivi de progression et annulation coopérative
//!
//! Les opérateurs interrogent le tracker environ une fois par géométrie d'entrée et
//! lèvent [`GeometryError::Cancelled`] dès qu'il demande l'arrêt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{GeometryError, Result};

/// Rappel de progression. Renvoyer `false` demande l'arrêt.
pub trait ProgressTracker: Send + Sync {
    /// `step` est le rang de l'élément courant, `total` vaut -1 s'il est inconnu
    fn progress(&self, step: i64, total: i64) -> bool;
}

/// Tracker partagé, tel que conservé par les curseurs
pub type Tracker = Arc<dyn ProgressTracker>;

impl<F> ProgressTracker for F
where
    F: Fn(i64, i64) -> bool + Send + Sync,
{
    fn progress(&self, step: i64, total: i64) -> bool {
        self(step, total)
    }
}

/// Interroge le tracker s'il existe
pub fn check(tracker: Option<&dyn ProgressTracker>, step: i64, total: i64) -> Result<()> {
    match tracker {
        Some(t) if !t.progress(step, total) => {
            tracing::debug!(step, total, "cancellation requested");
            Err(GeometryError::Cancelled)
        }
        _ => Ok(()),
    }
}

/// Drapeau d'annulation manipulable depuis un autre fil
#[derive(Debug, Default)]
pub struct CancellationFlag {
    cancelled: AtomicBool,
}

impl CancellationFlag {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl ProgressTracker for CancellationFlag {
    fn progress(&self, _step: i64, _total: i64) -> bool {
        !self.is_cancelled()
    }
}
