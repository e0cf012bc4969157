use std::sync::atomic::{AtomicU64, Ordering};

use rand::RngCore;

/// Source of opaque, unguessable invite tokens.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// 128 random bits, lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Predictable tokens (`token-1`, `token-2`, ...) for tests.
#[derive(Debug, Default)]
pub struct SequentialTokenGenerator {
    next: AtomicU64,
}

impl TokenGenerator for SequentialTokenGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("token-{n}")
    }
}
