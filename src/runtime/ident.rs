//! Identifier synthesis for declarations without an IDENT column

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

pub trait IdentGenerator: Send + Sync {
    fn next_ident(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdentGenerator;

impl IdentGenerator for UuidIdentGenerator {
    fn next_ident(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `<prefix><n>` with `n` counting up from 1
#[derive(Debug, Default)]
pub struct SequentialIdentGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdentGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdentGenerator for SequentialIdentGenerator {
    fn next_ident(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential() {
        let generator = SequentialIdentGenerator::new("id-");
        assert_eq!(generator.next_ident(), "id-1");
        assert_eq!(generator.next_ident(), "id-2");
    }

    #[test]
    fn test_uuid_is_unique() {
        let generator = UuidIdentGenerator;
        let a = generator.next_ident();
        assert_ne!(a, generator.next_ident());
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
