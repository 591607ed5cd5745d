use anyhow::{bail, Result};
use async_trait::async_trait;
use dialogue_core::ports::TransferPort;
use tracing::info;

/// Transfer for webhook platforms: the dial happens when the platform reads
/// the `<Dial>` in the reply, so requesting one only validates and logs it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveTransfer;

impl DirectiveTransfer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransferPort for DirectiveTransfer {
    async fn request_transfer(&self, call_id: &str, destination: &str) -> Result<()> {
        let dialable = destination.trim_start_matches('+');
        if dialable.is_empty() || !dialable.chars().all(|c| c.is_ascii_digit() || c == ' ') {
            bail!("not a dialable number: {:?}", destination);
        }
        info!(call_id, destination, "transfer directive issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accepts_dialable_numbers() {
        let t = DirectiveTransfer::new();
        t.request_transfer("CA1", "+33 1 00 00 00 00").await.unwrap();
        t.request_transfer("CA1", "0100000000").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        let t = DirectiveTransfer::new();
        assert!(t.request_transfer("CA1", "call mum").await.is_err());
        assert!(t.request_transfer("CA1", "+").await.is_err());
    }

    #[tokio::test]
    async fn test_keeps_no_per_call_state() {
        let t = DirectiveTransfer::new();
        for i in 0..1000 {
            t.request_transfer(&format!("CA{}", i), "+33100000000").await.unwrap();
        }
        assert_eq!(std::mem::size_of_val(&t), 0);
    }
}
