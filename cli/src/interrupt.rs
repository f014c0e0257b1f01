use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Routes Ctrl-C to whichever turn is running. With no turn in flight the
/// interrupt is reported as idle and the caller decides what to do.
#[derive(Clone, Default)]
pub struct TurnInterrupt {
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl TurnInterrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for the turn about to start.
    pub async fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.current.lock().await = Some(token.clone());
        token
    }

    pub async fn finish(&self) {
        self.current.lock().await.take();
    }

    /// Cancels the running turn. Returns `false` when nothing was running.
    pub async fn interrupt(&self) -> bool {
        match self.current.lock().await.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// One Ctrl-C listener for the whole process: cancels the running turn,
    /// or exits when pressed at the prompt.
    pub fn listen(&self) {
        let interrupt = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !interrupt.interrupt().await {
                    println!("\n👋 Goodbye!");
                    std::process::exit(130);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interrupt_cancels_running_turn() {
        let interrupt = TurnInterrupt::new();
        let token = interrupt.begin().await;

        assert!(interrupt.interrupt().await);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn interrupt_when_idle_reports_false() {
        let interrupt = TurnInterrupt::new();
        assert!(!interrupt.interrupt().await);

        let token = interrupt.begin().await;
        interrupt.finish().await;
        assert!(!interrupt.interrupt().await);
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn each_turn_gets_a_fresh_token() {
        let interrupt = TurnInterrupt::new();
        let first = interrupt.begin().await;
        interrupt.interrupt().await;

        let second = interrupt.begin().await;
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }
}
