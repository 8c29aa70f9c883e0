use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::Speaker;
use crate::{Error, Result};

/// Speaks through a host text-to-speech program such as `say`.
///
/// A new reply interrupts the one still playing.
pub struct CommandSpeaker {
    program: String,
    current: Mutex<Option<tokio::process::Child>>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        let mut current = self.current.lock().await;
        if let Some(mut previous) = current.take() {
            let _ = previous.kill().await;
        }

        debug!(program = %self.program, chars = text.chars().count(), "speaking");
        match Command::new(&self.program)
            .arg(text)
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => {
                *current = Some(child);
                Ok(())
            }
            Err(e) => {
                warn!(program = %self.program, error = %e, "failed to spawn speech program");
                Err(Error::collaborator("speech", e.to_string()))
            }
        }
    }
}
