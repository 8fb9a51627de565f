//! Source selection and system methods.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::protocol::{Command, SourceCommand, SystemCommand};

use super::Client;

// ============================================================================
// Client - Source
// ============================================================================

impl Client {
    /// Gets the active input source.
    pub async fn source(&self) -> Result<Option<Value>> {
        self.execute(Command::Source(SourceCommand::Get)).await
    }

    /// Switches the input source.
    ///
    /// # Arguments
    ///
    /// * `kind` - Source type, e.g. "local", "bluetooth", "snapcast"
    pub async fn set_source(&self, kind: &str) -> Result<()> {
        debug!(kind, "Switching source");
        self.send_command(Command::Source(SourceCommand::Set {
            kind: kind.to_string(),
        }))
        .await
    }
}

// ============================================================================
// Client - System
// ============================================================================

impl Client {
    /// Gets hardware and software info.
    pub async fn system_info(&self) -> Result<Option<Value>> {
        self.execute(Command::System(SystemCommand::Info)).await
    }

    /// Gets the appliance's date and time.
    pub async fn datetime(&self) -> Result<Option<Value>> {
        self.execute(Command::System(SystemCommand::Datetime)).await
    }

    /// Gets the standby state.
    pub async fn power_state(&self) -> Result<Option<Value>> {
        self.execute(Command::System(SystemCommand::GetPowerState))
            .await
    }

    /// Enters or leaves standby.
    pub async fn standby(&self, state: bool) -> Result<()> {
        info!(state, "Setting standby");
        self.send_command(Command::System(SystemCommand::Standby { state }))
            .await
    }

    /// Reboots the appliance. The socket will close shortly after.
    pub async fn reboot(&self) -> Result<()> {
        info!("Rebooting appliance");
        self.send_command(Command::System(SystemCommand::Reboot))
            .await
    }

    /// Powers the appliance off.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down appliance");
        self.send_command(Command::System(SystemCommand::Shutdown))
            .await
    }
}
