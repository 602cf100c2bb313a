//! Convenience wrappers for the common commands.

use crate::client::{CommandResult, RconClient};
use crate::RconError;

const STEAM_ID_LEN: usize = 17;
const STEAM_ID_PREFIX: &str = "7656119";

/// Checks that `id` looks like a 64-bit Steam ID.
pub fn validate_steam_id(id: &str) -> crate::Result<()> {
    if id.len() == STEAM_ID_LEN
        && id.starts_with(STEAM_ID_PREFIX)
        && id.bytes().all(|b| b.is_ascii_digit())
    {
        Ok(())
    } else {
        Err(RconError::InvalidCommand(format!("invalid Steam ID `{}`", id)).into())
    }
}

fn require_text(what: &str, text: &str) -> crate::Result<()> {
    if text.trim().is_empty() {
        return Err(RconError::InvalidCommand(format!("{} must not be empty", what)).into());
    }
    Ok(())
}

fn require_number(what: &str, value: f64) -> crate::Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(RconError::InvalidCommand(format!(
            "{} must be a non-negative number, got {}",
            what, value
        ))
        .into());
    }
    Ok(())
}

fn join_steam_ids(ids: &[&str]) -> crate::Result<String> {
    if ids.is_empty() {
        return Err(RconError::InvalidCommand("at least one Steam ID is required".to_string()).into());
    }
    for id in ids {
        validate_steam_id(id)?;
    }
    Ok(ids.join(","))
}

impl RconClient {
    pub async fn announce(&mut self, message: &str) -> crate::Result<CommandResult> {
        require_text("message", message)?;
        self.send_command("announce", Some(message)).await
    }

    pub async fn direct_message(
        &mut self,
        steam_id: &str,
        message: &str,
    ) -> crate::Result<CommandResult> {
        validate_steam_id(steam_id)?;
        require_text("message", message)?;
        let params = format!("{},{}", steam_id, message);
        self.send_command("direct-message", Some(&params)).await
    }

    pub async fn server_details(&mut self) -> crate::Result<CommandResult> {
        self.send_command("server-details", None).await
    }

    pub async fn players(&mut self) -> crate::Result<CommandResult> {
        self.send_command("players", None).await
    }

    pub async fn player_data(&mut self, steam_id: Option<&str>) -> crate::Result<CommandResult> {
        if let Some(id) = steam_id {
            validate_steam_id(id)?;
        }
        self.send_command("player-data", steam_id).await
    }

    pub async fn kick(&mut self, steam_id: &str, reason: &str) -> crate::Result<CommandResult> {
        validate_steam_id(steam_id)?;
        let params = format!("{},{}", steam_id, reason.trim());
        self.send_command("kick", Some(&params)).await
    }

    /// Bans a player. A `duration_hours` of zero is permanent.
    pub async fn ban(
        &mut self,
        steam_id: &str,
        reason: &str,
        duration_hours: u32,
    ) -> crate::Result<CommandResult> {
        validate_steam_id(steam_id)?;
        let params = format!("{},{},{}", steam_id, reason.trim(), duration_hours);
        self.send_command("ban", Some(&params)).await
    }

    pub async fn save(&mut self, name: Option<&str>) -> crate::Result<CommandResult> {
        self.send_command("save", name).await
    }

    pub async fn wipe_corpses(&mut self) -> crate::Result<CommandResult> {
        self.send_command("wipe-corpses", None).await
    }

    pub async fn pause(&mut self) -> crate::Result<CommandResult> {
        self.send_command("pause", None).await
    }

    pub async fn whitelist_add(&mut self, steam_ids: &[&str]) -> crate::Result<CommandResult> {
        let params = join_steam_ids(steam_ids)?;
        self.send_command("whitelist-add", Some(&params)).await
    }

    pub async fn whitelist_remove(&mut self, steam_ids: &[&str]) -> crate::Result<CommandResult> {
        let params = join_steam_ids(steam_ids)?;
        self.send_command("whitelist-remove", Some(&params)).await
    }

    pub async fn toggle_whitelist(&mut self) -> crate::Result<CommandResult> {
        self.send_command("toggle-whitelist", None).await
    }

    pub async fn toggle_global_chat(&mut self) -> crate::Result<CommandResult> {
        self.send_command("toggle-global-chat", None).await
    }

    pub async fn toggle_humans(&mut self) -> crate::Result<CommandResult> {
        self.send_command("toggle-humans", None).await
    }

    pub async fn toggle_ai(&mut self) -> crate::Result<CommandResult> {
        self.send_command("toggle-ai", None).await
    }

    pub async fn set_ai_density(&mut self, density: f64) -> crate::Result<CommandResult> {
        require_number("AI density", density)?;
        let params = density.to_string();
        self.send_command("set-ai-density", Some(&params)).await
    }

    pub async fn set_growth_multiplier(&mut self, multiplier: f64) -> crate::Result<CommandResult> {
        require_number("growth multiplier", multiplier)?;
        let params = multiplier.to_string();
        self.send_command("set-growth-multiplier", Some(&params)).await
    }

    /// Runs an arbitrary console command on the server.
    pub async fn custom(&mut self, console_command: &str) -> crate::Result<CommandResult> {
        require_text("command", console_command)?;
        self.send_command("custom", Some(console_command)).await
    }
}
