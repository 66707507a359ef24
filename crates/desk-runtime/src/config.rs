use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Deployment settings shared by all request-type handlers.
pub struct BotConfig {
    /// Account name the bot posts and assigns under.
    pub bot_name: String,
    /// The bot's own directory reference; groups owned by it are
    /// maintained by automation and refuse manual change requests.
    pub bot_directory_ref: String,
    /// Directory group whose members may act without owner approval.
    pub support_group: String,
    /// Group whose members approve requests against ownerless groups.
    pub fallback_approver_group: String,
    /// Minutes quoted when telling users how long propagation takes.
    pub sync_delay_minutes: u32,
    /// Portal for creating a missing contact, quoted on failed adds.
    pub contact_portal_url: Option<String>,
    /// Portal for raising an ownership-change ticket.
    pub ownership_portal_url: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_name: "desk.bot".to_string(),
            bot_directory_ref: "ref=desk.bot".to_string(),
            support_group: "support".to_string(),
            fallback_approver_group: "support".to_string(),
            sync_delay_minutes: 15,
            contact_portal_url: None,
            ownership_portal_url: None,
        }
    }
}

impl BotConfig {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("failed to parse bot configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::BotConfig;

    #[test]
    fn unit_defaults_fill_missing_fields() {
        let config = BotConfig::from_toml_str("bot_name = \"helper.bot\"").expect("parse");
        assert_eq!(config.bot_name, "helper.bot");
        assert_eq!(config.support_group, "support");
        assert_eq!(config.sync_delay_minutes, 15);
        assert_eq!(config.contact_portal_url, None);
    }

    #[test]
    fn functional_full_config_round_trips() {
        let raw = r#"
bot_name = "helper.bot"
bot_directory_ref = "ref=helper.bot"
support_group = "it-services"
fallback_approver_group = "it-services"
sync_delay_minutes = 30
contact_portal_url = "https://desk.example.org/portal/create"
ownership_portal_url = "https://desk.example.org/portal/ownership"
"#;
        let config = BotConfig::from_toml_str(raw).expect("parse");
        assert_eq!(config.sync_delay_minutes, 30);
        assert_eq!(
            config.ownership_portal_url.as_deref(),
            Some("https://desk.example.org/portal/ownership")
        );
    }

    #[test]
    fn regression_unknown_fields_are_rejected() {
        assert!(BotConfig::from_toml_str("no_such_setting = true").is_err());
    }
}
