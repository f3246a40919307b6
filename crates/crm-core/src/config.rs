use std::{env, fs, path::Path};

use crate::{errors::Error, Result};

/// Typed process configuration.
///
/// The process refuses to start when a required variable is missing, so every
/// later use can assume the values are present and non-empty.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    /// Shared secret for the HTTP surface (`x-api-key` header / `api_key` query).
    pub api_secret_key: String,
    /// Operator chat identities. Also the recipients of new-client notices.
    pub admin_chat_ids: Vec<i64>,
    /// Exact-match, case-sensitive payment confirmation password.
    pub payment_password: String,
    pub api_port: u16,
    /// Link offered on the public package cards.
    pub contact_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = require("BOT_TOKEN")?;
        let api_secret_key = require("API_SECRET_KEY")?;
        let payment_password = require("PAYMENT_PASSWORD")?;

        let admin_chat_ids = parse_csv_i64(env_str("ADMIN_IDS"));
        if admin_chat_ids.is_empty() {
            return Err(Error::Config(
                "ADMIN_IDS environment variable is required".to_string(),
            ));
        }

        let api_port = match env_str("API_PORT") {
            None => 3000,
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("API_PORT is not a valid port: {raw}")))?,
        };

        let contact_url =
            env_str("CONTACT_URL").unwrap_or_else(|| "https://t.me/forgerjunior".to_string());

        Ok(Self {
            bot_token,
            api_secret_key,
            admin_chat_ids,
            payment_password,
            api_port,
            contact_url,
        })
    }

    pub fn is_admin(&self, chat_id: i64) -> bool {
        self.admin_chat_ids.contains(&chat_id)
    }
}

fn require(key: &str) -> Result<String> {
    env_str(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}
