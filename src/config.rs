use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub backend: Backend,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub log: Log,
}

#[derive(Debug, Deserialize, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Backend {
    /// REST server, e.g. `http://localhost:8080/api`.
    Remote { url: String },

    /// In-memory demo data, lost on exit.
    Local,
}

#[derive(Debug, Default, Deserialize)]
pub struct Session {
    /// Where the signed-in user is kept between runs. Without it the session
    /// only lives in memory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub level: String,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}
