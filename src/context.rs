// Runtime context resolution.
//
// A command starts from the values given on the command line, lets the
// theme's `zcli.themes.config.json` override the credentials, and then
// asks the user for whatever is still missing. The result carries the
// derived `origin` used by the API client.

use crate::error::{Result, ThemeError};
use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// File name looked up inside the theme directory.
pub const CONFIG_FILE_NAME: &str = "zcli.themes.config.json";

pub const SUBDOMAIN_PROMPT: &str = "Account subdomain or full URL (including protocol)";
pub const USERNAME_PROMPT: &str = "Account username (email)";
pub const PASSWORD_PROMPT: &str = "Account password";

/// Values supplied by the caller, usually straight from CLI flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlagValues {
    pub bind: String,
    pub host: String,
    pub port: u16,
    pub logs: bool,
    pub livereload: bool,
    pub subdomain: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Optional credential overrides read from the theme directory.
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ConfigFile {
    /// Load the config file for `theme_dir`. Returns `Ok(None)` when the
    /// file does not exist.
    pub fn load(theme_dir: &Path) -> Result<Option<Self>> {
        let path = theme_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!(path = %path.display(), "no theme config file");
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| ThemeError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config = serde_json::from_str(&raw)
            .map_err(|source| ThemeError::ConfigParse { path: path.clone(), source })?;
        info!(path = %path.display(), "loaded theme config file");
        Ok(Some(config))
    }
}

/// Whether prompts are limited to missing credentials or issued for all
/// of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PromptPolicy {
    /// Ask only for credentials that flags and config left empty.
    #[default]
    Missing,
    /// Ask for every credential; answers replace flag and config values.
    Always,
}

/// Source of interactive answers. The terminal implementation lives in
/// `ui`; tests pass closures with scripted answers.
pub trait Prompter {
    fn prompt(&mut self, label: &str) -> io::Result<String>;

    /// Ask for a secret. The terminal prompter hides the typed input.
    fn prompt_hidden(&mut self, label: &str) -> io::Result<String> {
        self.prompt(label)
    }
}

impl<F> Prompter for F
where
    F: FnMut(&str) -> io::Result<String>,
{
    fn prompt(&mut self, label: &str) -> io::Result<String> {
        self(label)
    }
}

/// Fully resolved connection context for one CLI invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct RuntimeContext {
    pub bind: String,
    pub host: String,
    pub port: u16,
    pub logs: bool,
    pub livereload: bool,
    pub subdomain: String,
    pub username: String,
    pub password: String,
    pub origin: String,
}

impl fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("bind", &self.bind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("logs", &self.logs)
            .field("livereload", &self.livereload)
            .field("subdomain", &self.subdomain)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("origin", &self.origin)
            .finish()
    }
}

/// Build the runtime context for `theme_dir`.
///
/// Credentials are layered flags, then config file, then prompt. A
/// malformed config file aborts before any prompt is shown.
pub fn resolve(
    theme_dir: &Path,
    flags: FlagValues,
    policy: PromptPolicy,
    prompter: &mut dyn Prompter,
) -> Result<RuntimeContext> {
    let FlagValues {
        bind,
        host,
        port,
        logs,
        livereload,
        mut subdomain,
        mut username,
        mut password,
    } = flags;

    if let Some(config) = ConfigFile::load(theme_dir)? {
        overwrite(&mut subdomain, config.subdomain);
        overwrite(&mut username, config.username);
        overwrite(&mut password, config.password);
    }

    let subdomain = fill(subdomain, SUBDOMAIN_PROMPT, false, policy, prompter)?;
    let username = fill(username, USERNAME_PROMPT, false, policy, prompter)?;
    let password = fill(password, PASSWORD_PROMPT, true, policy, prompter)?;
    let origin = derive_origin(&subdomain);

    debug!(%origin, %username, "resolved runtime context");

    Ok(RuntimeContext {
        bind,
        host,
        port,
        logs,
        livereload,
        subdomain,
        username,
        password,
        origin,
    })
}

/// Turn a subdomain into the account origin. Anything with a
/// `scheme://` prefix passes through unchanged, so applying this to its
/// own output is a no-op.
pub fn derive_origin(subdomain: &str) -> String {
    if has_scheme_prefix(subdomain) {
        subdomain.to_string()
    } else {
        format!("https://{subdomain}.zendesk.com")
    }
}

fn has_scheme_prefix(value: &str) -> bool {
    let Some((scheme, _)) = value.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn is_missing(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn overwrite(slot: &mut Option<String>, value: Option<String>) {
    if !is_missing(&value) {
        *slot = value;
    }
}

fn fill(
    current: Option<String>,
    label: &str,
    hidden: bool,
    policy: PromptPolicy,
    prompter: &mut dyn Prompter,
) -> Result<String> {
    match current {
        Some(value) if policy == PromptPolicy::Missing && !value.is_empty() => Ok(value),
        _ if hidden => prompter.prompt_hidden(label).map_err(ThemeError::Prompt),
        _ => prompter.prompt(label).map_err(ThemeError::Prompt),
    }
}
