//! Sequence-source flags shared by `fetch` and `url`.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use seqfetch_core::request::{FetchRequest, NamingMode};

use super::link::parse_link;

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Link to any one image of the sequence; base, token, and prefix are taken from it.
    #[arg(long, value_name = "URL", conflicts_with_all = ["base", "token", "prefix"])]
    pub link: Option<String>,

    /// Base address (directory URL, no trailing file name).
    #[arg(long, value_name = "URL", required_unless_present = "link")]
    pub base: Option<String>,

    /// Access token, appended verbatim after '?'.
    #[arg(long, value_name = "QUERY")]
    pub token: Option<String>,

    /// File-name prefix before "-NNN".
    #[arg(long, value_name = "PREFIX", required_unless_present = "link")]
    pub prefix: Option<String>,

    /// Naming mode; defaults to token when a token is given, else path.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Digits in the zero-padded index (default: from --link, else config).
    #[arg(long, value_name = "N")]
    pub width: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// `{base}/{prefix}-{NNN}{ext}?{token}`
    Token,
    /// `{base}/{prefix}-{NNN}{ext}`
    Path,
}

impl From<ModeArg> for NamingMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Token => NamingMode::TokenQuery,
            ModeArg::Path => NamingMode::PathOnly,
        }
    }
}

impl SourceArgs {
    /// Validated request starting at `start`. `default_width` applies when
    /// neither --width nor a link supplies one.
    pub fn to_request(&self, start: u64, default_width: usize) -> Result<FetchRequest> {
        let (base, token, prefix, hint) = match &self.link {
            Some(link) => {
                let parts = parse_link(link)?;
                (parts.base, parts.token, parts.prefix, parts.width_hint)
            }
            None => (
                self.base.clone().unwrap_or_default(),
                self.token.clone().unwrap_or_default(),
                self.prefix.clone().unwrap_or_default(),
                None,
            ),
        };
        let width = self.width.or(hint).unwrap_or(default_width);
        let mode = match self.mode {
            Some(m) => m.into(),
            None if token.is_empty() => NamingMode::PathOnly,
            None => NamingMode::TokenQuery,
        };
        FetchRequest::new(&base, &token, &prefix, start, width, mode)
            .context("invalid sequence source")
    }
}
