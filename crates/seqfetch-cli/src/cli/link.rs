//! Splitting a pasted image link into base address, token, and prefix.
//!
//! `https://cdn.example.com/a/b/album-007.jpg?tok=1` yields base
//! `https://cdn.example.com/a/b`, token `tok=1`, prefix `album`, and a
//! width hint of 3 taken from the digits after the last '-'.

use anyhow::{anyhow, bail, Result};
use url::{Position, Url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkParts {
    pub base: String,
    /// Raw query without the leading '?'; empty when the link has none.
    pub token: String,
    pub prefix: String,
    /// Number of digits in the link's index, when it has one.
    pub width_hint: Option<usize>,
}

pub fn parse_link(link: &str) -> Result<LinkParts> {
    let url = Url::parse(link.trim()).map_err(|e| anyhow!("invalid link {:?}: {}", link, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("link must be http or https: {}", link);
    }

    let (dir, file_name) = url
        .path()
        .rsplit_once('/')
        .ok_or_else(|| anyhow!("link has no path: {}", link))?;
    if file_name.is_empty() {
        bail!("link does not name a file: {}", link);
    }
    let (prefix, numbered) = file_name
        .rsplit_once('-')
        .ok_or_else(|| anyhow!("file name {:?} has no '-' before its index", file_name))?;
    if prefix.is_empty() {
        bail!("file name {:?} has an empty prefix", file_name);
    }

    let digits = numbered
        .split('.')
        .next()
        .unwrap_or_default()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .count();

    Ok(LinkParts {
        base: format!("{}{}", &url[..Position::BeforePath], dir),
        token: url.query().unwrap_or_default().to_string(),
        prefix: prefix.to_string(),
        width_hint: (digits > 0).then_some(digits),
    })
}
