//! `seqfetch url` – dry run of address composition.

use anyhow::Result;
use seqfetch_core::request::FetchRequest;
use seqfetch_core::url_model::CandidateExtension;

pub fn run_url(request: &FetchRequest, index: u64, ext: &str) -> Result<()> {
    let ext: CandidateExtension = ext.parse()?;
    println!("{}", request.address_for(index, ext.as_str()));
    Ok(())
}
