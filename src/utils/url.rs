// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

use crate::error::Result;

/// Return `base` with its `page` query parameter set to the given page.
///
/// Page 1 is the canonical entry URL, so the parameter is omitted for it.
pub fn with_page(base: &str, page: u32) -> Result<String> {
    let mut url = Url::parse(base)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        if page > 1 {
            pairs.append_pair("page", &page.to_string());
        }
    }

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url.to_string())
}
