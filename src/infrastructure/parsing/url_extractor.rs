//! Pull product URLs out of free-form pasted text

use tracing::debug;

const SCHEMES: [&str; 2] = ["https://", "http://"];

/// Unify line breaks and drop non-breaking spaces the way pasted
/// spreadsheet and mail content tends to need it
fn normalize_whitespace(text: &str) -> String {
    text.replace('\r', "\n")
        .replace(['\u{2028}', '\u{2029}'], "\n")
        .replace('\u{a0}', "")
        .trim()
        .to_string()
}

/// Byte offsets of every scheme marker in `text`, in order
fn scheme_offsets(text: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = SCHEMES
        .iter()
        .flat_map(|scheme| text.match_indices(scheme).map(|(offset, _)| offset))
        .collect();
    offsets.sort_unstable();
    offsets
}

/// Extract URLs in order of appearance.
///
/// Each `http://` or `https://` marker starts a URL that runs up to the next
/// whitespace or the next marker. Text before the first marker is ignored,
/// and a marker with nothing after it is dropped.
pub fn extract_urls(text: &str) -> Vec<String> {
    let text = normalize_whitespace(text);
    let offsets = scheme_offsets(&text);

    offsets
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = offsets.get(i + 1).copied().unwrap_or(text.len());
            let fragment = &text[start..end];
            let url = fragment
                .split(char::is_whitespace)
                .next()
                .unwrap_or_default()
                .trim();

            let scheme_len = SCHEMES
                .iter()
                .find(|scheme| url.starts_with(*scheme))
                .map_or(0, |scheme| scheme.len());

            if url.len() <= scheme_len {
                debug!("Dropping empty URL fragment at offset {}", start);
                None
            } else {
                Some(url.to_string())
            }
        })
        .collect()
}
