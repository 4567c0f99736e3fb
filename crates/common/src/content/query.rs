use url::form_urlencoded;

const PAIR_INDENT: &str = "    ";

/// Render already percent-decoded text as a prefix plus one line per
/// query pair.
///
/// The text is split on `?`: the first piece is the prefix and the last
/// piece is the query. Any pieces in between are dropped.
pub(super) fn render(decoded: &str) -> String {
    let prefix = decoded.split('?').next().unwrap_or_default();
    let query = decoded.rsplit('?').next().unwrap_or_default();

    let mut out = String::from(prefix);
    out.push('\n');
    let lines: Vec<String> = parse_pairs(query)
        .into_iter()
        .map(|(key, value)| format!("{PAIR_INDENT}{key} = {value}"))
        .collect();
    out.push_str(&lines.join("\n"));

    out.trim_end().to_string()
}

/// Parse `&`-delimited `key=value` pairs.
///
/// Pairs without a value are skipped. A repeated key keeps the position of
/// its first occurrence and the value of its last.
fn parse_pairs(query: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value.into_owned(),
            None => pairs.push((key.into_owned(), value.into_owned())),
        }
    }
    pairs
}
