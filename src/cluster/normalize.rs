use unicode_normalization::UnicodeNormalization;

/// Characters that carry title meaning: ASCII digits, ASCII lowercase letters and
/// CJK unified ideographs. Everything else is dropped by [`normalize_title`].
fn is_title_char(c: char) -> bool {
    c.is_ascii_digit() || c.is_ascii_lowercase() || ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Map a raw file stem to its canonical comparable form.
///
/// NFKC-fold, lowercase, then keep only [`is_title_char`] characters. Dropped segments
/// simply vanish, so `"A - 妈妈!"` becomes `"a妈妈"`.
pub fn normalize_title(raw: &str) -> String {
    raw.nfkc()
        .flat_map(char::to_lowercase)
        .filter(|c| is_title_char(*c))
        .collect()
}

/// Split a user supplied stopword list and normalize each entry.
///
/// Accepts commas, semicolons, whitespace and their full-width forms as separators.
/// Empty and duplicate entries are dropped; the result is sorted longest first so a
/// stopword is consumed before any shorter stopword it contains.
pub fn parse_stopwords(raw: &str) -> Vec<String> {
    let parts = raw.split(|c: char| {
        c.is_whitespace() || matches!(c, ',' | ';' | '，' | '；' | '、')
    });
    prepare_stopwords(parts)
}

/// Normalize, deduplicate and longest-first sort an already split stopword list.
pub fn prepare_stopwords<I, S>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for word in words {
        let token = normalize_title(word.as_ref());
        if token.is_empty() || out.contains(&token) {
            continue;
        }
        out.push(token);
    }
    // Stable: equal-length stopwords keep their supplied order.
    out.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    out
}

/// Replace every stopword occurrence with a space, then collapse and trim whitespace.
///
/// `stopwords` must already be normalized and sorted longest first.
pub fn strip_stopwords(text: &str, stopwords: &[String]) -> String {
    if stopwords.is_empty() {
        return text.to_string();
    }
    let mut cleaned = text.to_string();
    for word in stopwords {
        cleaned = cleaned.replace(word.as_str(), " ");
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Char length of the stopword-stripped text with the gaps removed.
pub fn cleaned_len(text: &str, stopwords: &[String]) -> usize {
    strip_stopwords(text, stopwords)
        .chars()
        .filter(|c| !c.is_whitespace())
        .count()
}
