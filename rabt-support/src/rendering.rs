//! Text rendering for container diagnostics.
//!
//! Error messages in rabt talk about types the user wrote, so these
//! helpers strip module paths, join resolution chains and rank
//! registered names against a missing one.

/// Separator placed between the links of a rendered resolution chain.
pub const CHAIN_ARROW: &str = " → ";

/// Joins the links of a resolution chain.
///
/// # Examples
/// ```
/// use rabt_support::rendering::render_chain;
///
/// let chain = ["ServiceA", "ServiceB", "ServiceA"];
/// assert_eq!(render_chain(&chain), "ServiceA → ServiceB → ServiceA");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    let mut out = String::new();
    for (i, link) in chain.iter().enumerate() {
        if i > 0 {
            out.push_str(CHAIN_ARROW);
        }
        out.push_str(link.as_ref());
    }
    out
}

/// Drops module paths from every path segment of a type name.
///
/// Generic arguments and trait objects keep their structure.
///
/// ```
/// use rabt_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("app::clock::SystemClock"), "SystemClock");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn app::clock::Clock>"),
///     "Arc<dyn Clock>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut out = String::with_capacity(full_name.len());
    // start of the current path inside `out`
    let mut segment_start = 0;
    let mut rest = full_name;

    while let Some(ch) = rest.chars().next() {
        if rest.starts_with("::") {
            out.truncate(segment_start);
            rest = &rest[2..];
            continue;
        }
        out.push(ch);
        if matches!(ch, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&') {
            segment_start = out.len();
        }
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Ranks `available` names by similarity to `requested`, best first.
///
/// Names are compared case-insensitively on their shortened form. A
/// candidate qualifies when one name contains the other, or when the
/// edit distance is at most a third of the longer name.
pub fn suggest_similar(requested: &str, available: &[&str], max_suggestions: usize) -> Vec<String> {
    let wanted = shorten_type_name(requested).to_lowercase();

    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .filter_map(|&candidate| {
            let short = shorten_type_name(candidate).to_lowercase();
            if short == wanted {
                return Some((0, candidate));
            }
            if short.contains(&wanted) || wanted.contains(&short) {
                return Some((1, candidate));
            }
            let distance = edit_distance(&wanted, &short);
            let longest = wanted.chars().count().max(short.chars().count());
            (distance * 3 <= longest).then_some((distance + 1, candidate))
        })
        .collect();

    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Levenshtein distance over chars, single row.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }

    row[b.len()]
}
