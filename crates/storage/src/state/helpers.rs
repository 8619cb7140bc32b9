// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

/// Look up by exact key, falling back to a unique prefix match.
///
/// Ambiguous prefixes resolve to `None`. The `job-` type prefix may be
/// omitted.
pub(crate) fn find_by_prefix<'a, V>(map: &'a HashMap<String, V>, id: &str) -> Option<&'a V> {
    if id.is_empty() {
        return None;
    }
    if let Some(v) = map.get(id) {
        return Some(v);
    }
    let mut matches = map.iter().filter(|(k, _)| {
        k.starts_with(id) || k.strip_prefix("job-").is_some_and(|suffix| suffix.starts_with(id))
    });
    match (matches.next(), matches.next()) {
        (Some((_, v)), None) => Some(v),
        _ => None,
    }
}
