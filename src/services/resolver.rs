// src/services/resolver.rs
use std::collections::HashMap;

use crate::models::CatalogEntry;

pub const DEFAULT_SIMILARITY_CUTOFF: f64 = 0.6;

/// Brands most searched on the Brazilian market, listed first in pickers.
const PRIORITY_BRANDS: &[&str] = &[
    "VW", "Fiat", "Chevrolet", "Toyota", "Ford", "Honda", "Hyundai", "Renault",
    "Nissan", "Jeep", "Peugeot", "Citroën", "Mitsubishi",
];

/// First entry whose name contains `query`, ignoring case. Upstream order is
/// kept, so the first match wins even when a later one is closer.
pub fn find_by_name<'a>(entries: &'a [CatalogEntry], query: &str) -> Option<&'a CatalogEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    entries
        .iter()
        .find(|entry| entry.name.to_lowercase().contains(&needle))
}

/// Year options look like `2012 Flex` with codes like `2012-1`.
pub fn find_year<'a>(entries: &'a [CatalogEntry], year: &str) -> Option<&'a CatalogEntry> {
    let wanted = year.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    let exact = entries.iter().find(|entry| {
        entry.name.trim().to_lowercase() == wanted || entry.code.trim().to_lowercase() == wanted
    });
    if exact.is_some() {
        return exact;
    }

    let prefix = format!("{} ", wanted);
    entries
        .iter()
        .find(|entry| entry.name.trim().to_lowercase().starts_with(&prefix))
}

/// Best candidate scoring at least `cutoff`. On equal scores the
/// lexicographically greater name wins, whatever the upstream order.
pub fn closest_match<'a>(
    entries: &'a [CatalogEntry],
    query: &str,
    cutoff: f64,
) -> Option<&'a CatalogEntry> {
    let mut best: Option<(&CatalogEntry, f64)> = None;
    for entry in entries {
        let score = similarity(&entry.name, query);
        if score < cutoff {
            continue;
        }
        match best {
            Some((kept, best_score))
                if best_score > score || (best_score == score && kept.name >= entry.name) => {}
            _ => best = Some((entry, score)),
        }
    }
    best.map(|(entry, _)| entry)
}

/// Ratcliff/Obershelp ratio: `2 * matched / (len(a) + len(b))`, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, ch) in b.iter().enumerate() {
        b2j.entry(*ch).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

// Longest common block in a[alo..ahi] x b[blo..bhi]; earliest in `a` wins ties.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(ch) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                next.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = next;
    }

    (best_i, best_j, best_size)
}

/// Popular brands first (upstream order), then everything else by name.
pub fn prioritize_brands(entries: &[CatalogEntry]) -> Vec<CatalogEntry> {
    let (mut main, mut rest): (Vec<CatalogEntry>, Vec<CatalogEntry>) =
        entries.iter().cloned().partition(|entry| {
            PRIORITY_BRANDS.iter().any(|p| entry.name.contains(p))
        });
    rest.sort_by(|a, b| a.name.cmp(&b.name));
    main.append(&mut rest);
    main
}
