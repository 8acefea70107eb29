//! Pairwise duplicate / close-variant detection.
//!
//! Every unordered pair of rows is compared, so cost grows with n². That is
//! fine for catalogs of a few thousand rows. Larger catalogs must be split by
//! the host first (see [`SimilarityMatcher::compute_bucketed`]).

use crate::accessor::display_text;
use crate::tokenize::tokenize;
use facetgrid_types::{GridError, Row, SimilarityFacet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Row count above which a full pairwise scan is considered too slow for
/// the interactive path.
pub const SIMILARITY_ROW_CEILING: usize = 5_000;

/// `|A∩B| / |A∪B|`. Two empty sets are identical by convention.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatcher {
    /// Field whose tokens are compared.
    pub text_field: String,
    /// Secondary key; equal non-empty keys always match.
    pub key_field: String,
    pub threshold: f64,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self {
            text_field: "name".to_string(),
            key_field: "sku".to_string(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

struct Signature<'a> {
    id: &'a str,
    key: Option<String>,
    tokens: BTreeSet<String>,
}

impl SimilarityMatcher {
    pub fn validate(&self) -> Result<(), GridError> {
        if self.threshold.is_nan() || self.threshold <= 0.0 || self.threshold > 1.0 {
            return Err(GridError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    /// Scalars are read through their text form, so a numeric SKU or name
    /// takes part like a string one. Keys compare verbatim; only an empty
    /// key is absent.
    fn signature<'a>(&self, row: &'a Row) -> Signature<'a> {
        let key = row
            .get(&self.key_field)
            .and_then(display_text)
            .filter(|key| !key.is_empty());
        let tokens = row
            .get(&self.text_field)
            .and_then(display_text)
            .map(|text| tokenize(&text))
            .unwrap_or_default();
        Signature {
            id: &row.id,
            key,
            tokens,
        }
    }

    fn is_match(&self, a: &Signature<'_>, b: &Signature<'_>) -> bool {
        if let (Some(ka), Some(kb)) = (&a.key, &b.key)
            && ka == kb
        {
            return true;
        }
        jaccard(&a.tokens, &b.tokens) >= self.threshold
    }

    /// Compare counts for every row: how many *other* rows it matches.
    pub fn compute(&self, rows: &[Row]) -> BTreeMap<String, usize> {
        if rows.len() > SIMILARITY_ROW_CEILING {
            tracing::warn!(
                rows = rows.len(),
                ceiling = SIMILARITY_ROW_CEILING,
                "similarity scan above row ceiling; pre-bucket rows to keep it interactive"
            );
        }

        let signatures: Vec<Signature<'_>> = rows.iter().map(|row| self.signature(row)).collect();
        let mut counts = vec![0usize; signatures.len()];
        self.scan(&signatures, &(0..signatures.len()).collect::<Vec<_>>(), &mut counts);

        collect_counts(&signatures, &counts)
    }

    /// Like [`compute`](Self::compute), but rows are only compared with rows
    /// that share a bucket key. Rows whose bucket is `None` are compared with
    /// nothing and get a count of zero.
    pub fn compute_bucketed<F, K>(&self, rows: &[Row], bucket: F) -> BTreeMap<String, usize>
    where
        F: Fn(&Row) -> Option<K>,
        K: std::hash::Hash + Eq,
    {
        let signatures: Vec<Signature<'_>> = rows.iter().map(|row| self.signature(row)).collect();
        let mut counts = vec![0usize; signatures.len()];

        let mut buckets: HashMap<K, Vec<usize>> = HashMap::new();
        for (index, row) in rows.iter().enumerate() {
            if let Some(key) = bucket(row) {
                buckets.entry(key).or_default().push(index);
            }
        }
        for members in buckets.values() {
            self.scan(&signatures, members, &mut counts);
        }

        collect_counts(&signatures, &counts)
    }

    fn scan(&self, signatures: &[Signature<'_>], members: &[usize], counts: &mut [usize]) {
        for (pos, &i) in members.iter().enumerate() {
            for &j in &members[pos + 1..] {
                if self.is_match(&signatures[i], &signatures[j]) {
                    counts[i] += 1;
                    counts[j] += 1;
                }
            }
        }
    }

    /// Ids of the rows `row_id` is comparable to, in input order.
    pub fn matches_for(&self, rows: &[Row], row_id: &str) -> Vec<String> {
        let Some(target) = rows.iter().find(|row| row.id == row_id) else {
            return Vec::new();
        };
        let target = self.signature(target);

        rows.iter()
            .filter(|row| row.id != row_id)
            .filter(|row| self.is_match(&target, &self.signature(row)))
            .map(|row| row.id.clone())
            .collect()
    }

    /// Full facet for one epoch.
    pub fn build_facet(&self, epoch: u64, rows: &[Row]) -> SimilarityFacet {
        SimilarityFacet::new(epoch, self.compute(rows))
    }
}

fn collect_counts(signatures: &[Signature<'_>], counts: &[usize]) -> BTreeMap<String, usize> {
    signatures
        .iter()
        .zip(counts)
        .map(|(signature, &count)| (signature.id.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tokens: &[&str]) -> BTreeSet<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn product(id: &str, name: &str, sku: &str) -> Row {
        Row::new(id).with("name", name).with("sku", sku)
    }

    #[test]
    fn test_jaccard_basics() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 1.0);
        assert_eq!(jaccard(&set(&["gold"]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&["geo", "gold"]), &set(&["geo", "gold"])), 1.0);
        assert!((jaccard(&set(&["geo", "halskette"]), &set(&["geo", "gold", "halskette"])) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard_symmetry() {
        let samples = [
            set(&[]),
            set(&["ring"]),
            set(&["ring", "luna"]),
            set(&["luna", "gold", "silver"]),
        ];
        for a in &samples {
            for b in &samples {
                assert_eq!(jaccard(a, b), jaccard(b, a));
            }
        }
    }

    #[test]
    fn test_sku_match_counts_both_rows() {
        let rows = vec![
            product("1", "Halskette Geo", "A1"),
            product("2", "Halskette Geo Gold", "A1"),
            product("3", "Armband", "B2"),
        ];
        let counts = SimilarityMatcher::default().compute(&rows);
        assert_eq!(counts["1"], 1);
        assert_eq!(counts["2"], 1);
        assert_eq!(counts["3"], 0);
    }

    #[test]
    fn test_empty_sku_never_matches_by_key() {
        let rows = vec![
            product("1", "Ohrringe Stern", ""),
            product("2", "Armband Kette", ""),
        ];
        let counts = SimilarityMatcher::default().compute(&rows);
        assert_eq!(counts["1"], 0);
        assert_eq!(counts["2"], 0);
    }

    #[test]
    fn test_sku_compares_verbatim() {
        let rows = vec![
            product("1", "Ohrringe Stern", " A1"),
            product("2", "Armband Kette", "A1"),
        ];
        let counts = SimilarityMatcher::default().compute(&rows);
        assert_eq!(counts["1"], 0);
        assert_eq!(counts["2"], 0);
    }

    #[test]
    fn test_numeric_sku_matches() {
        let rows = vec![
            Row::new("1").with("name", "Ohrringe Stern").with("sku", 4006),
            Row::new("2").with("name", "Armband Kette").with("sku", 4006),
            Row::new("3").with("name", "Ring Luna").with("sku", "4006"),
        ];
        let counts = SimilarityMatcher::default().compute(&rows);
        assert_eq!(counts["1"], 2);
        assert_eq!(counts["2"], 2);
        assert_eq!(counts["3"], 2);
    }

    #[test]
    fn test_numeric_names_are_tokenized() {
        let rows = vec![
            Row::new("1").with("name", 1001),
            Row::new("2").with("name", 2002),
            Row::new("3").with("name", "1001"),
        ];
        let counts = SimilarityMatcher::default().compute(&rows);
        assert_eq!(counts["1"], 1);
        assert_eq!(counts["2"], 0);
        assert_eq!(counts["3"], 1);
    }

    #[test]
    fn test_rows_without_tokens_match_each_other() {
        let rows = vec![
            Row::new("1").with("name", "XL"),
            Row::new("2"),
            Row::new("3").with("name", "Silberring"),
        ];
        let counts = SimilarityMatcher::default().compute(&rows);
        assert_eq!(counts["1"], 1);
        assert_eq!(counts["2"], 1);
        assert_eq!(counts["3"], 0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // {ring, luna} vs {ring, sol}: 1/3. {ring, luna} vs {ring, luna, sol}: 2/3.
        let rows = vec![
            product("1", "Ring Luna", ""),
            product("2", "Ring Sol", ""),
            product("3", "Ring Luna Sol", ""),
        ];
        let matcher = SimilarityMatcher {
            threshold: 2.0 / 3.0,
            ..SimilarityMatcher::default()
        };
        let counts = matcher.compute(&rows);
        assert_eq!(counts["1"], 1);
        assert_eq!(counts["2"], 1);
        assert_eq!(counts["3"], 2);
    }

    #[test]
    fn test_custom_fields() {
        let rows = vec![
            Row::new("1").with("title", "Charm Herz").with("ean", "400"),
            Row::new("2").with("title", "Anhänger").with("ean", "400"),
        ];
        let matcher = SimilarityMatcher {
            text_field: "title".to_string(),
            key_field: "ean".to_string(),
            threshold: 0.5,
        };
        assert_eq!(matcher.compute(&rows)["2"], 1);
    }

    #[test]
    fn test_bucketed_only_compares_within_bucket() {
        let rows = vec![
            product("1", "Ring Luna", "R-1"),
            product("2", "Ring Luna", "N-1"),
            product("3", "Ring Luna", "R-2"),
        ];
        let matcher = SimilarityMatcher::default();
        let counts = matcher.compute_bucketed(&rows, |row| {
            row.get_str("sku").and_then(|sku| sku.split('-').next()).map(str::to_string)
        });
        assert_eq!(counts["1"], 1);
        assert_eq!(counts["2"], 0);
        assert_eq!(counts["3"], 1);

        let unbucketed = matcher.compute(&rows);
        assert_eq!(unbucketed["2"], 2);
    }

    #[test]
    fn test_matches_for() {
        let rows = vec![
            product("1", "Halskette Geo", "A1"),
            product("2", "Halskette Geo Gold", "C3"),
            product("3", "Armband", "B2"),
        ];
        let matcher = SimilarityMatcher::default();
        assert_eq!(matcher.matches_for(&rows, "1"), vec!["2".to_string()]);
        assert!(matcher.matches_for(&rows, "3").is_empty());
        assert!(matcher.matches_for(&rows, "missing").is_empty());
    }

    #[test]
    fn test_validate_threshold() {
        let mut matcher = SimilarityMatcher::default();
        assert!(matcher.validate().is_ok());
        matcher.threshold = 0.0;
        assert_eq!(matcher.validate(), Err(GridError::InvalidThreshold(0.0)));
        matcher.threshold = 1.5;
        assert!(matcher.validate().is_err());
    }
}
