use std::cmp::Ordering;
use std::collections::HashMap;

use crate::core::config::ResultCaps;
use crate::core::matcher::ScoredCandidate;
use crate::core::tiers::Tier;

/// Capped, tiered output of the assembly stage
#[derive(Debug, Clone, Default)]
pub struct TieredResults {
    pub tailored: Vec<ScoredCandidate>,
    pub recommended: Vec<ScoredCandidate>,
    pub exploratory: Vec<ScoredCandidate>,
    /// Tailored, recommended, then exploratory, truncated to the overall cap
    pub all: Vec<ScoredCandidate>,
}

/// Order by descending score; ties fall back to ascending id
pub fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

/// Keep at most `max_per_org` entries from each issuing organization
///
/// Input must already be in rank order; kept entries retain that order.
pub fn enforce_org_diversity(items: Vec<ScoredCandidate>, max_per_org: usize) -> Vec<ScoredCandidate> {
    let mut per_org: HashMap<String, usize> = HashMap::new();
    items
        .into_iter()
        .filter(|item| {
            let count = per_org.entry(item.candidate.organization.clone()).or_insert(0);
            if *count >= max_per_org {
                return false;
            }
            *count += 1;
            true
        })
        .collect()
}

/// Recommended-tier cap after reallocating capacity a sparse tailored tier left unused
#[inline]
pub fn recommended_cap(tailored_len: usize, caps: &ResultCaps) -> usize {
    if tailored_len < caps.sparse_tailored {
        caps.recommended + caps.tailored.saturating_sub(tailored_len)
    } else {
        caps.recommended
    }
}

/// Split ranked candidates into tiers, then apply diversity and size caps
///
/// This pass depends on global rank and must run sequentially.
pub fn assemble(mut scored: Vec<ScoredCandidate>, caps: &ResultCaps) -> TieredResults {
    scored.sort_by(rank_order);

    let mut tailored = Vec::new();
    let mut recommended = Vec::new();
    let mut exploratory = Vec::new();
    for item in scored {
        match item.tier {
            Tier::Tailored => tailored.push(item),
            Tier::Recommended => recommended.push(item),
            Tier::Exploratory => exploratory.push(item),
            Tier::Excluded => {}
        }
    }

    let mut tailored = enforce_org_diversity(tailored, caps.per_organization);
    let mut recommended = enforce_org_diversity(recommended, caps.per_organization);
    let mut exploratory = enforce_org_diversity(exploratory, caps.per_organization);

    let recommended_limit = recommended_cap(tailored.len(), caps);
    tailored.truncate(caps.tailored);
    recommended.truncate(recommended_limit);
    exploratory.truncate(caps.exploratory);

    let all = tailored
        .iter()
        .chain(recommended.iter())
        .chain(exploratory.iter())
        .take(caps.total)
        .cloned()
        .collect();

    TieredResults {
        tailored,
        recommended,
        exploratory,
        all,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candidate;

    fn scored(id: &str, org: &str, score: f64, tier: Tier) -> ScoredCandidate {
        ScoredCandidate {
            candidate: Candidate::new(id, format!("Program {}", id), org),
            score,
            tier,
            match_score: score,
            coverage_factor: 1.0,
            confidence: 0.8,
            breakdown: vec![],
        }
    }

    #[test]
    fn test_org_diversity_keeps_top_entries() {
        let items = vec![
            scored("a", "org1", 0.9, Tier::Tailored),
            scored("b", "org1", 0.8, Tier::Tailored),
            scored("c", "org2", 0.75, Tier::Tailored),
            scored("d", "org1", 0.7, Tier::Tailored),
            scored("e", "org1", 0.68, Tier::Tailored),
        ];

        let kept = enforce_org_diversity(items, 3);
        let ids: Vec<&str> = kept.iter().map(|s| s.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_recommended_cap_reallocation() {
        let caps = ResultCaps::default();
        assert_eq!(recommended_cap(1, &caps), 49);
        assert_eq!(recommended_cap(0, &caps), 50);
        assert_eq!(recommended_cap(3, &caps), 30);
    }

    #[test]
    fn test_rank_order_ties_break_by_id() {
        let mut items = vec![
            scored("b", "org", 0.5, Tier::Recommended),
            scored("a", "org", 0.5, Tier::Recommended),
            scored("c", "org", 0.7, Tier::Recommended),
        ];
        items.sort_by(rank_order);
        let ids: Vec<&str> = items.iter().map(|s| s.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_assemble_respects_tier_order_and_total_cap() {
        let caps = ResultCaps {
            total: 4,
            ..ResultCaps::default()
        };
        let items = vec![
            scored("e1", "o5", 0.30, Tier::Exploratory),
            scored("r1", "o3", 0.50, Tier::Recommended),
            scored("t1", "o1", 0.70, Tier::Tailored),
            scored("r2", "o4", 0.45, Tier::Recommended),
            scored("t2", "o2", 0.66, Tier::Tailored),
            scored("x1", "o6", 0.90, Tier::Excluded),
        ];

        let result = assemble(items, &caps);
        let ids: Vec<&str> = result.all.iter().map(|s| s.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "r1", "r2"]);
        assert_eq!(result.exploratory.len(), 1);
    }

    #[test]
    fn test_sparse_tailored_grows_recommended() {
        let mut items = vec![scored("t", "org-t", 0.9, Tier::Tailored)];
        for i in 0..60 {
            items.push(scored(&format!("r{:02}", i), &format!("org{}", i), 0.5, Tier::Recommended));
        }

        let result = assemble(items, &ResultCaps::default());
        assert_eq!(result.tailored.len(), 1);
        assert_eq!(result.recommended.len(), 49);
        assert_eq!(result.all.len(), 50);
    }
}
