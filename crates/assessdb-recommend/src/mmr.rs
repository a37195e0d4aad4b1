//! Maximal Marginal Relevance selection.

use assessdb_core::similarity::cosine_similarity;

/// Pick up to `k` candidate positions balancing relevance against redundancy.
///
/// `query_sims[i]` is the similarity of candidate `i` to the query and
/// `vectors[i]` its embedding. The first pick is the most query-similar
/// candidate; each later pick maximizes
/// `lambda * query_sim - (1 - lambda) * max_sim_to_selected`.
/// Ties go to the earlier candidate. Returned positions are in pick order.
pub fn maximal_marginal_relevance(query_sims: &[f32], vectors: &[Vec<f32>], k: usize, lambda: f32) -> Vec<usize> {
    let pool = query_sims.len().min(vectors.len());
    let target = k.min(pool);
    let mut selected = Vec::with_capacity(target);
    if target == 0 { return selected; }

    let mut remaining = vec![true; pool];
    let mut redundancy = vec![f32::NEG_INFINITY; pool];

    while selected.len() < target {
        let mut best: Option<(usize, f32)> = None;
        for i in (0..pool).filter(|&i| remaining[i]) {
            let score = if selected.is_empty() {
                query_sims[i]
            } else {
                lambda * query_sims[i] - (1.0 - lambda) * redundancy[i]
            };
            if best.is_none_or(|(_, s)| score > s) { best = Some((i, score)); }
        }
        let Some((pick, _)) = best else { break };
        remaining[pick] = false;
        selected.push(pick);
        for i in (0..pool).filter(|&i| remaining[i]) {
            redundancy[i] = redundancy[i].max(cosine_similarity(&vectors[i], &vectors[pick]));
        }
    }
    selected
}
