use super::domain::ScoredAccount;

/// Highest scoring accounts, at most `n` of them. Equal scores keep their
/// relative input order.
pub fn top_n(accounts: &[ScoredAccount], n: usize) -> Vec<ScoredAccount> {
    let mut ranked = accounts.to_vec();
    ranked.sort_by(|left, right| right.total_score.cmp(&left.total_score));
    ranked.truncate(n);
    ranked
}
