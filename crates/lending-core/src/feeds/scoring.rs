use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::progression::{AccountId, ScoredAccount};

pub const FIRST_IMPORTED_USER_ID: u32 = 101;

/// One row of the scoring table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRow {
    pub user_id: u32,
    pub point_score: Decimal,
    pub percentage: Decimal,
}

impl ScoringRow {
    pub fn to_scored_account(&self) -> ScoredAccount {
        ScoredAccount {
            account_id: AccountId(self.user_id.to_string()),
            total_score: self.point_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub x: usize,
    pub y: Decimal,
}

/// Point-score and percentage series indexed from 1 in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSeries {
    pub point_scores: Vec<ScorePoint>,
    pub percentages: Vec<ScorePoint>,
}

pub fn score_series(rows: &[ScoringRow]) -> ScoreSeries {
    let indexed = || rows.iter().enumerate().map(|(idx, row)| (idx + 1, row));

    ScoreSeries {
        point_scores: indexed()
            .map(|(x, row)| ScorePoint {
                x,
                y: row.point_score,
            })
            .collect(),
        percentages: indexed()
            .map(|(x, row)| ScorePoint {
                x,
                y: row.percentage,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn series_is_one_based_in_feed_order() {
        let rows = vec![
            ScoringRow {
                user_id: 101,
                point_score: dec!(610),
                percentage: dec!(0.61),
            },
            ScoringRow {
                user_id: 102,
                point_score: dec!(742),
                percentage: dec!(0.74),
            },
        ];
        let series = score_series(&rows);
        assert_eq!(series.point_scores[0], ScorePoint { x: 1, y: dec!(610) });
        assert_eq!(series.percentages[1], ScorePoint { x: 2, y: dec!(0.74) });
    }

    #[test]
    fn scored_account_uses_user_id_and_point_score() {
        let row = ScoringRow {
            user_id: 184,
            point_score: dec!(742),
            percentage: dec!(0.74),
        };
        let account = row.to_scored_account();
        assert_eq!(account.account_id, AccountId("184".to_string()));
        assert_eq!(account.total_score, dec!(742));
    }
}
