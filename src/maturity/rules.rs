use super::answers::AnswerMap;
use super::conditions::is_eligible;
use super::questionnaire::{Dimension, Indicator, Questionnaire, Subdimension, NOT_APPLICABLE};
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Earned and achievable points for one node of the questionnaire tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreNode {
    pub earned: f64,
    pub max: f64,
}

impl ScoreNode {
    pub const EMPTY: ScoreNode = ScoreNode {
        earned: 0.0,
        max: 0.0,
    };

    pub fn new(earned: f64, max: f64) -> Self {
        Self { earned, max }
    }

    /// Share of achievable points earned, on a 0-100 scale. A node with nothing
    /// achievable scores exactly 0.
    pub fn percentage(&self) -> f64 {
        if self.max > 0.0 {
            self.earned / self.max * 100.0
        } else {
            0.0
        }
    }
}

impl Add for ScoreNode {
    type Output = ScoreNode;

    fn add(self, rhs: ScoreNode) -> ScoreNode {
        ScoreNode {
            earned: self.earned + rhs.earned,
            max: self.max + rhs.max,
        }
    }
}

impl AddAssign for ScoreNode {
    fn add_assign(&mut self, rhs: ScoreNode) {
        self.earned += rhs.earned;
        self.max += rhs.max;
    }
}

impl Sum for ScoreNode {
    fn sum<I: Iterator<Item = ScoreNode>>(iter: I) -> ScoreNode {
        iter.fold(ScoreNode::EMPTY, Add::add)
    }
}

pub fn score_indicator(indicator: &Indicator, answers: &AnswerMap) -> ScoreNode {
    if !is_eligible(indicator, answers) {
        return ScoreNode::EMPTY;
    }

    match answers.get(&indicator.id) {
        Some(NOT_APPLICABLE) => ScoreNode::EMPTY,
        Some(answer) => {
            let earned = indicator.option(answer).map_or(0.0, |option| option.points);
            ScoreNode::new(earned, indicator.max_points())
        }
        None => ScoreNode::new(0.0, indicator.max_points()),
    }
}

pub fn score_subdimension(subdimension: &Subdimension, answers: &AnswerMap) -> ScoreNode {
    subdimension
        .indicators
        .iter()
        .map(|indicator| score_indicator(indicator, answers))
        .sum()
}

pub fn score_dimension(dimension: &Dimension, answers: &AnswerMap) -> ScoreNode {
    dimension
        .subdimensions
        .iter()
        .map(|subdimension| score_subdimension(subdimension, answers))
        .sum()
}

/// Sums the dimensions accepted by `applied`; the rest add nothing to either side.
pub fn score_global<F>(questionnaire: &Questionnaire, answers: &AnswerMap, applied: F) -> ScoreNode
where
    F: Fn(&Dimension) -> bool,
{
    questionnaire
        .dimensions()
        .iter()
        .filter(|dimension| applied(dimension))
        .map(|dimension| score_dimension(dimension, answers))
        .sum()
}

/// Answer completion counts. Not Applicable counts as answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub eligible: usize,
    pub answered: usize,
}

impl AddAssign for Progress {
    fn add_assign(&mut self, rhs: Progress) {
        self.eligible += rhs.eligible;
        self.answered += rhs.answered;
    }
}

pub fn dimension_progress(dimension: &Dimension, answers: &AnswerMap) -> Progress {
    let mut progress = Progress::default();
    for indicator in dimension.indicators() {
        if !is_eligible(indicator, answers) {
            continue;
        }
        progress.eligible += 1;
        let answered = answers
            .get(&indicator.id)
            .is_some_and(|answer| answer == NOT_APPLICABLE || indicator.option(answer).is_some());
        if answered {
            progress.answered += 1;
        }
    }
    progress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_of_empty_node_is_zero() {
        assert_eq!(ScoreNode::EMPTY.percentage(), 0.0);
        assert!(!ScoreNode::new(5.0, 0.0).percentage().is_nan());
    }

    #[test]
    fn nodes_sum_component_wise() {
        let total: ScoreNode = [ScoreNode::new(10.0, 25.0), ScoreNode::new(25.0, 25.0)]
            .into_iter()
            .sum();

        assert_eq!(total, ScoreNode::new(35.0, 50.0));
        assert_eq!(total.percentage(), 70.0);
    }
}
