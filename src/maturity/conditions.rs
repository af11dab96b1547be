use super::answers::AnswerMap;
use super::questionnaire::{Condition, Indicator, Questionnaire};

impl Condition {
    /// An unconstrained condition always holds. Otherwise the dependency must be
    /// answered with the required value or one of the required values.
    pub fn is_satisfied_by(&self, answers: &AnswerMap) -> bool {
        if self.is_unconstrained() {
            return true;
        }

        let Some(answer) = answers.get(&self.depends_on) else {
            return false;
        };

        self.required_value.as_deref() == Some(answer)
            || self
                .required_values
                .as_ref()
                .is_some_and(|values| values.iter().any(|value| value == answer))
    }
}

pub fn is_eligible(indicator: &Indicator, answers: &AnswerMap) -> bool {
    indicator
        .condition
        .as_ref()
        .map_or(true, |condition| condition.is_satisfied_by(answers))
}

/// Ids of stored answers that belong to currently ineligible indicators, in
/// questionnaire order. Clearing one answer can make its dependents ineligible, so
/// the scan repeats on a scratch copy until nothing else goes stale.
pub fn stale_answers(questionnaire: &Questionnaire, answers: &AnswerMap) -> Vec<String> {
    let mut effective = answers.clone();
    let mut stale = Vec::new();

    loop {
        let newly_stale: Vec<String> = questionnaire
            .indicators()
            .filter(|indicator| effective.contains(&indicator.id))
            .filter(|indicator| !is_eligible(indicator, &effective))
            .map(|indicator| indicator.id.clone())
            .collect();

        if newly_stale.is_empty() {
            break;
        }

        for id in &newly_stale {
            effective.remove(id);
        }
        stale.extend(newly_stale);
    }

    stale.sort_by_key(|id| {
        questionnaire
            .indicators()
            .position(|indicator| &indicator.id == id)
    });
    stale
}
