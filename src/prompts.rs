pub const QUIZ_QUESTION: &str = include_str!("../data/prompts/quiz_question.txt");
pub const SOLUTION: &str = include_str!("../data/prompts/solution.txt");
pub const RECOMMENDATIONS: &str = include_str!("../data/prompts/recommendations.txt");
pub const STUDY_PLAN: &str = include_str!("../data/prompts/study_plan.txt");
pub const QUOTE: &str = include_str!("../data/prompts/quote.txt");
pub const TUTOR_TURN: &str = include_str!("../data/prompts/tutor_turn.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
