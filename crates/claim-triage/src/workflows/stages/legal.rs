use tracing::debug;

use super::{finite, StageError, StageFactor, StageScore};

const CASE_AGE_LIMIT: f64 = 3.0;
const CLAIM_LIMIT: f64 = 3.0;
const CLAIM_GRACE_LIMIT: f64 = 3.33;
const SUM_RATIO_LOW: f64 = 0.7;
const SUM_RATIO_HIGH: f64 = 1.3;

const TERMS_MISSED: &str = "Долг не верифицирован, сроки подачи иска пропущены";
const TERMS_GRACE: &str = "Сроки подачи иска пропущены, однако если ИП прекращено по ст. 46 ч.1 п.3, и пристав не смог установить местонахождение или имущество должника — долг можно условно верифицировать.";
const SUBSIDIARY_LIABILITY: &str =
    "Взыскание возможно только при привлечении к субсидиарной ответственности при наличии активов у КДЛ.";
const LIQUIDATED: &str = "Компания ликвидирована (конкурсное производство), долг не верифицирован.";

/// Points for case-filing timing given the case age and time to claim, both in years.
///
/// Time to claim only matters for old cases against an active company.
pub fn evaluate_claim_terms(
    case_age: f64,
    company_status: &str,
    time_to_claim: Option<f64>,
) -> Result<StageScore, StageError> {
    let case_age = finite("case_age_years", case_age)?;
    let time_to_claim = time_to_claim
        .map(|years| finite("time_to_claim_years", years))
        .transpose()?;
    let status = company_status.to_lowercase();
    let active = status.contains("действ") && !status.contains("недейств");
    let excluded = status.contains("исключен");
    let factor = StageFactor::ClaimTerms;

    let score = if case_age < CASE_AGE_LIMIT {
        StageScore::scored(factor, 2, "")
    } else if case_age > CASE_AGE_LIMIT && active {
        match time_to_claim {
            Some(ttc) if ttc < CLAIM_LIMIT => StageScore::scored(factor, 1, ""),
            Some(ttc) if ttc > CLAIM_GRACE_LIMIT => StageScore::scored(factor, -100, TERMS_MISSED),
            Some(_) => StageScore::scored(factor, -5, TERMS_GRACE),
            None => StageScore::not_applicable(factor, "нет данных о сроке подачи иска"),
        }
    } else if excluded && ["реорган", "недостовер", "иное"].iter().any(|stem| status.contains(stem)) {
        StageScore::scored(factor, 1, SUBSIDIARY_LIABILITY)
    } else if excluded && status.contains("конкурс") {
        StageScore::scored(factor, -100, LIQUIDATED)
    } else {
        StageScore::not_applicable(factor, "нет подходящего условия для оценки сроков")
    };

    debug!(case_age, ?time_to_claim, points = score.points, "claim terms scored");
    Ok(score)
}

/// Points for how well the claimed sum matches the court-awarded one.
///
/// `case_sum` is the sum in the court decision; `sum_ratio` compares the claim against it.
pub fn evaluate_debt_confirmation(
    case_sum: Option<f64>,
    sum_ratio: Option<f64>,
) -> Result<StageScore, StageError> {
    let factor = StageFactor::DebtConfirmation;
    let case_sum = case_sum.map(|sum| finite("case_sum", sum)).transpose()?;
    let sum_ratio = sum_ratio.map(|ratio| finite("sum_ratio", ratio)).transpose()?;

    let score = match (case_sum, sum_ratio) {
        (None, _) => StageScore::scored(
            factor,
            -50,
            "сумма долга не подтверждена судебным решением, долг не верифицирован",
        ),
        (Some(sum), _) if sum > 0.0 => {
            StageScore::scored(factor, 2, "сумма долга подтверждена судебным решением")
        }
        (Some(_), Some(ratio)) if (SUM_RATIO_LOW..=SUM_RATIO_HIGH).contains(&ratio) => {
            StageScore::scored(factor, 2, "сумма долга близка к сумме в судебном решении")
        }
        (Some(_), Some(ratio)) if ratio > SUM_RATIO_HIGH => StageScore::scored(
            factor,
            -1,
            "сумма долга отличается от судебного решения и на 30% выше заявленной суммы",
        ),
        (Some(_), Some(_)) => StageScore::scored(
            factor,
            -1,
            "сумма долга отличается от судебного решения и на 30% ниже заявленной суммы",
        ),
        (Some(_), None) => StageScore::not_applicable(factor, "нет данных для оценки суммы долга"),
    };

    debug!(?case_sum, ?sum_ratio, points = score.points, "debt confirmation scored");
    Ok(score)
}

type CaseStatusRule = (&'static str, i32, &'static str);

/// Checked in order by case-insensitive containment.
const CASE_STATUS_RULES: [CaseStatusRule; 3] = [
    ("Судебное решение в силе", 5, ""),
    ("Дело оставлено без рассмотрения", 2, "повторно подать иск"),
    (
        "Отказ от иска со стороны кредитора",
        -100,
        "невозможно подать повторный иск, юридически долг не верифицирован",
    ),
];

pub fn evaluate_case_status(case_status: &str) -> StageScore {
    let lowered = case_status.to_lowercase();
    let score = CASE_STATUS_RULES
        .iter()
        .find(|(needle, _, _)| lowered.contains(&needle.to_lowercase()))
        .map(|(_, points, comment)| StageScore::scored(StageFactor::CaseStatus, *points, *comment))
        .unwrap_or_else(|| {
            StageScore::not_applicable(StageFactor::CaseStatus, "неизвестный статус дела")
        });

    debug!(case_status, points = score.points, "case status scored");
    score
}
