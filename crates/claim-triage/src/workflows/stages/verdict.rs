use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Closed set of verdict strings; downstream consumers match on the exact text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictStatus {
    #[serde(rename = "долг верифицирован с 80% уверенностью")]
    Verified80,
    #[serde(rename = "долг условно верифицирован")]
    ConditionallyVerified,
    #[serde(rename = "долг не верифицирован")]
    NotVerified,
    #[serde(rename = "долг не верифицирован с 80% уверенностью, рекомендуем списание")]
    NotVerifiedWriteOff,
    #[serde(rename = "неопределённый результат")]
    Indeterminate,
    #[serde(
        rename = "долг условно верифицирован, необходимы дополнительные данные для верификации"
    )]
    ConditionalMoreData,
    #[serde(
        rename = "долг условно верифицирован, сумма долга не подтверждена судебным решением"
    )]
    ConditionalSumUnconfirmed,
    #[serde(
        rename = "долг не верифицирован юридически. имеются критические пороки, рекомендуем списание"
    )]
    LegallyNotVerified,
    #[serde(rename = "неопределённый результат юридической оценки")]
    LegalIndeterminate,
}

impl VerdictStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            VerdictStatus::Verified80 => "долг верифицирован с 80% уверенностью",
            VerdictStatus::ConditionallyVerified => "долг условно верифицирован",
            VerdictStatus::NotVerified => "долг не верифицирован",
            VerdictStatus::NotVerifiedWriteOff => {
                "долг не верифицирован с 80% уверенностью, рекомендуем списание"
            }
            VerdictStatus::Indeterminate => "неопределённый результат",
            VerdictStatus::ConditionalMoreData => {
                "долг условно верифицирован, необходимы дополнительные данные для верификации"
            }
            VerdictStatus::ConditionalSumUnconfirmed => {
                "долг условно верифицирован, сумма долга не подтверждена судебным решением"
            }
            VerdictStatus::LegallyNotVerified => {
                "долг не верифицирован юридически. имеются критические пороки, рекомендуем списание"
            }
            VerdictStatus::LegalIndeterminate => "неопределённый результат юридической оценки",
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub verified: bool,
    pub status: VerdictStatus,
    pub reason: String,
    /// Set only when the total fell outside every band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i32>,
}

/// How the reason text is built for a band.
#[derive(Debug, Clone, Copy)]
enum Reason {
    Fixed(&'static str),
    WithComments(&'static str),
}

type Band = (RangeInclusive<i32>, VerdictStatus, bool, Reason);

const STRUCTURAL_ADVANCE: &str = "Переход к юридической стадии верификации.";

fn structural_bands() -> [Band; 4] {
    [
        (11..=13, VerdictStatus::Verified80, true, Reason::Fixed(STRUCTURAL_ADVANCE)),
        (
            -37..=10,
            VerdictStatus::ConditionallyVerified,
            true,
            Reason::Fixed(STRUCTURAL_ADVANCE),
        ),
        (
            -109..=-93,
            VerdictStatus::NotVerified,
            false,
            Reason::WithComments("Долг не верифицирован."),
        ),
        (
            -148..=-110,
            VerdictStatus::NotVerifiedWriteOff,
            false,
            Reason::WithComments("Долг не верифицирован с 80% уверенностью, рекомендуем списание."),
        ),
    ]
}

fn legal_bands() -> [Band; 4] {
    [
        (
            5..=12,
            VerdictStatus::Verified80,
            true,
            Reason::Fixed("Переход к следующему этапу юридической верификации."),
        ),
        (
            -42..=4,
            VerdictStatus::ConditionalMoreData,
            true,
            Reason::Fixed(
                "Переход к следующему этапу юридической верификации. Необходим сбор дополнительных данных.",
            ),
        ),
        (
            -89..=-43,
            VerdictStatus::ConditionalSumUnconfirmed,
            true,
            Reason::Fixed(
                "Переход к следующему этапу юридической верификации. Требуется подтверждение суммы долга судебным решением.",
            ),
        ),
        (
            -250..=-90,
            VerdictStatus::LegallyNotVerified,
            false,
            Reason::WithComments(
                "Долг не верифицирован юридически, переход к следующему этапу невозможен.",
            ),
        ),
    ]
}

fn with_comments(headline: &str, comments: &[String]) -> String {
    format!("{headline}\nПричины:\n{}", comments.join("\n"))
        .trim()
        .to_string()
}

fn classify(
    bands: &[Band],
    points: i32,
    comments: &[String],
    fallback: (VerdictStatus, &str),
) -> VerificationVerdict {
    match bands.iter().find(|(range, ..)| range.contains(&points)) {
        Some((_, status, verified, reason)) => VerificationVerdict {
            verified: *verified,
            status: *status,
            reason: match reason {
                Reason::Fixed(text) => (*text).to_string(),
                Reason::WithComments(headline) => with_comments(headline, comments),
            },
            points: None,
        },
        None => {
            let (status, hint) = fallback;
            VerificationVerdict {
                verified: false,
                status,
                reason: with_comments(
                    &format!("Баллы ({points}) вне ожидаемых диапазонов. {hint}"),
                    comments,
                ),
                points: Some(points),
            }
        }
    }
}

pub fn structural_verdict(points: i32, comments: &[String]) -> VerificationVerdict {
    classify(
        &structural_bands(),
        points,
        comments,
        (VerdictStatus::Indeterminate, "Проверьте входные данные."),
    )
}

pub fn legal_verdict(points: i32, comments: &[String]) -> VerificationVerdict {
    classify(
        &legal_bands(),
        points,
        comments,
        (VerdictStatus::LegalIndeterminate, "Проверьте данные."),
    )
}
