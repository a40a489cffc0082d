use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::workflows::statements::LineKey;

/// Identity of the nineteen financial risk markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarkerCode {
    M1,
    M2,
    M3,
    M4,
    M5,
    M6,
    M7,
    M8,
    M9,
    M10,
    M11,
    M12,
    M13,
    M14,
    M15,
    M16,
    M17,
    M18,
    M19,
}

impl MarkerCode {
    pub const ALL: [MarkerCode; 19] = [
        MarkerCode::M1,
        MarkerCode::M2,
        MarkerCode::M3,
        MarkerCode::M4,
        MarkerCode::M5,
        MarkerCode::M6,
        MarkerCode::M7,
        MarkerCode::M8,
        MarkerCode::M9,
        MarkerCode::M10,
        MarkerCode::M11,
        MarkerCode::M12,
        MarkerCode::M13,
        MarkerCode::M14,
        MarkerCode::M15,
        MarkerCode::M16,
        MarkerCode::M17,
        MarkerCode::M18,
        MarkerCode::M19,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            MarkerCode::M1 => "M1",
            MarkerCode::M2 => "M2",
            MarkerCode::M3 => "M3",
            MarkerCode::M4 => "M4",
            MarkerCode::M5 => "M5",
            MarkerCode::M6 => "M6",
            MarkerCode::M7 => "M7",
            MarkerCode::M8 => "M8",
            MarkerCode::M9 => "M9",
            MarkerCode::M10 => "M10",
            MarkerCode::M11 => "M11",
            MarkerCode::M12 => "M12",
            MarkerCode::M13 => "M13",
            MarkerCode::M14 => "M14",
            MarkerCode::M15 => "M15",
            MarkerCode::M16 => "M16",
            MarkerCode::M17 => "M17",
            MarkerCode::M18 => "M18",
            MarkerCode::M19 => "M19",
        }
    }

    /// Analyst-facing marker title.
    pub const fn name(self) -> &'static str {
        match self {
            MarkerCode::M1 => "Отрицательный собственный капитал",
            MarkerCode::M2 => "Низкая текущая ликвидность",
            MarkerCode::M3 => "Низкая быстрая ликвидность",
            MarkerCode::M4 => "Низкая абсолютная ликвидность",
            MarkerCode::M5 => "Существенное сокращение основных средств",
            MarkerCode::M6 => "Перевод активов в долгосрочные финансовые вложения",
            MarkerCode::M7 => "«Застывшая» дебиторская задолженность",
            MarkerCode::M8 => "Резкий рост кредиторской задолженности при падении выручки",
            MarkerCode::M9 => "Денег крайне мало относительно кредиторской задолженности",
            MarkerCode::M10 => "Чрезмерная долговая нагрузка и слабое покрытие процентов",
            MarkerCode::M11 => "Запасы растут, а выручка падает",
            MarkerCode::M12 => "Крупные сдвиги в структуре активов",
            MarkerCode::M13 => "Проблемы с отчётностью",
            MarkerCode::M14 => "Сводный признак обязанности подать заявление о банкротстве",
            MarkerCode::M15 => "Падение доли основных средств в активах",
            MarkerCode::M16 => "Рост краткосрочных финансовых вложений",
            MarkerCode::M17 => "Оборотные активы не растут, а кредиторская задолженность растёт",
            MarkerCode::M18 => "Структурные несоответствия",
            MarkerCode::M19 => "Внебалансовые индикаторы из смежных реестров",
        }
    }
}

/// Severity band; only the current-liquidity marker grades its finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Elevated,
    Normal,
}

/// Outcome of a single marker evaluation with its audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerResult {
    pub code: MarkerCode,
    pub name: String,
    pub triggered: bool,
    pub points: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub why: String,
    pub values: Value,
    pub not_applicable: bool,
}

impl MarkerResult {
    pub fn triggered(code: MarkerCode, points: i32, why: impl Into<String>, values: Value) -> Self {
        Self {
            code,
            name: code.name().to_string(),
            triggered: true,
            points,
            severity: None,
            why: why.into(),
            values,
            not_applicable: false,
        }
    }

    pub fn clear(code: MarkerCode, why: impl Into<String>, values: Value) -> Self {
        Self {
            code,
            name: code.name().to_string(),
            triggered: false,
            points: 0,
            severity: None,
            why: why.into(),
            values,
            not_applicable: false,
        }
    }

    pub fn not_applicable(code: MarkerCode, why: impl Into<String>, values: Value) -> Self {
        Self {
            code,
            name: code.name().to_string(),
            triggered: false,
            points: 0,
            severity: None,
            why: why.into(),
            values,
            not_applicable: true,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Off-balance signals from tax and statistics registries, keyed by year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySignals {
    #[serde(default)]
    pub property_tax: BTreeMap<i32, f64>,
    #[serde(default)]
    pub transport_tax: BTreeMap<i32, f64>,
    #[serde(default)]
    pub egrul_active: BTreeMap<i32, bool>,
    #[serde(default)]
    pub rosstat_active: BTreeMap<i32, bool>,
}

/// Incrementally assembled `values` block, keyed by year strings.
#[derive(Debug, Default)]
pub(crate) struct Audit {
    years: BTreeMap<i32, Map<String, Value>>,
    notes: Map<String, Value>,
}

impl Audit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(mut self, year: i32, key: LineKey, value: Option<f64>) -> Self {
        self.years
            .entry(year)
            .or_default()
            .insert(key.to_string(), number(value));
        self
    }

    pub(crate) fn lines<const N: usize>(
        mut self,
        year: i32,
        keys: [LineKey; N],
        values: [f64; N],
    ) -> Self {
        let entry = self.years.entry(year).or_default();
        for (key, value) in keys.into_iter().zip(values) {
            entry.insert(key.to_string(), number(Some(value)));
        }
        self
    }

    pub(crate) fn metric(mut self, year: i32, name: &str, value: Option<f64>) -> Self {
        self.years
            .entry(year)
            .or_default()
            .insert(name.to_string(), number(value));
        self
    }

    pub(crate) fn note(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.notes.insert(name.to_string(), value.into());
        self
    }

    pub(crate) fn into_value(self) -> Value {
        let mut root = self.notes;
        for (year, entries) in self.years {
            root.insert(year.to_string(), Value::Object(entries));
        }
        Value::Object(root)
    }
}

fn number(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
