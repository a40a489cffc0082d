use serde::{Deserialize, Serialize};

/// Taxpayer number as it arrives from intake forms: text or a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DebtorInn {
    Number(u64),
    Text(String),
}

impl DebtorInn {
    fn is_blank(&self) -> bool {
        match self {
            DebtorInn::Number(_) => false,
            DebtorInn::Text(text) => text.trim().is_empty(),
        }
    }
}

/// Raw intake fields checked before any scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceInput {
    #[serde(default)]
    pub contract_existence: Option<bool>,
    #[serde(default)]
    pub legality_debt_transfer: Option<bool>,
    #[serde(default)]
    pub debt_sum: Option<f64>,
    #[serde(default)]
    pub debtor_inn: Option<DebtorInn>,
    #[serde(default)]
    pub debtor_name: Option<String>,
}

/// Which intake fields are usable. Answers themselves are not judged here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPresence {
    pub contract_existence: bool,
    pub legality_debt_transfer: bool,
    pub debt_sum: bool,
    pub debtor_inn: bool,
    pub debtor_name: bool,
}

impl DataPresence {
    pub fn is_complete(&self) -> bool {
        self.contract_existence
            && self.legality_debt_transfer
            && self.debt_sum
            && self.debtor_inn
            && self.debtor_name
    }
}

pub fn check_presence(input: &PresenceInput) -> DataPresence {
    DataPresence {
        contract_existence: input.contract_existence.is_some(),
        legality_debt_transfer: input.legality_debt_transfer.is_some(),
        debt_sum: input
            .debt_sum
            .is_some_and(|sum| sum.is_finite() && sum > 0.0),
        debtor_inn: input.debtor_inn.as_ref().is_some_and(|inn| !inn.is_blank()),
        debtor_name: input
            .debtor_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty()),
    }
}
