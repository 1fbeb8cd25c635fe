use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Profitability bands used by the dashboard histogram. Bounds follow the
/// half-open convention `(lower, upper]` going down from the top band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitabilityBand {
    Above20,
    From10To20,
    From0To10,
    From0ToMinus10,
    FromMinus10ToMinus20,
    BelowMinus20,
}

impl ProfitabilityBand {
    pub const ALL: [Self; 6] = [
        Self::Above20,
        Self::From10To20,
        Self::From0To10,
        Self::From0ToMinus10,
        Self::FromMinus10ToMinus20,
        Self::BelowMinus20,
    ];

    pub fn classify(profitability_pct: Decimal) -> Self {
        let twenty = Decimal::from(20);
        let ten = Decimal::from(10);

        if profitability_pct > twenty {
            Self::Above20
        } else if profitability_pct > ten {
            Self::From10To20
        } else if profitability_pct > Decimal::ZERO {
            Self::From0To10
        } else if profitability_pct > -ten {
            Self::From0ToMinus10
        } else if profitability_pct > -twenty {
            Self::FromMinus10ToMinus20
        } else {
            Self::BelowMinus20
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Above20 => "above_20",
            Self::From10To20 => "from_10_to_20",
            Self::From0To10 => "from_0_to_10",
            Self::From0ToMinus10 => "from_0_to_minus_10",
            Self::FromMinus10ToMinus20 => "from_minus_10_to_minus_20",
            Self::BelowMinus20 => "below_minus_20",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|band| band.as_str() == value)
    }
}

impl std::str::FromStr for ProfitabilityBand {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(&value.trim().to_ascii_lowercase()).ok_or_else(|| {
            format!(
                "unknown profitability band `{value}` (expected one of {})",
                Self::ALL.map(|band| band.as_str()).join("|")
            )
        })
    }
}

/// Per-band listing counts for one profitability run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitabilityDistribution {
    above_20: u64,
    from_10_to_20: u64,
    from_0_to_10: u64,
    from_0_to_minus_10: u64,
    from_minus_10_to_minus_20: u64,
    below_minus_20: u64,
}

impl ProfitabilityDistribution {
    pub fn record(&mut self, profitability_pct: Decimal) {
        match ProfitabilityBand::classify(profitability_pct) {
            ProfitabilityBand::Above20 => self.above_20 += 1,
            ProfitabilityBand::From10To20 => self.from_10_to_20 += 1,
            ProfitabilityBand::From0To10 => self.from_0_to_10 += 1,
            ProfitabilityBand::From0ToMinus10 => self.from_0_to_minus_10 += 1,
            ProfitabilityBand::FromMinus10ToMinus20 => self.from_minus_10_to_minus_20 += 1,
            ProfitabilityBand::BelowMinus20 => self.below_minus_20 += 1,
        }
    }

    pub fn count(&self, band: ProfitabilityBand) -> u64 {
        match band {
            ProfitabilityBand::Above20 => self.above_20,
            ProfitabilityBand::From10To20 => self.from_10_to_20,
            ProfitabilityBand::From0To10 => self.from_0_to_10,
            ProfitabilityBand::From0ToMinus10 => self.from_0_to_minus_10,
            ProfitabilityBand::FromMinus10ToMinus20 => self.from_minus_10_to_minus_20,
            ProfitabilityBand::BelowMinus20 => self.below_minus_20,
        }
    }

    pub fn total(&self) -> u64 {
        ProfitabilityBand::ALL.iter().map(|band| self.count(*band)).sum()
    }
}
