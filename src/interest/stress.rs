use crate::config::StressTestPolicy;
use crate::decimal::Rate;

/// qualifying rate used for gds/tds: the greater of contract + buffer and the floor
pub fn stress_test_rate(contract_rate: Rate, policy: &StressTestPolicy) -> Rate {
    (contract_rate + policy.buffer).max(policy.floor)
}
