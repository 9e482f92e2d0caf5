use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{MortgageError, Result};
use crate::interest::CompoundingConvention;
use crate::payments::total_payments;
use crate::types::PaymentFrequency;

/// one payment in an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub beginning_balance: Money,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// totals over a complete schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub scheduled_periods: u32,
    pub payoff_period: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub final_balance: Money,
}

/// amortization schedule definition; rows are recomputed on every call to `rows`
#[derive(Debug, Clone, PartialEq)]
pub struct AmortizationSchedule {
    principal: Money,
    annual_rate: Rate,
    amortization_years: u32,
    periods_per_year: u32,
    periodic_payment: Money,
    periodic_rate: Rate,
    max_rows: Option<usize>,
    start_date: Option<NaiveDate>,
}

impl AmortizationSchedule {
    /// schedule at the semi-annual compounding convention
    pub fn new(
        principal: Money,
        annual_rate: Rate,
        amortization_years: u32,
        periods_per_year: u32,
        periodic_payment: Money,
    ) -> Result<Self> {
        Self::with_convention(
            principal,
            annual_rate,
            amortization_years,
            periods_per_year,
            periodic_payment,
            CompoundingConvention::SemiAnnual,
        )
    }

    /// schedule with an explicit compounding convention
    pub fn with_convention(
        principal: Money,
        annual_rate: Rate,
        amortization_years: u32,
        periods_per_year: u32,
        periodic_payment: Money,
        convention: CompoundingConvention,
    ) -> Result<Self> {
        if principal.is_negative() {
            return Err(MortgageError::invalid("principal", "must not be negative"));
        }
        if amortization_years == 0 {
            return Err(MortgageError::invalid("amortization_years", "must be greater than zero"));
        }
        total_payments("amortization_years", amortization_years, periods_per_year)?;
        if principal.is_positive() && !periodic_payment.is_positive() {
            return Err(MortgageError::invalid(
                "periodic_payment",
                "must be greater than zero for a positive principal",
            ));
        }

        let periodic_rate = convention.periodic_rate(annual_rate, periods_per_year)?;

        Ok(Self {
            principal,
            annual_rate,
            amortization_years,
            periods_per_year,
            periodic_payment,
            periodic_rate,
            max_rows: None,
            start_date: None,
        })
    }

    /// cap the number of rows yielded by `rows`
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// date the first payment falls due
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate(&self) -> Rate {
        self.annual_rate
    }

    pub fn periodic_rate(&self) -> Rate {
        self.periodic_rate
    }

    pub fn periodic_payment(&self) -> Money {
        self.periodic_payment
    }

    /// full scheduled length, years x periods per year
    pub fn total_periods(&self) -> u32 {
        self.amortization_years * self.periods_per_year
    }

    /// lazy rows honouring `max_rows`
    pub fn rows(&self) -> ScheduleIter {
        ScheduleIter::new(self.clone(), self.max_rows)
    }

    /// walk the complete schedule regardless of `max_rows`
    pub fn summary(&self) -> ScheduleSummary {
        let mut summary = ScheduleSummary {
            scheduled_periods: self.total_periods(),
            payoff_period: 0,
            total_paid: Money::ZERO,
            total_interest: Money::ZERO,
            total_principal: Money::ZERO,
            final_balance: self.principal,
        };

        for row in ScheduleIter::new(self.clone(), None) {
            summary.payoff_period = row.period;
            summary.total_paid += row.payment;
            summary.total_interest += row.interest_portion;
            summary.total_principal += row.principal_portion;
            summary.final_balance = row.remaining_balance;
        }

        summary
    }

    fn payment_date(&self, period: u32) -> Option<NaiveDate> {
        let start = self.start_date?;
        let offset = period - 1;
        match self.periods_per_year {
            12 => start.checked_add_months(Months::new(offset)),
            periods => {
                let days_apart = PaymentFrequency::from_periods_per_year(periods)
                    .and_then(|frequency| frequency.days_between_payments())
                    .map(|days| days as u64)
                    .unwrap_or(364 / u64::from(periods.max(1)));
                start.checked_add_days(Days::new(days_apart * u64::from(offset)))
            }
        }
    }
}

/// iterator over schedule rows
#[derive(Debug, Clone)]
pub struct ScheduleIter {
    schedule: AmortizationSchedule,
    limit: Option<usize>,
    emitted: usize,
    period: u32,
    balance: Money,
    cumulative_interest: Money,
    cumulative_principal: Money,
}

impl ScheduleIter {
    fn new(schedule: AmortizationSchedule, limit: Option<usize>) -> Self {
        let balance = schedule.principal;
        Self {
            schedule,
            limit,
            emitted: 0,
            period: 0,
            balance,
            cumulative_interest: Money::ZERO,
            cumulative_principal: Money::ZERO,
        }
    }
}

impl Iterator for ScheduleIter {
    type Item = AmortizationRow;

    fn next(&mut self) -> Option<AmortizationRow> {
        if !self.balance.is_positive() || self.period >= self.schedule.total_periods() {
            return None;
        }
        if self.limit.is_some_and(|limit| self.emitted >= limit) {
            return None;
        }

        self.period += 1;
        let beginning_balance = self.balance;
        let interest_portion = beginning_balance * self.schedule.periodic_rate;
        let mut payment = self.schedule.periodic_payment;
        let mut principal_portion = payment - interest_portion;

        // last scheduled payment, or a payment that overshoots, clears the balance
        let is_last = self.period == self.schedule.total_periods();
        if is_last || principal_portion >= beginning_balance {
            principal_portion = beginning_balance;
            payment = interest_portion + principal_portion;
        }

        self.balance = (beginning_balance - principal_portion).non_negative();
        self.cumulative_interest += interest_portion;
        self.cumulative_principal += principal_portion;
        self.emitted += 1;

        Some(AmortizationRow {
            period: self.period,
            payment_date: self.schedule.payment_date(self.period),
            beginning_balance,
            payment,
            principal_portion,
            interest_portion,
            remaining_balance: self.balance,
            cumulative_interest: self.cumulative_interest,
            cumulative_principal: self.cumulative_principal,
        })
    }
}

/// schedule rows for a loan, capped at `max_rows` when given
pub fn generate_schedule(
    principal: Money,
    annual_rate: Rate,
    amortization_years: u32,
    periods_per_year: u32,
    periodic_payment: Money,
    max_rows: Option<usize>,
) -> Result<ScheduleIter> {
    let schedule = AmortizationSchedule::new(
        principal,
        annual_rate,
        amortization_years,
        periods_per_year,
        periodic_payment,
    )?;
    Ok(ScheduleIter::new(schedule, max_rows))
}
