//! Performance benchmarks for the payroll engine.
//!
//! - Single calculation from two weeks of approved time entries
//! - Batch of 100 employees, sequential and concurrent
//! - Batch of 1000 employees, sequential and concurrent
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use payroll_engine::config::{HourRules, PayrollConfig};
use payroll_engine::models::{
    BenefitEnrollment, Employee, EmployeeStatus, PayPeriod, PayrollFrequency, TimeEntry,
};
use payroll_engine::repository::{
    ExclusivityRule, InMemoryEmployeeRepository, InMemoryPayPeriodRepository,
    InMemoryPayrollRecordRepository, InMemoryTimeEntryRepository, PayPeriodRepository,
    TimeEntryRepository,
};
use payroll_engine::service::{BatchProcessor, PayrollCalculator, PayrollRequest};

fn period_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 12).unwrap()
}

fn period_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 25).unwrap()
}

/// Every third employee is salaried; the rest are hourly with 401k.
fn create_employee(index: usize) -> Employee {
    let salaried = index % 3 == 0;
    Employee {
        id: format!("emp_bench_{index:04}"),
        name: format!("Bench Employee {index}"),
        status: EmployeeStatus::Active,
        manager_id: Some("mgr_bench".to_string()),
        salary: salaried.then(|| Decimal::from(65000)),
        hourly_rate: (!salaried).then(|| Decimal::from_str("27.50").unwrap()),
        payroll_frequency: PayrollFrequency::Biweekly,
        overtime_multiplier: None,
        federal_allowances: (index % 4) as u32,
        state_allowances: 1,
        additional_federal_withholding: Decimal::ZERO,
        additional_state_withholding: Decimal::ZERO,
        benefits: BenefitEnrollment {
            health: true,
            dental: index % 2 == 0,
            vision: false,
            retirement_401k: !salaried,
            retirement_401k_percent: Decimal::from(5),
        },
    }
}

/// Ten approved weekday entries of nine hours each.
fn create_approved_entries(employee_id: &str) -> Vec<TimeEntry> {
    let rules = HourRules::default();
    (0..14)
        .map(|offset| period_start() + Duration::days(offset))
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|day| {
            let at = |h| day.and_hms_opt(h, 0, 0).unwrap();
            let mut entry = TimeEntry::new(employee_id, day, at(8));
            entry.clock_in(at(8)).unwrap();
            entry.clock_out(at(17), &rules).unwrap();
            entry.submit_for_approval(at(17)).unwrap();
            entry.approve("mgr_bench", at(18), None).unwrap();
            entry
        })
        .collect()
}

struct Fixture {
    calculator: PayrollCalculator,
    periods: Arc<InMemoryPayPeriodRepository>,
    period_id: Uuid,
    employee_ids: Vec<String>,
}

impl Fixture {
    fn new(employee_count: usize) -> Self {
        let employees: Vec<Employee> = (0..employee_count).map(create_employee).collect();
        let entries = Arc::new(InMemoryTimeEntryRepository::new());
        for employee in employees.iter().filter(|e| e.is_hourly()) {
            for entry in create_approved_entries(&employee.id) {
                entries
                    .insert_exclusive(entry, ExclusivityRule::NoEntryOnDate)
                    .unwrap();
            }
        }

        let periods = Arc::new(InMemoryPayPeriodRepository::new());
        let period = PayPeriod::new(
            period_start(),
            period_end(),
            period_end() + Duration::days(5),
            PayrollFrequency::Biweekly,
            period_start().and_hms_opt(0, 0, 0).unwrap(),
        );
        periods.insert(&period).unwrap();

        Self {
            calculator: PayrollCalculator::new(
                Arc::new(InMemoryEmployeeRepository::with_employees(employees.iter().cloned())),
                entries,
                Arc::new(PayrollConfig::default()),
            ),
            periods,
            period_id: period.id,
            employee_ids: employees.into_iter().map(|e| e.id).collect(),
        }
    }

    /// A processor writing into a fresh record store.
    fn processor(&self) -> BatchProcessor {
        BatchProcessor::new(
            self.calculator.clone(),
            self.periods.clone(),
            Arc::new(InMemoryPayrollRecordRepository::new()),
        )
    }
}

/// Benchmark: Single calculation from approved time entries.
fn bench_single_calculation(c: &mut Criterion) {
    let fixture = Fixture::new(2);
    let request = PayrollRequest::new(&fixture.employee_ids[1], period_start(), period_end());

    c.bench_function("single_calculation", |b| {
        b.iter(|| black_box(fixture.calculator.calculate(&request).unwrap()))
    });
}

fn bench_batch(c: &mut Criterion, employee_count: usize) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let fixture = Fixture::new(employee_count);
    let ids = &fixture.employee_ids;
    let period_id = fixture.period_id;

    let mut group = c.benchmark_group(format!("batch_{employee_count}"));
    group.throughput(Throughput::Elements(employee_count as u64));
    if employee_count >= 1000 {
        // Reduce sample size for large batches to keep benchmark time reasonable
        group.sample_size(10);
    }

    group.bench_function(BenchmarkId::new("sequential", employee_count), |b| {
        b.iter_batched(
            || fixture.processor(),
            |processor| black_box(processor.process(period_id, ids, false)),
            BatchSize::LargeInput,
        )
    });

    group.bench_function(BenchmarkId::new("concurrent", employee_count), |b| {
        b.to_async(&rt).iter_batched(
            || fixture.processor(),
            |processor| async move {
                black_box(processor.process_concurrent(period_id, ids, false).await)
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

/// Benchmark: Batch of 100 employees.
fn bench_batch_100(c: &mut Criterion) {
    bench_batch(c, 100);
}

/// Benchmark: Batch of 1000 employees.
fn bench_batch_1000(c: &mut Criterion) {
    bench_batch(c, 1000);
}

criterion_group!(benches, bench_single_calculation, bench_batch_100, bench_batch_1000);
criterion_main!(benches);
