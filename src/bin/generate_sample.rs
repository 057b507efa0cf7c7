use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use naplan_dashboard::data::model::{
    Domain, NaplanResultRecord, RecurrentIncomeRecord, INCOME_SOURCES, TOTAL_GROSS_INCOME,
};
use naplan_dashboard::data::store::{ENROLMENTS, NAPLAN_RESULTS, RECURRENT_INCOME};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct EnrolmentRow {
    school_name: String,
    year: i32,
    girls: i64,
    boys: i64,
}

const SCHOOLS: [(&str, f64); 5] = [
    ("Banksia Primary School", 490.0),
    ("Coastal Grammar School", 560.0),
    ("Eucalypt Valley College", 520.0),
    ("Riverside Public School", 470.0),
    ("Wattle Creek School", 505.0),
];
const YEAR_LEVELS: [(&str, f64); 4] = [("Year 3", 0.0), ("Year 5", 60.0), ("Year 7", 100.0), ("Year 9", 140.0)];
const YEARS: std::ops::RangeInclusive<i32> = 2016..=2023;

fn generate(
    rng: &mut SimpleRng,
) -> (
    Vec<EnrolmentRow>,
    Vec<NaplanResultRecord>,
    Vec<RecurrentIncomeRecord>,
) {
    let mut enrolments = Vec::new();
    let mut naplan = Vec::new();
    let mut income = Vec::new();

    for (school, base_score) in SCHOOLS {
        let size = rng.gauss(300.0, 80.0).max(60.0);
        let fee_share = rng.next_f64() * 0.4;

        for year in YEARS {
            enrolments.push(EnrolmentRow {
                school_name: school.to_string(),
                year,
                girls: rng.gauss(size, 10.0).round() as i64,
                boys: rng.gauss(size, 10.0).round() as i64,
            });

            let trend = f64::from(year - YEARS.start()) * 1.5;
            for domain in Domain::ALL {
                for (level, offset) in YEAR_LEVELS {
                    naplan.push(NaplanResultRecord {
                        school_name: school.to_string(),
                        domain,
                        results_year: year,
                        year_level: level.to_string(),
                        avg: (base_score + offset + trend + rng.gauss(0.0, 12.0)).round(),
                    });
                }
            }

            let total = rng.gauss(14_000.0, 1_500.0) + f64::from(year - YEARS.start()) * 250.0;
            let private = total * fee_share;
            let public = total - private;
            let amounts = [public * 0.75, public * 0.25, private * 0.8, private * 0.2];
            for (source, amount) in INCOME_SOURCES.iter().zip(amounts) {
                income.push(RecurrentIncomeRecord {
                    school_name: school.to_string(),
                    year,
                    income_source: source.to_string(),
                    per_student: amount.round(),
                });
            }
            income.push(RecurrentIncomeRecord {
                school_name: school.to_string(),
                year,
                income_source: TOTAL_GROSS_INCOME.to_string(),
                per_student: amounts.iter().map(|a| a.round()).sum(),
            });
        }
    }

    (enrolments, naplan, income)
}

// ---------------------------------------------------------------------------
// CSV output
// ---------------------------------------------------------------------------

fn write_csv(dir: &Path, enrolments: &[EnrolmentRow], naplan: &[NaplanResultRecord], income: &[RecurrentIncomeRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(dir.join(format!("{ENROLMENTS}.csv")))?;
    writer.write_record(["school_name", "year", "Girls", "Boys"])?;
    for row in enrolments {
        writer.write_record([
            row.school_name.clone(),
            row.year.to_string(),
            row.girls.to_string(),
            row.boys.to_string(),
        ])?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(dir.join(format!("{NAPLAN_RESULTS}.csv")))?;
    for row in naplan {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(dir.join(format!("{RECURRENT_INCOME}.csv")))?;
    for row in income {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet output
// ---------------------------------------------------------------------------

fn write_batch(path: PathBuf, columns: Vec<(&str, DataType, ArrayRef)>) -> Result<()> {
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, ty, _)| Field::new(*name, ty.clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, _, array)| array).collect(),
    )?;

    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn strings<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(StringArray::from(values.collect::<Vec<_>>()))
}

fn ints32(values: impl Iterator<Item = i32>) -> ArrayRef {
    Arc::new(Int32Array::from_iter_values(values))
}

fn ints64(values: impl Iterator<Item = i64>) -> ArrayRef {
    Arc::new(Int64Array::from_iter_values(values))
}

fn floats(values: impl Iterator<Item = f64>) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(values))
}

fn write_parquet(dir: &Path, enrolments: &[EnrolmentRow], naplan: &[NaplanResultRecord], income: &[RecurrentIncomeRecord]) -> Result<()> {
    write_batch(
        dir.join(format!("{ENROLMENTS}.parquet")),
        vec![
            ("school_name", DataType::Utf8, strings(enrolments.iter().map(|r| r.school_name.as_str()))),
            ("year", DataType::Int32, ints32(enrolments.iter().map(|r| r.year))),
            ("Girls", DataType::Int64, ints64(enrolments.iter().map(|r| r.girls))),
            ("Boys", DataType::Int64, ints64(enrolments.iter().map(|r| r.boys))),
        ],
    )?;

    write_batch(
        dir.join(format!("{NAPLAN_RESULTS}.parquet")),
        vec![
            ("school_name", DataType::Utf8, strings(naplan.iter().map(|r| r.school_name.as_str()))),
            ("domain", DataType::Utf8, strings(naplan.iter().map(|r| r.domain.as_str()))),
            ("results_year", DataType::Int32, ints32(naplan.iter().map(|r| r.results_year))),
            ("year_level", DataType::Utf8, strings(naplan.iter().map(|r| r.year_level.as_str()))),
            ("avg", DataType::Float64, floats(naplan.iter().map(|r| r.avg))),
        ],
    )?;

    write_batch(
        dir.join(format!("{RECURRENT_INCOME}.parquet")),
        vec![
            ("school_name", DataType::Utf8, strings(income.iter().map(|r| r.school_name.as_str()))),
            ("year", DataType::Int32, ints32(income.iter().map(|r| r.year))),
            ("Net recurrent income", DataType::Utf8, strings(income.iter().map(|r| r.income_source.as_str()))),
            ("$ per student", DataType::Float64, floats(income.iter().map(|r| r.per_student))),
        ],
    )?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut out_dir = PathBuf::from("data");
    let mut parquet = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--parquet" => parquet = true,
            _ => out_dir = PathBuf::from(arg),
        }
    }
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let (enrolments, naplan, income) = generate(&mut rng);

    if parquet {
        write_parquet(&out_dir, &enrolments, &naplan, &income)?;
    } else {
        write_csv(&out_dir, &enrolments, &naplan, &income)?;
    }

    log::info!(
        "Wrote {} enrolment, {} NAPLAN and {} income rows to {}",
        enrolments.len(),
        naplan.len(),
        income.len(),
        out_dir.display()
    );
    println!(
        "Wrote sample {} data to {}",
        if parquet { "parquet" } else { "csv" },
        out_dir.display()
    );
    Ok(())
}
